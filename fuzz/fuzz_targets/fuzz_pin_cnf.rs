//! Fuzz target: `PinConfig::from_pin_cnf` / `merge_pin_cnf`
//!
//! Feeds arbitrary `PIN_CNF` words (as read back after the scanner had
//! its way with the pin) and checks:
//! - No panics for any register value
//! - A decoded config re-encodes to exactly the owned bits it came from
//! - Merging a decoded config back keeps SENSE and reserved bits intact
//!
//! cargo fuzz run fuzz_pin_cnf

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinguard::pin::{CNF_MASK, Level, PinConfig, merge_pin_cnf};

fuzz_target!(|data: &[u8]| {
    let Some(word) = data.get(..4) else {
        return;
    };
    let cnf = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    let out = Level::from(data.get(4).is_some_and(|b| b & 1 != 0));

    let Some(config) = PinConfig::from_pin_cnf(cnf, out) else {
        return;
    };
    assert_eq!(config.to_pin_cnf(), cnf & CNF_MASK);
    assert_eq!(merge_pin_cnf(cnf, &config), cnf);
});
