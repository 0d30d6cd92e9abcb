//! Fuzz target: `PinStatus::decode`
//!
//! Status frames arrive from shell/RPC tooling and may be truncated or
//! garbage.  Checks:
//! - No panics under any byte sequence
//! - Anything that decodes re-encodes within `STATUS_FRAME_MAX`
//!
//! cargo fuzz run fuzz_status_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use pinguard::diagnostics::{PinStatus, STATUS_FRAME_MAX};

fuzz_target!(|data: &[u8]| {
    let Ok(status) = PinStatus::decode(data) else {
        return;
    };
    if let Ok(frame) = status.encode() {
        assert!(frame.len() <= STATUS_FRAME_MAX);
        assert_eq!(PinStatus::decode(&frame).ok(), Some(status));
    }
});
