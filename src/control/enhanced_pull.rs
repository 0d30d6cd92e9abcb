//! Enhanced pull: a short strong drive that primes the net before handing
//! it back to the weak internal pull.
//!
//! ```text
//!   level
//!    ▲    stale charge
//!    │ ───────┐
//!    │        │ driven to resting level     released to pull
//!    │        └───────────────────────────┬────────────────────▶
//!    │        ◀──────── hold_us ─────────▶│
//!    └────────┴───────────────────────────┴────────────────────▶ t
//!          output                       input + pull
//! ```
//!
//! The nRF pull resistors are ~13 kΩ.  When the scanner leaves the row
//! charged, the pull alone can take longer to discharge it than the
//! scanner's own settle time, so the row reads as a phantom key.  Driving
//! the pin to the pull's resting level for a few tens of microseconds
//! discharges the line, then the pull only has to hold it there.
//!
//! The hold is a **busy-wait** through `DelayNs`.  It must not yield: a
//! cooperative sleep lets the scanner's timer interleave, and the hold
//! would then stretch into its row strobe.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::PinPort;
use crate::error::Result;
use crate::pin::{DriveStrength, PinConfig};

pub struct EnhancedPull {
    hold_us: u32,
    primes: u32,
}

impl EnhancedPull {
    pub fn new(hold_us: u32) -> Self {
        Self { hold_us, primes: 0 }
    }

    /// Drive to the resting level of `desired.pull`, hold, then restore
    /// `desired`.
    ///
    /// On error the pin may be left as an output; callers fall back to a
    /// raw register write, which overwrites the whole configuration.
    pub fn strengthen<H>(&mut self, hw: &mut H, desired: &PinConfig) -> Result<()>
    where
        H: PinPort + DelayNs,
    {
        let prime = PinConfig::output(desired.pull.resting_level(), DriveStrength::HighDrive);
        hw.configure(&prime)?;
        hw.delay_us(self.hold_us);
        hw.configure(desired)?;

        self.primes = self.primes.saturating_add(1);
        debug!(
            "EnhancedPull: primed {:?} for {}us (#{})",
            desired.pull.resting_level(),
            self.hold_us,
            self.primes
        );
        Ok(())
    }

    /// Completed prime sequences since construction.
    pub fn primes(&self) -> u32 {
        self.primes
    }
}
