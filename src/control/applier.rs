//! Pin configuration applier with an ordered fallback chain.
//!
//! ```text
//!   is_ready? ──no──▶ DeviceNotReady (no hardware access)
//!      │
//!      ▼
//!   driver configure ──err──────────────────────────┐
//!      │                                            │
//!      ▼                                            ▼
//!   pull resting? ──no──▶ enhanced pull ──weak──▶ raw PIN_CNF write ──err──▶ drive low?
//!      │                      │                     │
//!      ▼                      ▼                     ▼
//!    Driver              EnhancedPull           RawRegister
//! ```
//!
//! None of this is transactional with respect to the scanner: it may
//! reclaim the pin during or right after any step.  Verification is
//! therefore advisory and only ever produces a warning.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{PinPort, RegisterPort};
use crate::config::{StrategyConfig, StrategyPolicy};
use crate::error::{Error, Result};
use crate::pin::{CNF_MASK, DriveStrength, Level, PinConfig, Pull, merge_pin_cnf};
use crate::pins;

use super::enhanced_pull::EnhancedPull;

/// Which step of the chain left the pin in its final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppliedVia {
    Driver,
    EnhancedPull,
    RawRegister,
    /// Every strategy failed and the pin is held as a strong output-low.
    DrivenLow,
}

pub struct Applier {
    policy: StrategyPolicy,
    check_pull_level: bool,
    drive_low_fallback: bool,
    enhanced: EnhancedPull,
    pin: u8,
    cnf_offset: u32,
}

impl Applier {
    pub fn new(strategy: &StrategyConfig, pin: u8) -> Self {
        Self {
            policy: strategy.policy,
            check_pull_level: strategy.check_pull_level,
            drive_low_fallback: strategy.drive_low_fallback,
            enhanced: EnhancedPull::new(strategy.hold_us),
            pin,
            cnf_offset: pins::pin_cnf_offset(pin),
        }
    }

    /// Converge the pin toward `desired` using the configured policy.
    pub fn apply<H>(&mut self, hw: &mut H, desired: &PinConfig) -> Result<AppliedVia>
    where
        H: PinPort + RegisterPort + DelayNs,
    {
        if !hw.is_ready() {
            return Err(Error::DeviceNotReady);
        }

        let outcome = match self.policy {
            StrategyPolicy::RawRegisterOnly => {
                self.write_raw(hw, desired).map(|()| AppliedVia::RawRegister)
            }
            StrategyPolicy::DriverOnly => self
                .via_driver(hw, desired)
                .map(|via| via.unwrap_or(AppliedVia::EnhancedPull)),
            StrategyPolicy::DriverWithFallback => match self.via_driver(hw, desired) {
                Ok(Some(via)) => Ok(via),
                Ok(None) => {
                    debug!("Applier: pull still weak after priming, forcing PIN_CNF");
                    self.write_raw(hw, desired).map(|()| AppliedVia::RawRegister)
                }
                Err(e) => {
                    warn!("Applier: {}, falling back to raw register", e);
                    self.write_raw(hw, desired).map(|()| AppliedVia::RawRegister)
                }
            },
        };

        match outcome {
            Err(e) if self.drive_low_fallback => {
                warn!("Applier: {}, holding pin low as output", e);
                self.drive_low(hw).map_err(|_| e)?;
                Ok(AppliedVia::DrivenLow)
            }
            other => other,
        }
    }

    /// Read `PIN_CNF` back and compare the bits this crate owns.
    pub fn verify<H: RegisterPort>(&self, hw: &H, desired: &PinConfig) -> Result<()> {
        let expected = desired.to_pin_cnf();
        let actual = hw.read_register(self.cnf_offset) & CNF_MASK;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::ConfigMismatch { expected, actual })
        }
    }

    /// Decode the pin's current configuration from its registers.
    pub fn read_back<H: RegisterPort>(&self, hw: &H) -> Option<PinConfig> {
        let cnf = hw.read_register(self.cnf_offset);
        let out = Level::from(hw.read_register(pins::OUT) & self.pin_mask() != 0);
        PinConfig::from_pin_cnf(cnf, out)
    }

    pub fn enhanced_pull(&self) -> &EnhancedPull {
        &self.enhanced
    }

    // ── Strategies ────────────────────────────────────────────

    /// Driver call, escalating to the enhanced pull when the net does not
    /// rest at the pull's level.  `Ok(None)` means the pull is still weak.
    fn via_driver<H>(&mut self, hw: &mut H, desired: &PinConfig) -> Result<Option<AppliedVia>>
    where
        H: PinPort + DelayNs,
    {
        hw.configure(desired)?;
        if !self.pull_is_weak(hw, desired) {
            return Ok(Some(AppliedVia::Driver));
        }

        self.enhanced.strengthen(hw, desired)?;
        if self.pull_is_weak(hw, desired) {
            Ok(None)
        } else {
            Ok(Some(AppliedVia::EnhancedPull))
        }
    }

    fn pull_is_weak<H: PinPort>(&self, hw: &mut H, desired: &PinConfig) -> bool {
        self.check_pull_level
            && desired.is_input()
            && desired.pull != Pull::None
            && hw.read_level() != desired.pull.resting_level()
    }

    /// Write `PIN_CNF` directly, latching the output level first so an
    /// output never glitches to the wrong level.
    fn write_raw<H: RegisterPort>(&self, hw: &mut H, desired: &PinConfig) -> Result<()> {
        if let Some(level) = desired.initial_level {
            let offset = if level.is_high() { pins::OUTSET } else { pins::OUTCLR };
            hw.write_register(offset, self.pin_mask())?;
        }
        let current = hw.read_register(self.cnf_offset);
        hw.write_register(self.cnf_offset, merge_pin_cnf(current, desired))
    }

    fn drive_low<H: PinPort + RegisterPort>(&self, hw: &mut H) -> Result<()> {
        let low = PinConfig::output(Level::Low, DriveStrength::HighDrive);
        hw.configure(&low).or_else(|_| self.write_raw(hw, &low))
    }

    const fn pin_mask(&self) -> u32 {
        1 << self.pin
    }
}
