//! Unified error types for the pin guard.
//!
//! A single `Error` enum that every component returns, keeping the
//! corrective loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through events and replies without allocation.
//!
//! None of these are fatal to the controller: a failed pass leaves the pin
//! misconfigured until the next tick or the next inferred contention burst.

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration strategy
// ---------------------------------------------------------------------------

/// The interface a configuration was written through.
///
/// `RawRegisterWrite` is the privileged fallback that bypasses the driver
/// layer and writes the pin's configuration register directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigStrategy {
    DriverLevelCall,
    RawRegisterWrite,
}

impl fmt::Display for ConfigStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DriverLevelCall => write!(f, "driver"),
            Self::RawRegisterWrite => write!(f, "raw register"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the guard funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The GPIO port backing the pin is not ready.  No hardware was touched.
    DeviceNotReady,
    /// A strategy rejected the configuration.  `code` is the platform's
    /// return code (negative errno on Zephyr-style drivers, 0 if unknown).
    ConfigWriteFailed { strategy: ConfigStrategy, code: i32 },
    /// Read-back of the configuration register disagrees with what was
    /// written.  Usually the contending scanner reclaimed the pin between
    /// the write and the read.
    ConfigMismatch { expected: u32, actual: u32 },
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotReady => write!(f, "GPIO device not ready"),
            Self::ConfigWriteFailed { strategy, code } => {
                write!(f, "{strategy} configure failed (rc={code})")
            }
            Self::ConfigMismatch { expected, actual } => write!(
                f,
                "PIN_CNF mismatch: wrote 0x{expected:08x}, read 0x{actual:08x}"
            ),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
