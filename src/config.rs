//! Guard configuration parameters
//!
//! All tunable parameters of the corrective loop.  The upstream fixes never
//! agreed on the right pull direction or backoff thresholds, so none of them
//! are hard-coded: the desired [`PinConfig`] and every threshold arrive here,
//! either from defaults or from a [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pin::PinConfig;
use crate::pins;

/// Core guard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Label for logs and status frames (e.g. "P0.05").
    pub pin_label: heapless::String<16>,
    /// The single configuration every corrective pass converges toward.
    pub desired: PinConfig,
    pub backoff: BackoffConfig,
    pub monitor: MonitorConfig,
    pub strategy: StrategyConfig,
}

/// Attempt-count driven tick cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay between controller start and the first tick (ms).
    pub initial_delay_ms: u32,
    /// Attempts below this run at `fast_interval_ms`.
    pub fast_attempts: u32,
    /// Attempts below this (and at or above `fast_attempts`) run at
    /// `settle_interval_ms`.
    pub settle_attempts: u32,
    pub fast_interval_ms: u32,
    pub settle_interval_ms: u32,
    /// Steady-state interval once the pin has proven stable.
    pub slow_interval_ms: u32,
}

/// Drift monitor cadence and log throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Every sample up to and including this one may log a transition.
    pub verbose_samples: u32,
    /// After the verbose window, only every Nth sample may log.
    pub log_every: u32,
    /// Sample the pin every K scheduled ticks.
    pub sample_every_ticks: u32,
    /// Level poll between ticks (ms); 0 disables polling.
    pub poll_interval_ms: u32,
}

/// Which interfaces a pass may write through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyPolicy {
    /// Driver call, enhanced pull if the pull is weak, raw register last.
    DriverWithFallback,
    /// Driver call and enhanced pull only.
    DriverOnly,
    /// Skip the driver and always write `PIN_CNF` directly.
    RawRegisterOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub policy: StrategyPolicy,
    /// Enhanced pull hold time (µs), busy-waited.
    pub hold_us: u32,
    /// After a driver write, read the level back and escalate if the net
    /// is not resting at the pull's level.
    pub check_pull_level: bool,
    /// Read `PIN_CNF` back after writing and warn on mismatch.
    pub verify: bool,
    /// Drive the pin low as an output when every strategy failed.
    pub drive_low_fallback: bool,
}

/// Upper bound on the enhanced pull hold.  Anything longer becomes visible
/// to the scanner's own row timing.
pub const MAX_HOLD_US: u32 = 100;

impl Default for GuardConfig {
    fn default() -> Self {
        let mut pin_label = heapless::String::new();
        let _ = pin_label.push_str(pins::ROW_LABEL);
        Self {
            pin_label,
            desired: PinConfig::INPUT_PULL_DOWN,
            backoff: BackoffConfig::default(),
            monitor: MonitorConfig::default(),
            strategy: StrategyConfig::default(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 50,
            fast_attempts: 5,
            settle_attempts: 15,
            fast_interval_ms: 100,   // 10 Hz right after boot
            settle_interval_ms: 500, // 2 Hz while settling
            slow_interval_ms: 1000,  // 1 Hz once stable
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            verbose_samples: 5,
            log_every: 20,
            sample_every_ticks: 1,
            poll_interval_ms: 20, // 50 Hz
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            policy: StrategyPolicy::DriverWithFallback,
            hold_us: 20,
            check_pull_level: true,
            verify: true,
            drive_low_fallback: false,
        }
    }
}

impl GuardConfig {
    /// Reject invalid values rather than clamping them.
    pub fn validate(&self) -> Result<()> {
        if !self.desired.is_valid() {
            return Err(Error::Config("desired: inputs take a pull and no level, outputs a level and no pull"));
        }
        self.backoff.validate()?;
        self.monitor.validate()?;
        self.strategy.validate()
    }
}

impl BackoffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fast_interval_ms == 0 {
            return Err(Error::Config("backoff: fast interval must be non-zero"));
        }
        if self.fast_attempts > self.settle_attempts {
            return Err(Error::Config("backoff: fast_attempts exceeds settle_attempts"));
        }
        if self.fast_interval_ms > self.settle_interval_ms
            || self.settle_interval_ms > self.slow_interval_ms
        {
            return Err(Error::Config("backoff: intervals must not shrink"));
        }
        Ok(())
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_every == 0 {
            return Err(Error::Config("monitor: log_every must be non-zero"));
        }
        if self.sample_every_ticks == 0 {
            return Err(Error::Config("monitor: sample_every_ticks must be non-zero"));
        }
        Ok(())
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hold_us == 0 || self.hold_us > MAX_HOLD_US {
            return Err(Error::Config("strategy: hold_us out of range (1..=100)"));
        }
        Ok(())
    }
}
