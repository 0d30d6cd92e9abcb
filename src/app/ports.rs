//! Port traits: the hexagonal boundary between the guard and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (GPIO driver, raw register window, timer, event sink,
//! config store) implement these traits.  The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the corrective loop never touches hardware directly.
//!
//! The busy-wait used by the enhanced pull is not a port of its own: it is
//! `embedded_hal::delay::DelayNs`, which every HAL already provides.

use core::future::Future;
use core::time::Duration;

use crate::config::GuardConfig;
use crate::error::Result;
use crate::pin::{Level, PinConfig};

// ───────────────────────────────────────────────────────────────
// Pin port (driver-level access)
// ───────────────────────────────────────────────────────────────

/// Driver-level access to the one contended pin.
pub trait PinPort {
    /// Whether the GPIO port device is ready.  Nothing else on this port
    /// may be called while this returns `false`.
    fn is_ready(&self) -> bool;

    /// Apply direction, pull and drive through the platform GPIO driver.
    /// Outputs latch `initial_level` before the direction switch.
    fn configure(&mut self, config: &PinConfig) -> Result<()>;

    /// Current logical level at the pad.
    fn read_level(&mut self) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Register port (privileged raw access)
// ───────────────────────────────────────────────────────────────

/// Raw 32-bit access to the pin's GPIO port register block.
///
/// Offsets are relative to the port base and come from [`crate::pins`].
pub trait RegisterPort {
    fn read_register(&self, offset: u32) -> u32;

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Timer port (scheduling facility)
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus cooperative sleep, used by the runner between
/// ticks.
///
/// Never used for the enhanced pull hold, which must not yield.
pub trait TimerPort {
    /// Time since an arbitrary fixed origin.  Never goes backwards.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`GuardEvent`](super::events::GuardEvent)s
/// through this port.  Adapters decide where they go (serial log, shell
/// buffer, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::GuardEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the guard configuration.
///
/// Implementations MUST run [`GuardConfig::validate`] before persisting and
/// reject invalid values instead of clamping them.
pub trait ConfigPort {
    /// Returns [`GuardConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<GuardConfig>;

    fn save(&self, config: &GuardConfig) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Callbacks the [`AdaptiveScheduler`](crate::scheduler::AdaptiveScheduler)
/// makes on every tick.  The controller implements this; tests substitute a
/// recorder.
pub trait PassDelegate {
    /// Sample the pin ahead of a scheduled pass, so a reclaim since the
    /// last sample is seen before the pass overwrites it.  Feeds the burst
    /// detector only.
    fn detect(&mut self) -> crate::sensors::TriggerDecision;

    /// Run one corrective pass.  `true` if the configuration was written.
    fn corrective_pass(&mut self, attempt: u32) -> bool;

    /// Sample the pin and decide whether the scanner reclaimed it.
    fn observe(&mut self) -> crate::sensors::TriggerDecision;

    /// Immediate pass triggered by contention.  Never counted; `attempts`
    /// is the current count, for reporting.
    fn out_of_band_pass(&mut self, attempts: u32);
}
