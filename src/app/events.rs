//! Outbound guard events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them.

use crate::control::applier::AppliedVia;
use crate::error::Error;
use crate::pin::{Level, PinConfig};

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardEvent {
    /// The controller started (or restarted) and will converge toward
    /// `desired`.
    Started { desired: PinConfig },

    /// A corrective pass wrote the configuration.
    Applied {
        via: AppliedVia,
        attempt: u32,
        out_of_band: bool,
    },

    /// A corrective pass failed on every strategy it was allowed to use.
    PassFailed(Error),

    /// Post-write verification disagreed with what was written.
    Mismatch(Error),

    /// A logged level transition.  `from` is `None` for the first sample.
    /// `unlogged` counts transitions swallowed by the throttle since the
    /// previous logged one.
    LevelChanged {
        from: Option<Level>,
        to: Level,
        sample: u32,
        transitions: u32,
        unlogged: u32,
    },

    /// The correlator inferred that the scanner reclaimed the pin.
    ContentionDetected { burst: u32 },

    /// The desired configuration was replaced at runtime.
    DesiredChanged(PinConfig),

    /// The controller stopped and released the pin to the safe default.
    Stopped,
}
