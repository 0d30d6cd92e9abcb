//! Observation side of the guard.
//!
//! Neither module touches hardware: the controller reads the level through
//! [`PinPort`](crate::app::ports::PinPort) and feeds it to both.
//!
//! ```text
//!   read_level ──▶ DriftMonitor ──▶ LevelChanged (throttled)
//!        │
//!        └──────▶ ActivityCorrelator ──▶ TriggerDecision
//! ```

pub mod activity;
pub mod drift;

pub use activity::{ActivityCorrelator, RowActivity, TriggerDecision};
pub use drift::{DriftMonitor, Sample};
