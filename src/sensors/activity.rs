//! Scan activity correlator.
//!
//! The scanner strobes the other rows, and while it does, it tends to leave
//! this row driven away from its idle level.  A departure from the idle
//! level is taken as evidence the scanner has reclaimed the pin.
//!
//! ```text
//!            level != idle / ForceReapply
//!   ┌────────────────┐ ──────────────────▶ ┌─────────────────┐
//!   │ OtherRowsIdle  │                     │ OtherRowsActive │
//!   └────────────────┘ ◀────────────────── └─────────────────┘
//!            level == idle / None
//! ```
//!
//! This is a heuristic.  A real key press on this row looks the same.

use log::debug;

use crate::pin::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowActivity {
    OtherRowsIdle,
    OtherRowsActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    None,
    ForceReapply,
}

pub struct ActivityCorrelator {
    idle_level: Level,
    state: RowActivity,
    bursts: u32,
}

impl ActivityCorrelator {
    pub fn new(idle_level: Level) -> Self {
        Self {
            idle_level,
            state: RowActivity::OtherRowsIdle,
            bursts: 0,
        }
    }

    /// Feed one level sample.  Returns `ForceReapply` exactly once per
    /// idle-to-active edge.
    pub fn on_sample(&mut self, level: Level) -> TriggerDecision {
        let next = if level == self.idle_level {
            RowActivity::OtherRowsIdle
        } else {
            RowActivity::OtherRowsActive
        };

        let decision = match (self.state, next) {
            (RowActivity::OtherRowsIdle, RowActivity::OtherRowsActive) => {
                self.bursts = self.bursts.saturating_add(1);
                debug!("Correlator: burst #{} (level {:?})", self.bursts, level);
                TriggerDecision::ForceReapply
            }
            _ => TriggerDecision::None,
        };
        self.state = next;
        decision
    }

    /// Change the idle level after the desired pull changed.  The state
    /// restarts as idle so the next departure triggers.
    pub fn set_idle_level(&mut self, idle_level: Level) {
        self.idle_level = idle_level;
        self.state = RowActivity::OtherRowsIdle;
    }

    pub fn state(&self) -> RowActivity {
        self.state
    }

    /// Idle-to-active edges seen so far.
    pub fn bursts(&self) -> u32 {
        self.bursts
    }
}
