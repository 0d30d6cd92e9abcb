//! Adaptive tick scheduler.
//!
//! Drives the corrective loop at a cadence that slows down as the pin
//! proves stable.  The scheduler owns the attempt counter and the pending
//! schedule; the work itself happens in a [`PassDelegate`].
//!
//! ```text
//!   start ──initial_delay──▶ tick ──interval_for(n)──▶ tick ──▶ …
//!                             │
//!                             ├─ corrective_pass()      ok → n += 1
//!                             ├─ observe()              every K ticks
//!                             └─ out_of_band_pass()     on ForceReapply
//!
//!   n:        0 ─────── fast ─────── settle ─────────▶
//!   interval: │  fast   │   settle   │   slow
//! ```

use core::time::Duration;

use log::{debug, info};

use crate::app::ports::PassDelegate;
use crate::config::{BackoffConfig, MonitorConfig};
use crate::sensors::TriggerDecision;

// ═══════════════════════════════════════════════════════════════
//  Backoff
// ═══════════════════════════════════════════════════════════════

/// Maps a completed-attempt count to the next tick interval.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    config: BackoffConfig,
}

impl BackoffPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.config.initial_delay_ms.into())
    }

    /// Interval after `attempts` completed passes.  Monotone non-decreasing
    /// in `attempts` for any validated [`BackoffConfig`].
    pub fn interval_for(&self, attempts: u32) -> Duration {
        let ms = if attempts < self.config.fast_attempts {
            self.config.fast_interval_ms
        } else if attempts < self.config.settle_attempts {
            self.config.settle_interval_ms
        } else {
            self.config.slow_interval_ms
        };
        Duration::from_millis(ms.into())
    }
}

/// Completed corrective passes since the last (re)start.  Saturates rather
/// than wrapping, so a long-running guard stays in the slow phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCounter(u32);

impl AttemptCounter {
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// The one pending tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub next_delay: Duration,
    pub pending: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

pub struct AdaptiveScheduler {
    backoff: BackoffPolicy,
    sample_every_ticks: u32,
    attempts: AttemptCounter,
    ticks: u32,
    state: ScheduleState,
}

impl AdaptiveScheduler {
    pub fn new(backoff: BackoffConfig, monitor: &MonitorConfig) -> Self {
        Self {
            backoff: BackoffPolicy::new(backoff),
            sample_every_ticks: monitor.sample_every_ticks.max(1),
            attempts: AttemptCounter::default(),
            ticks: 0,
            state: ScheduleState {
                next_delay: Duration::ZERO,
                pending: false,
            },
        }
    }

    /// Reset the counter and schedule the first tick.
    pub fn start(&mut self) -> Duration {
        self.attempts.reset();
        self.ticks = 0;
        self.state = ScheduleState {
            next_delay: self.backoff.initial_delay(),
            pending: true,
        };
        info!(
            "Scheduler: started, first tick in {}ms",
            self.state.next_delay.as_millis()
        );
        self.state.next_delay
    }

    /// Run one tick and reschedule.  A cancelled scheduler does nothing.
    pub fn tick(&mut self, delegate: &mut impl PassDelegate) -> Duration {
        if !self.state.pending {
            debug!("Scheduler: tick after cancel ignored");
            return self.state.next_delay;
        }
        self.ticks = self.ticks.wrapping_add(1);
        let sample_due = self.ticks % self.sample_every_ticks == 0;

        // A burst seen here is handled by the pass that follows.
        if sample_due && delegate.detect() == TriggerDecision::ForceReapply {
            debug!("Scheduler: reclaim caught at tick {}", self.ticks);
        }

        if delegate.corrective_pass(self.attempts.get().saturating_add(1)) {
            self.attempts.increment();
        }

        if sample_due && delegate.observe() == TriggerDecision::ForceReapply {
            delegate.out_of_band_pass(self.attempts.get());
        }

        self.state = ScheduleState {
            next_delay: self.backoff.interval_for(self.attempts.get()),
            pending: true,
        };
        debug!(
            "Scheduler: attempt {} done, next tick in {}ms",
            self.attempts.get(),
            self.state.next_delay.as_millis()
        );
        self.state.next_delay
    }

    pub fn cancel(&mut self) {
        self.state.pending = false;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
