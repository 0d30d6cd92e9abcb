//! Level drift monitor with a dual log throttle.
//!
//! Every sample updates the tracked level and transition count.  Logging is
//! the only throttled part: a transition is reported while the window is
//! open, which is for the first `verbose_samples` samples and then on every
//! `log_every`-th sample.  A transition seen while the window is closed is
//! not lost; it is reported at the next open window if the level still
//! differs from the last one reported.

use crate::app::events::GuardEvent;
use crate::app::ports::EventSink;
use crate::config::MonitorConfig;
use crate::pin::Level;

/// Outcome of one [`DriftMonitor::sample`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub level: Level,
    /// 1-based sample number.
    pub number: u32,
    /// The level differs from the previous sample (or this is the first).
    pub changed: bool,
    pub logged: bool,
}

pub struct DriftMonitor {
    verbose_samples: u32,
    log_every: u32,
    samples: u32,
    last: Option<Level>,
    transitions: u32,
    last_logged: Option<Level>,
    /// Transitions observed since the last logged one.
    pending: u32,
}

impl DriftMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            verbose_samples: config.verbose_samples,
            log_every: config.log_every.max(1),
            samples: 0,
            last: None,
            transitions: 0,
            last_logged: None,
            pending: 0,
        }
    }

    pub fn sample(&mut self, level: Level, sink: &mut impl EventSink) -> Sample {
        self.samples = self.samples.saturating_add(1);

        let changed = self.last != Some(level);
        if changed {
            if self.last.is_some() {
                self.transitions = self.transitions.saturating_add(1);
            }
            self.pending = self.pending.saturating_add(1);
        }
        self.last = Some(level);

        let logged = self.window_open() && self.last_logged != Some(level);
        if logged {
            sink.emit(&GuardEvent::LevelChanged {
                from: self.last_logged,
                to: level,
                sample: self.samples,
                transitions: self.transitions,
                unlogged: self.pending.saturating_sub(1),
            });
            self.last_logged = Some(level);
            self.pending = 0;
        }

        Sample {
            level,
            number: self.samples,
            changed,
            logged,
        }
    }

    fn window_open(&self) -> bool {
        self.samples <= self.verbose_samples || self.samples % self.log_every == 0
    }

    /// Last sampled level, `None` before the first sample.
    pub fn last_level(&self) -> Option<Level> {
        self.last
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
