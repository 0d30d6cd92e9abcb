//! Shared fixtures for integration tests.
//!
//! The simulated GPIO port itself lives in the library
//! (`pinguard::adapters::sim`); this file adds recorders for the ports a
//! test wants to inspect afterwards.

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::time::Duration;

use pinguard::Controller;
use pinguard::adapters::sim::{Contender, SimGpio};
use pinguard::app::events::GuardEvent;
use pinguard::app::ports::{ConfigPort, EventSink, TimerPort};
use pinguard::config::GuardConfig;
use pinguard::error::Result;
use pinguard::pins;

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<GuardEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&GuardEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn bursts(&self) -> usize {
        self.count(|e| matches!(e, GuardEvent::ContentionDetected { .. }))
    }

    pub fn level_logs(&self) -> usize {
        self.count(|e| matches!(e, GuardEvent::LevelChanged { .. }))
    }

    pub fn failures(&self) -> usize {
        self.count(|e| matches!(e, GuardEvent::PassFailed(_)))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &GuardEvent) {
        self.events.push(event.clone());
    }
}

// ── MockConfigStore ───────────────────────────────────────────

#[derive(Default)]
pub struct MockConfigStore {
    pub saved: RefCell<Option<GuardConfig>>,
    pub saves: Cell<u32>,
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<GuardConfig> {
        Ok(self.saved.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &GuardConfig) -> Result<()> {
        config.validate()?;
        self.saves.set(self.saves.get() + 1);
        *self.saved.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── StepTimer ─────────────────────────────────────────────────

/// Simulated clock that records every requested sleep.
///
/// By default a sleep completes after a single yield and moves the clock
/// to its end, so simulated time costs nothing.  A [`manual`](Self::manual)
/// timer only moves when the test calls [`advance`](Self::advance), and a
/// sleep completes once the clock reaches it.
#[derive(Default)]
pub struct StepTimer {
    pub sleeps: RefCell<Vec<Duration>>,
    clock: Cell<Duration>,
    manual: bool,
}

#[allow(dead_code)]
impl StepTimer {
    pub fn manual() -> Self {
        Self {
            manual: true,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> usize {
        self.sleeps.borrow().len()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }
}

impl TimerPort for StepTimer {
    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        self.sleeps.borrow_mut().push(duration);
        let end = self.clock.get() + duration;
        async move {
            if self.manual {
                while self.clock.get() < end {
                    futures_lite::future::yield_now().await;
                }
            } else {
                futures_lite::future::yield_now().await;
                if self.clock.get() < end {
                    self.clock.set(end);
                }
            }
        }
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type SimController = Controller<SimGpio, RecordingSink>;

pub fn make_controller(config: GuardConfig) -> (SimController, Contender) {
    let hw = SimGpio::new(pins::ROW_PIN);
    let contender = hw.contender();
    let controller = Controller::new(config, hw, RecordingSink::default())
        .expect("valid config");
    (controller, contender)
}

/// Default config, started, with the boot events cleared.
pub fn started_controller() -> (SimController, Contender) {
    let (mut controller, contender) = make_controller(GuardConfig::default());
    controller.start();
    controller.sink_mut().clear();
    (controller, contender)
}
