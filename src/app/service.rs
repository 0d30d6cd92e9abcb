//! Guard controller, the hexagonal core.
//!
//! [`Controller`] owns the pin handle, the applier, the observers and the
//! scheduler.  It exposes a hardware-agnostic API; the runner drives it
//! with timer expiries and shell commands, and nothing else touches its
//! state.
//!
//! ```text
//!    PinPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │          Controller          │
//! RegisterPort ◀─│ Applier · Monitor · Correlator│
//!                │      AdaptiveScheduler       │
//!                └──────────────────────────────┘
//! ```
//!
//! The scheduler calls back into [`GuardCore`] through
//! [`PassDelegate`], so the two halves are separate fields and borrow
//! independently.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::GuardConfig;
use crate::control::applier::{AppliedVia, Applier};
use crate::diagnostics::PinStatus;
use crate::error::{Error, Result};
use crate::pin::{Level, PinConfig};
use crate::pins;
use crate::scheduler::AdaptiveScheduler;
use crate::sensors::{ActivityCorrelator, DriftMonitor, TriggerDecision};

use super::commands::{CommandReply, GuardCommand};
use super::events::GuardEvent;
use super::ports::{ConfigPort, EventSink, PassDelegate, PinPort, RegisterPort};

/// Level the row rests at when nobody is driving it.
fn idle_level(config: &PinConfig) -> Level {
    config.initial_level.unwrap_or(config.pull.resting_level())
}

// ───────────────────────────────────────────────────────────────
// GuardCore
// ───────────────────────────────────────────────────────────────

/// Everything a pass touches.  Split from the scheduler so the scheduler
/// can hold `&mut GuardCore` as its delegate.
struct GuardCore<H, S> {
    config: GuardConfig,
    applier: Applier,
    monitor: DriftMonitor,
    correlator: ActivityCorrelator,
    hw: H,
    sink: S,
    last_via: Option<AppliedVia>,
    forced_passes: u32,
    mismatches: u32,
}

impl<H, S> GuardCore<H, S>
where
    H: PinPort + RegisterPort + DelayNs,
    S: EventSink,
{
    fn pass(&mut self, attempt: u32, out_of_band: bool) -> Result<AppliedVia> {
        let desired = self.config.desired;
        match self.applier.apply(&mut self.hw, &desired) {
            Ok(via) => {
                self.last_via = Some(via);
                self.sink.emit(&GuardEvent::Applied {
                    via,
                    attempt,
                    out_of_band,
                });
                if self.config.strategy.verify && via != AppliedVia::DrivenLow {
                    if let Err(e) = self.applier.verify(&self.hw, &desired) {
                        warn!("Controller: {} (scanner reclaimed the pin?)", e);
                        self.mismatches = self.mismatches.saturating_add(1);
                        self.sink.emit(&GuardEvent::Mismatch(e));
                    }
                }
                Ok(via)
            }
            Err(e) => {
                warn!("Controller: pass {} failed: {}", attempt, e);
                self.sink.emit(&GuardEvent::PassFailed(e));
                Err(e)
            }
        }
    }

    fn report_burst(&mut self) {
        self.sink.emit(&GuardEvent::ContentionDetected {
            burst: self.correlator.bursts(),
        });
    }

    fn sample(&mut self) -> TriggerDecision {
        if !self.hw.is_ready() {
            return TriggerDecision::None;
        }
        let level = self.hw.read_level();
        self.monitor.sample(level, &mut self.sink);
        self.correlator.on_sample(level)
    }
}

impl<H, S> PassDelegate for GuardCore<H, S>
where
    H: PinPort + RegisterPort + DelayNs,
    S: EventSink,
{
    fn detect(&mut self) -> TriggerDecision {
        if !self.hw.is_ready() {
            return TriggerDecision::None;
        }
        let level = self.hw.read_level();
        let decision = self.correlator.on_sample(level);
        if decision == TriggerDecision::ForceReapply {
            self.report_burst();
        }
        decision
    }

    fn corrective_pass(&mut self, attempt: u32) -> bool {
        self.pass(attempt, false).is_ok()
    }

    fn observe(&mut self) -> TriggerDecision {
        self.sample()
    }

    fn out_of_band_pass(&mut self, attempts: u32) {
        self.report_burst();
        self.forced_passes = self.forced_passes.saturating_add(1);
        // Failure is already logged and reported; the next tick retries.
        let _ = self.pass(attempts, true);
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

/// The self-correcting configuration controller for one contended pin.
pub struct Controller<H, S> {
    scheduler: AdaptiveScheduler,
    core: GuardCore<H, S>,
    running: bool,
    config_dirty: bool,
}

impl<H, S> Controller<H, S>
where
    H: PinPort + RegisterPort + DelayNs,
    S: EventSink,
{
    /// Build a controller for the row pin.
    ///
    /// Rejects an invalid config.  Does **not** touch the pin; call
    /// [`start`](Self::start) next.
    pub fn new(config: GuardConfig, hw: H, sink: S) -> Result<Self> {
        config.validate()?;
        let scheduler = AdaptiveScheduler::new(config.backoff, &config.monitor);
        let core = GuardCore {
            applier: Applier::new(&config.strategy, pins::ROW_PIN),
            monitor: DriftMonitor::new(&config.monitor),
            correlator: ActivityCorrelator::new(idle_level(&config.desired)),
            hw,
            sink,
            last_via: None,
            forced_passes: 0,
            mismatches: 0,
            config,
        };
        Ok(Self {
            scheduler,
            core,
            running: false,
            config_dirty: false,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot pass plus first observation, then schedule the first tick.
    /// Returns the delay until that tick.
    pub fn start(&mut self) -> Duration {
        let delay = self.scheduler.start();
        self.running = true;
        let desired = self.core.config.desired;
        self.core.sink.emit(&GuardEvent::Started { desired });
        info!(
            "Controller started on {} toward {}",
            self.core.config.pin_label, desired
        );

        let _ = self.core.pass(0, false);
        self.observe();
        delay
    }

    /// Run one scheduled tick.  Returns the delay until the next one.
    pub fn tick(&mut self) -> Duration {
        self.scheduler.tick(&mut self.core)
    }

    /// Sample between ticks.  A detected burst runs an out-of-band pass
    /// right away instead of waiting for the next tick.
    pub fn observe(&mut self) -> TriggerDecision {
        if !self.running {
            return TriggerDecision::None;
        }
        let decision = self.core.sample();
        if decision == TriggerDecision::ForceReapply {
            self.core.out_of_band_pass(self.scheduler.attempts());
        }
        decision
    }

    /// Cancel the loop and release the pin to the safe default.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel();
        self.running = false;

        if self.core.hw.is_ready() {
            if let Err(e) = self.core.hw.configure(&PinConfig::SAFE_DEFAULT) {
                warn!("Controller: releasing pin failed: {}", e);
            }
        }
        self.core.sink.emit(&GuardEvent::Stopped);
        info!("Controller stopped, {} released", self.core.config.pin_label);
    }

    // ── Command handling ──────────────────────────────────────

    /// Run a pass now and hand the result to the caller.  Not counted.
    pub fn force_reconfigure(&mut self) -> Result<AppliedVia> {
        info!("Controller: forced reconfigure requested");
        self.core.pass(self.scheduler.attempts(), true)
    }

    /// Replace the desired configuration and converge to it immediately.
    pub fn set_desired(&mut self, desired: PinConfig) -> Result<()> {
        if !desired.is_valid() {
            return Err(Error::Config(
                "desired: inputs take a pull and no level, outputs a level and no pull",
            ));
        }
        self.core.config.desired = desired;
        self.core.correlator.set_idle_level(idle_level(&desired));
        self.config_dirty = true;
        self.core.sink.emit(&GuardEvent::DesiredChanged(desired));
        info!("Controller: desired is now {}", desired);

        if self.running {
            let _ = self.core.pass(self.scheduler.attempts(), true);
        }
        Ok(())
    }

    /// Process a shell command.  Always produces a reply.
    pub fn handle_command(&mut self, cmd: GuardCommand) -> CommandReply {
        match cmd {
            GuardCommand::CheckStatus => CommandReply::Status(self.check_status()),
            GuardCommand::ForceReconfigure => CommandReply::Reconfigured(self.force_reconfigure()),
            GuardCommand::SetDesired(desired) => match self.set_desired(desired) {
                Ok(()) => CommandReply::Ack,
                Err(e) => CommandReply::Rejected(e),
            },
            GuardCommand::Restart => {
                self.start();
                CommandReply::Ack
            }
            GuardCommand::Shutdown => {
                self.shutdown();
                CommandReply::Ack
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn check_status(&mut self) -> PinStatus {
        let ready = self.core.hw.is_ready();
        let level = ready.then(|| self.core.hw.read_level());
        let last_config = if ready {
            self.core.applier.read_back(&self.core.hw)
        } else {
            None
        };
        let next_delay_ms = self.scheduler.state().next_delay.as_millis();

        PinStatus {
            label: self.core.config.pin_label.clone(),
            level,
            last_config,
            desired: self.core.config.desired,
            last_applied_via: self.core.last_via,
            attempts: self.scheduler.attempts(),
            transitions: self.core.monitor.transitions(),
            forced_passes: self.core.forced_passes,
            mismatches: self.core.mismatches,
            next_delay_ms: u32::try_from(next_delay_ms).unwrap_or(u32::MAX),
            running: self.running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Delay the scheduler last asked for.
    pub fn next_delay(&self) -> Duration {
        self.scheduler.state().next_delay
    }

    pub fn attempts(&self) -> u32 {
        self.scheduler.attempts()
    }

    pub fn desired(&self) -> PinConfig {
        self.core.config.desired
    }

    /// Live configuration, including a runtime desired change.
    pub fn current_config(&self) -> &GuardConfig {
        &self.core.config
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.core.hw
    }

    pub fn sink(&self) -> &S {
        &self.core.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.core.sink
    }

    // ── Config persistence ────────────────────────────────────

    /// Persist a runtime desired change.  Returns `true` if saved.
    pub fn save_if_dirty(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        match storage.save(&self.core.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Controller: config saved");
                true
            }
            Err(e) => {
                warn!("Controller: config save failed: {}", e);
                false
            }
        }
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
