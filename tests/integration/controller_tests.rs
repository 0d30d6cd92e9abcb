//! Controller end to end: boot, ticks, contention bursts, commands and
//! shutdown, all against the simulated port.

use core::time::Duration;

use pinguard::app::commands::{CommandReply, GuardCommand};
use pinguard::app::events::GuardEvent;
use pinguard::app::ports::ConfigPort;
use pinguard::config::GuardConfig;
use pinguard::control::applier::AppliedVia;
use pinguard::error::Error;
use pinguard::pin::{DriveStrength, Level, PinConfig, Pull};
use pinguard::sensors::TriggerDecision;

use crate::mock_hw::{MockConfigStore, make_controller, started_controller};

fn scanner_high() -> PinConfig {
    PinConfig::output(Level::High, DriveStrength::Standard)
}

// ── Boot ─────────────────────────────────────────────────────

#[test]
fn boot_pass_configures_and_logs_unknown_transition() {
    let (mut c, contender) = make_controller(GuardConfig::default());
    assert_eq!(contender.config(), None);

    assert_eq!(c.start(), Duration::from_millis(50));
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
    assert!(c.is_running());

    let events = &c.sink().events;
    assert_eq!(
        events[0],
        GuardEvent::Started {
            desired: PinConfig::INPUT_PULL_DOWN
        }
    );
    assert!(events.contains(&GuardEvent::LevelChanged {
        from: None,
        to: Level::Low,
        sample: 1,
        transitions: 0,
        unlogged: 0,
    }));
}

#[test]
fn charged_row_at_boot_is_primed() {
    let (mut c, contender) = make_controller(GuardConfig::default());
    contender.set_weak_pull(true);
    contender.set_charge(Level::High);

    c.start();
    assert!(c.sink().events.contains(&GuardEvent::Applied {
        via: AppliedVia::EnhancedPull,
        attempt: 0,
        out_of_band: false,
    }));
    assert_eq!(contender.level(), Level::Low);
    assert_eq!(c.sink().bursts(), 0);
}

// ── Contention bursts ─────────────────────────────────────────

#[test]
fn poll_detects_reclaim_and_next_tick_restores() {
    let (mut c, contender) = started_controller();
    for _ in 0..3 {
        c.tick();
    }

    contender.reclaim(scanner_high());
    assert_eq!(c.observe(), TriggerDecision::ForceReapply);
    assert_eq!(c.observe(), TriggerDecision::None);
    assert_eq!(c.sink().bursts(), 1);

    contender.reclaim(scanner_high());
    c.tick();
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
    assert_eq!(contender.level(), Level::Low);
    assert_eq!(c.sink().bursts(), 2);
}

#[test]
fn reclaim_between_ticks_is_one_burst() {
    let (mut c, contender) = started_controller();
    for _ in 0..3 {
        c.tick();
    }

    contender.reclaim(scanner_high());
    c.tick();
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
    assert_eq!(c.sink().bursts(), 1);
    // The scheduled pass was the reapply.
    assert_eq!(c.check_status().forced_passes, 0);
    assert_eq!(c.attempts(), 4);

    // Each later reclaim is its own burst; quiet ticks add none.
    for n in 2..=4 {
        c.tick();
        contender.reclaim(scanner_high());
        c.tick();
        assert_eq!(c.sink().bursts(), n);
    }
}

#[test]
fn strobed_row_triggers_once_per_burst() {
    let (mut c, contender) = started_controller();
    c.tick();

    // Scanner reclaims the pin and keeps strobing it high.
    contender.reclaim(scanner_high());
    contender.drive_external(Some(Level::High));
    for _ in 0..5 {
        c.tick();
    }
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
    assert_eq!(c.sink().bursts(), 1);

    // Burst ends, then a second one starts.
    contender.drive_external(None);
    c.tick();
    contender.drive_external(Some(Level::High));
    c.tick();
    assert_eq!(c.sink().bursts(), 2);
}

#[test]
fn out_of_band_passes_leave_backoff_alone() {
    let (mut c, contender) = started_controller();
    for _ in 0..4 {
        c.tick();
    }
    assert_eq!(c.attempts(), 4);

    for _ in 0..10 {
        contender.reclaim(scanner_high());
        assert_eq!(c.observe(), TriggerDecision::ForceReapply);
        assert_eq!(c.observe(), TriggerDecision::None);
    }
    assert_eq!(c.attempts(), 4);
    assert_eq!(c.check_status().forced_passes, 10);
    assert_eq!(c.tick(), Duration::from_millis(500));
}

// ── Backoff phases ───────────────────────────────────────────

#[test]
fn backoff_phase_boundaries() {
    let (mut c, _contender) = started_controller();
    let delays: Vec<Duration> = (0..16).map(|_| c.tick()).collect();

    assert_eq!(c.attempts(), 16);
    assert_eq!(delays[3], Duration::from_millis(100), "after 4 attempts");
    assert_eq!(delays[4], Duration::from_millis(500), "after 5 attempts");
    assert_eq!(delays[13], Duration::from_millis(500), "after 14 attempts");
    assert_eq!(delays[14], Duration::from_millis(1000), "after 15 attempts");
    assert_eq!(delays[15], Duration::from_millis(1000));
}

#[test]
fn custom_thresholds_are_honoured() {
    let mut config = GuardConfig::default();
    config.backoff.fast_attempts = 10;
    config.backoff.settle_attempts = 30;
    config.backoff.slow_interval_ms = 2000;
    let (mut c, _contender) = make_controller(config);
    c.start();

    let delays: Vec<Duration> = (0..30).map(|_| c.tick()).collect();
    assert_eq!(delays[8], Duration::from_millis(100));
    assert_eq!(delays[9], Duration::from_millis(500));
    assert_eq!(delays[28], Duration::from_millis(500));
    assert_eq!(delays[29], Duration::from_millis(2000));
}

#[test]
fn failed_passes_stay_fast() {
    let (mut c, contender) = started_controller();
    contender.set_ready(false);
    contender.clear_calls();

    for _ in 0..20 {
        assert_eq!(c.tick(), Duration::from_millis(100));
    }
    assert_eq!(c.attempts(), 0);
    assert_eq!(c.sink().failures(), 20);
    assert!(contender.calls().is_empty());
    assert!(
        c.sink()
            .events
            .iter()
            .all(|e| *e == GuardEvent::PassFailed(Error::DeviceNotReady))
    );
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn check_status_reports_live_state() {
    let (mut c, contender) = started_controller();
    for _ in 0..6 {
        c.tick();
    }
    contender.reclaim(scanner_high());

    let CommandReply::Status(status) = c.handle_command(GuardCommand::CheckStatus) else {
        panic!("expected status reply");
    };
    assert_eq!(status.label.as_str(), "P0.05");
    assert_eq!(status.level, Some(Level::High));
    assert_eq!(status.last_config, Some(scanner_high()));
    assert!(!status.is_converged());
    assert_eq!(status.attempts, 6);
    assert_eq!(status.next_delay_ms, 500);
    assert_eq!(status.last_applied_via, Some(AppliedVia::Driver));
    assert!(status.running);
}

#[test]
fn force_reconfigure_returns_result_to_caller() {
    let (mut c, contender) = started_controller();
    contender.reclaim(scanner_high());

    assert_eq!(
        c.handle_command(GuardCommand::ForceReconfigure),
        CommandReply::Reconfigured(Ok(AppliedVia::Driver))
    );
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
    assert_eq!(c.attempts(), 0);

    contender.set_ready(false);
    assert_eq!(
        c.handle_command(GuardCommand::ForceReconfigure),
        CommandReply::Reconfigured(Err(Error::DeviceNotReady))
    );
}

#[test]
fn set_desired_switches_idle_level_and_persists() {
    let (mut c, contender) = started_controller();
    let store = MockConfigStore::default();
    assert!(!c.save_if_dirty(&store));

    let up = PinConfig::input(Pull::Up);
    assert_eq!(c.handle_command(GuardCommand::SetDesired(up)), CommandReply::Ack);
    assert_eq!(contender.config(), Some(up));
    assert_eq!(contender.level(), Level::High);

    // High is now idle; low is the burst.
    c.tick();
    assert_eq!(c.sink().bursts(), 0);
    contender.drive_external(Some(Level::Low));
    c.tick();
    assert_eq!(c.sink().bursts(), 1);

    assert!(c.save_if_dirty(&store));
    assert_eq!(store.saves.get(), 1);
    assert_eq!(store.load().unwrap().desired, up);
    assert!(!c.is_config_dirty());
}

#[test]
fn set_desired_rejects_pulled_output() {
    let (mut c, contender) = started_controller();
    let pulled = PinConfig {
        pull: Pull::Up,
        ..scanner_high()
    };
    assert!(matches!(
        c.handle_command(GuardCommand::SetDesired(pulled)),
        CommandReply::Rejected(Error::Config(_))
    ));
    assert_eq!(c.desired(), PinConfig::INPUT_PULL_DOWN);
    assert_eq!(contender.config(), Some(PinConfig::INPUT_PULL_DOWN));
}

#[test]
fn restart_resets_attempts() {
    let (mut c, _contender) = started_controller();
    for _ in 0..20 {
        c.tick();
    }
    assert_eq!(c.next_delay(), Duration::from_millis(1000));

    assert_eq!(c.handle_command(GuardCommand::Restart), CommandReply::Ack);
    assert_eq!(c.attempts(), 0);
    assert_eq!(c.next_delay(), Duration::from_millis(50));
    assert_eq!(c.tick(), Duration::from_millis(100));
}

// ── Shutdown ─────────────────────────────────────────────────

#[test]
fn shutdown_releases_pin_and_stops_loop() {
    let (mut c, contender) = started_controller();
    c.tick();

    assert_eq!(c.handle_command(GuardCommand::Shutdown), CommandReply::Ack);
    assert!(!c.is_running());
    assert_eq!(contender.config(), Some(PinConfig::SAFE_DEFAULT));
    assert_eq!(c.sink().events.last(), Some(&GuardEvent::Stopped));

    let driver_calls = contender.driver_calls();
    c.tick();
    contender.reclaim(scanner_high());
    assert_eq!(c.observe(), TriggerDecision::None);
    assert_eq!(contender.driver_calls(), driver_calls);
    assert!(!c.check_status().running);
}

#[test]
fn drive_low_last_resort() {
    let mut config = GuardConfig::default();
    config.strategy.drive_low_fallback = true;
    let (mut c, contender) = make_controller(config);
    contender.fail_driver_for(PinConfig::INPUT_PULL_DOWN);
    contender.fail_registers(true);

    c.start();
    assert!(c.sink().events.contains(&GuardEvent::Applied {
        via: AppliedVia::DrivenLow,
        attempt: 0,
        out_of_band: false,
    }));
    assert_eq!(
        contender.config(),
        Some(PinConfig::output(Level::Low, DriveStrength::HighDrive))
    );
    // Driving low is not verified against the input configuration.
    assert_eq!(
        c.sink().count(|e| matches!(e, GuardEvent::Mismatch(_))),
        0
    );
}
