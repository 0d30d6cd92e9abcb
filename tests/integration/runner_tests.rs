//! Runner loop: tick/poll cadence and command handling over local
//! channels, driven by a simulated clock.

use core::time::Duration;

use futures_lite::future;

use pinguard::app::channels::{CommandChannel, ReplyChannel};
use pinguard::app::commands::{CommandReply, GuardCommand};
use pinguard::config::GuardConfig;
use pinguard::pin::{DriveStrength, Level, PinConfig};
use pinguard::runner::run_guard;

use crate::mock_hw::{StepTimer, make_controller};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

async fn wait_for_sleeps(timer: &StepTimer, n: usize) {
    while timer.requested() < n {
        future::yield_now().await;
    }
}

#[test]
fn polls_between_ticks_and_serves_commands() {
    let (controller, contender) = make_controller(GuardConfig::default());
    let timer = StepTimer::default();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    let script = async {
        wait_for_sleeps(&timer, 12).await;
        commands.send(GuardCommand::CheckStatus).await;
        let status = replies.receive().await;
        commands.send(GuardCommand::Shutdown).await;
        let ack = replies.receive().await;
        (status, ack)
    };

    let (controller, (status, ack)) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    // 50ms to the first tick in 20ms poll steps, then 100ms intervals.
    let sleeps = timer.sleeps.borrow();
    assert_eq!(
        sleeps[..9],
        [ms(20), ms(20), ms(10), ms(20), ms(20), ms(20), ms(20), ms(20), ms(20)]
    );

    let CommandReply::Status(status) = status else {
        panic!("expected status, got {status:?}");
    };
    assert!(status.running);
    assert!(status.attempts >= 2);
    assert!(status.is_converged());

    assert_eq!(ack, CommandReply::Ack);
    assert!(!controller.is_running());
    assert_eq!(contender.config(), Some(PinConfig::SAFE_DEFAULT));
}

#[test]
fn zero_poll_interval_sleeps_whole_ticks() {
    let mut config = GuardConfig::default();
    config.monitor.poll_interval_ms = 0;
    let (controller, _contender) = make_controller(config);
    let timer = StepTimer::default();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    let script = async {
        wait_for_sleeps(&timer, 4).await;
        commands.send(GuardCommand::Shutdown).await;
        replies.receive().await
    };

    let (controller, _) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    assert_eq!(timer.sleeps.borrow()[..3], [ms(50), ms(100), ms(100)]);
    assert!(controller.attempts() >= 2);
}

#[test]
fn poll_catches_burst_before_first_tick() {
    let (controller, contender) = make_controller(GuardConfig::default());
    let timer = StepTimer::default();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    let script = async {
        wait_for_sleeps(&timer, 2).await;
        contender.reclaim(PinConfig::output(Level::High, DriveStrength::Standard));
        wait_for_sleeps(&timer, 3).await;
        commands.send(GuardCommand::Shutdown).await;
        replies.receive().await
    };

    let (mut controller, _) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    assert_eq!(controller.sink().bursts(), 1);
    assert_eq!(controller.check_status().forced_passes, 1);
}

#[test]
fn restart_command_reschedules_first_tick() {
    let (controller, _contender) = make_controller(GuardConfig::default());
    let timer = StepTimer::default();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    let script = async {
        wait_for_sleeps(&timer, 20).await;
        commands.send(GuardCommand::Restart).await;
        let restart = replies.receive().await;
        let requested = timer.requested();
        wait_for_sleeps(&timer, requested + 4).await;
        commands.send(GuardCommand::Shutdown).await;
        replies.receive().await;
        (restart, requested)
    };

    let (controller, (restart, requested)) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    assert_eq!(restart, CommandReply::Ack);
    assert!(timer.requested() >= requested + 4);
    // The 10ms remainder of the 50ms initial delay shows up once at boot
    // and once after the restart.
    let remainders = timer.sleeps.borrow().iter().filter(|d| **d == ms(10)).count();
    assert_eq!(remainders, 2);
    assert!(controller.attempts() <= 1);
}

#[test]
fn zero_poll_interval_still_catches_reclaims_at_tick() {
    let mut config = GuardConfig::default();
    config.monitor.poll_interval_ms = 0;
    let (controller, contender) = make_controller(config);
    let timer = StepTimer::default();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    let script = async {
        wait_for_sleeps(&timer, 3).await;
        contender.reclaim(PinConfig::output(Level::High, DriveStrength::Standard));
        wait_for_sleeps(&timer, 4).await;
        commands.send(GuardCommand::Shutdown).await;
        replies.receive().await
    };

    let (controller, _) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    assert_eq!(controller.sink().bursts(), 1);
    assert_eq!(contender.reclaims(), 1);
}

#[test]
fn busy_shell_does_not_starve_ticks() {
    let (controller, _contender) = make_controller(GuardConfig::default());
    let timer = StepTimer::manual();
    let commands = CommandChannel::new();
    let replies = ReplyChannel::new();

    // A status query every 15ms, faster than the 20ms poll step, for 600ms.
    let script = async {
        for _ in 0..40 {
            timer.advance(ms(15));
            commands.send(GuardCommand::CheckStatus).await;
            replies.receive().await;
        }
        commands.send(GuardCommand::Shutdown).await;
        replies.receive().await
    };

    let (controller, ack) = future::block_on(future::zip(
        run_guard(controller, &timer, &commands, &replies),
        script,
    ));

    assert_eq!(ack, CommandReply::Ack);
    // First tick near 50ms, then every ~100ms.
    assert!(controller.attempts() >= 4, "attempts = {}", controller.attempts());
}
