//! Async runner: the one task that owns the [`Controller`].
//!
//! Keeps an absolute deadline for the next tick and sleeps toward it in
//! `poll_interval_ms` steps, sampling the pin after each step.  Every
//! sleep races the command channel so a shell request is served without
//! waiting for the tick.  Time spent serving commands counts against the
//! deadline, so a busy shell cannot hold a tick off.
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────┐
//!   │  run_guard                                           │
//!   │                                                      │
//!   │   now >= deadline    → controller.tick()             │
//!   │                                                      │
//!   │   timer.sleep(min(deadline - now, poll)) ─┐          │
//!   │                                           ├─ or ─▶   │
//!   │   commands.receive()                     ─┘          │
//!   │                                                      │
//!   │   Elapsed, before deadline → controller.observe()    │
//!   │   Command                  → handle_command → reply  │
//!   └──────────────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use futures_lite::future;
use log::{info, warn};

use crate::app::channels::{CommandChannel, ReplyChannel};
use crate::app::commands::GuardCommand;
use crate::app::ports::{EventSink, PinPort, RegisterPort, TimerPort};
use crate::app::service::Controller;

enum Wake {
    Elapsed,
    Command(GuardCommand),
}

/// Drive `controller` until a `Shutdown` command arrives, then hand it
/// back.
pub async fn run_guard<H, S, T>(
    mut controller: Controller<H, S>,
    timer: &T,
    commands: &CommandChannel,
    replies: &ReplyChannel,
) -> Controller<H, S>
where
    H: PinPort + RegisterPort + DelayNs,
    S: EventSink,
    T: TimerPort,
{
    let poll = Duration::from_millis(controller.current_config().monitor.poll_interval_ms.into());
    let mut deadline = timer.now().saturating_add(controller.start());

    loop {
        if timer.now() >= deadline {
            let delay = controller.tick();
            deadline = timer.now().saturating_add(delay);
        }

        let until_tick = deadline.saturating_sub(timer.now());
        let step = if poll.is_zero() {
            until_tick
        } else {
            until_tick.min(poll)
        };

        let wake = future::or(
            async {
                timer.sleep(step).await;
                Wake::Elapsed
            },
            async { Wake::Command(commands.receive().await) },
        )
        .await;

        match wake {
            Wake::Elapsed => {
                if timer.now() < deadline {
                    controller.observe();
                }
            }
            Wake::Command(cmd) => {
                let reply = controller.handle_command(cmd);
                if replies.try_send(reply).is_err() {
                    warn!("Runner: reply channel full, dropping reply to {:?}", cmd);
                }
                match cmd {
                    GuardCommand::Restart => {
                        deadline = timer.now().saturating_add(controller.next_delay());
                    }
                    GuardCommand::Shutdown => break,
                    _ => {}
                }
            }
        }
    }

    info!("Runner: exited after {} attempts", controller.attempts());
    controller
}
