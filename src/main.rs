//! pinguard host simulator.
//!
//! Runs the guard against a simulated GPIO port while a fake matrix
//! scanner keeps reclaiming the row, the same race the firmware sees on
//! the ergonude right half.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  futures_lite::block_on                                       │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │  edge_executor::LocalExecutor                           │  │
//! │  │                                                         │  │
//! │  │  ┌──────────────┐  ┌───────────────┐  ┌──────────────┐  │  │
//! │  │  │  run_guard   │  │ scanner bursts│  │ shell script │  │  │
//! │  │  │ (Controller) │  │  (Contender)  │  │  (commands)  │  │  │
//! │  │  └──────────────┘  └───────────────┘  └──────────────┘  │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `pinguard-sim [config.json]`.  Logging follows `RUST_LOG`
//! (default `info`).

use core::time::Duration;

use anyhow::{Context, Result};
use async_io_mini::Timer;
use log::{info, warn};

use pinguard::adapters::config_file::FileConfigStore;
use pinguard::adapters::log_sink::LogEventSink;
use pinguard::adapters::sim::{Contender, SimGpio};
use pinguard::adapters::timer::AsyncIoTimer;
use pinguard::app::channels::{COMMANDS, REPLIES};
use pinguard::app::commands::{CommandReply, GuardCommand};
use pinguard::app::ports::ConfigPort;
use pinguard::config::GuardConfig;
use pinguard::pin::{DriveStrength, Level, PinConfig};
use pinguard::pins;
use pinguard::runner::run_guard;
use pinguard::Controller;

/// Scanner bursts before the shell script shuts the guard down.
const BURSTS: u32 = 5;
/// Gap between scanner bursts.
const BURST_GAP: Duration = Duration::from_millis(700);

/// The scanner strobes the row high and leaves it that way.
async fn scanner(contender: Contender) {
    for burst in 1..=BURSTS {
        Timer::after(BURST_GAP).await;
        info!("SIM   | scanner reclaims {} (burst {}/{})", pins::ROW_LABEL, burst, BURSTS);
        contender.reclaim(PinConfig::output(Level::High, DriveStrength::Standard));
    }
}

/// Query status once the scanner is done, then stop the guard.
async fn shell() {
    Timer::after(BURST_GAP * (BURSTS + 1)).await;

    COMMANDS.send(GuardCommand::CheckStatus).await;
    match REPLIES.receive().await {
        CommandReply::Status(status) => {
            info!(
                "SIM   | status: level={:?} converged={} attempts={} forced={} mismatches={}",
                status.level,
                status.is_converged(),
                status.attempts,
                status.forced_passes,
                status.mismatches
            );
            match status.encode() {
                Ok(frame) => info!("SIM   | status frame {} bytes", frame.len()),
                Err(e) => warn!("SIM   | status encode failed: {}", e),
            }
        }
        other => warn!("SIM   | unexpected reply {:?}", other),
    }

    COMMANDS.send(GuardCommand::Shutdown).await;
    let _ = REPLIES.receive().await;
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = std::env::args().nth(1).map(FileConfigStore::new);
    let config = match &store {
        Some(store) => store
            .load()
            .with_context(|| format!("loading {}", store.path().display()))?,
        None => GuardConfig::default(),
    };

    let hw = SimGpio::new(pins::ROW_PIN);
    let contender = hw.contender();
    // The row starts charged and the internal pull is too weak to
    // discharge it alone.
    contender.set_weak_pull(true);
    contender.set_charge(Level::High);

    let controller = Controller::new(config, hw, LogEventSink::new())?;

    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();
    executor.spawn(scanner(contender.clone())).detach();
    executor.spawn(shell()).detach();

    info!("SIM   | guarding {} against {} scanner bursts", pins::ROW_LABEL, BURSTS);
    let mut controller = futures_lite::future::block_on(executor.run(run_guard(
        controller,
        &AsyncIoTimer::new(),
        &COMMANDS,
        &REPLIES,
    )));

    info!(
        "SIM   | done: {} reclaims, final config {:?}",
        contender.reclaims(),
        contender.config()
    );
    if let Some(store) = &store {
        controller.save_if_dirty(store);
    }
    Ok(())
}
