//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`GuardEvent`] as a single
//! tagged log record.  On the host that ends up on stderr through
//! `env_logger`; on the nRF it goes wherever the board's logger points.

use log::{info, warn};

use crate::app::events::GuardEvent;
use crate::app::ports::EventSink;
use crate::pin::Level;

fn level_str(level: Option<Level>) -> &'static str {
    match level {
        None => "unknown",
        Some(Level::Low) => "0",
        Some(Level::High) => "1",
    }
}

/// Adapter that logs every [`GuardEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &GuardEvent) {
        match event {
            GuardEvent::Started { desired } => {
                info!("START | desired={}", desired);
            }
            GuardEvent::Applied {
                via,
                attempt,
                out_of_band,
            } => {
                info!(
                    "PASS  | #{} via={:?}{}",
                    attempt,
                    via,
                    if *out_of_band { " (out-of-band)" } else { "" }
                );
            }
            GuardEvent::PassFailed(e) => {
                warn!("PASS  | failed: {}", e);
            }
            GuardEvent::Mismatch(e) => {
                warn!("CHECK | {}", e);
            }
            GuardEvent::LevelChanged {
                from,
                to,
                sample,
                transitions,
                unlogged,
            } => {
                info!(
                    "LEVEL | {} -> {} | sample={} transitions={} unlogged={}",
                    level_str(*from),
                    level_str(Some(*to)),
                    sample,
                    transitions,
                    unlogged
                );
            }
            GuardEvent::ContentionDetected { burst } => {
                warn!("BURST | #{} scanner reclaimed the row, reapplying", burst);
            }
            GuardEvent::DesiredChanged(config) => {
                info!("CONF  | desired={}", config);
            }
            GuardEvent::Stopped => {
                info!("STOP  | pin released to safe default");
            }
        }
    }
}
