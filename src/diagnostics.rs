//! Status snapshot for shell and RPC tooling.
//!
//! [`PinStatus`] is what `CheckStatus` returns.  [`PinStatus::encode`]
//! packs it into a postcard frame small enough for a single BLE
//! notification or a shell line.

use serde::{Deserialize, Serialize};

use crate::control::applier::AppliedVia;
use crate::pin::{Level, PinConfig};

/// Upper bound on an encoded status frame.
pub const STATUS_FRAME_MAX: usize = 96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinStatus {
    pub label: heapless::String<16>,
    /// Level at the time of the snapshot, `None` if the port is not ready.
    pub level: Option<Level>,
    /// Configuration decoded from `PIN_CNF`, `None` if unreadable or
    /// disconnected.
    pub last_config: Option<PinConfig>,
    pub desired: PinConfig,
    pub last_applied_via: Option<AppliedVia>,
    pub attempts: u32,
    pub transitions: u32,
    pub forced_passes: u32,
    pub mismatches: u32,
    pub next_delay_ms: u32,
    pub running: bool,
}

impl PinStatus {
    /// `last_config` agrees with `desired`.
    pub fn is_converged(&self) -> bool {
        self.last_config == Some(self.desired)
    }

    pub fn encode(&self) -> Result<heapless::Vec<u8, STATUS_FRAME_MAX>, postcard::Error> {
        let mut buf = [0u8; STATUS_FRAME_MAX];
        let used = postcard::to_slice(self, &mut buf)?;
        heapless::Vec::from_slice(used).map_err(|()| postcard::Error::SerializeBufferFull)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(frame)
    }
}
