//! Shell ↔ controller channels.
//!
//! Uses `embassy-sync` bounded channels to bridge diagnostics tooling (a
//! shell command handler, an RPC task) with the runner that owns the
//! controller.  Neither side needs heap allocation.
//!
//! ```text
//! ┌──────────────┐  GuardCommand  ┌──────────────┐
//! │  Shell task  │──────────────▶│    Runner     │
//! │              │◀──────────────│  (Controller) │
//! └──────────────┘  CommandReply  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::commands::{CommandReply, GuardCommand};

/// Channel depth for inbound commands.
const CMD_DEPTH: usize = 4;

/// Channel depth for replies.
const REPLY_DEPTH: usize = 4;

pub type CommandChannel = Channel<CriticalSectionRawMutex, GuardCommand, CMD_DEPTH>;
pub type ReplyChannel = Channel<CriticalSectionRawMutex, CommandReply, REPLY_DEPTH>;

/// Inbound command channel: shell → runner.
pub static COMMANDS: CommandChannel = Channel::new();

/// Outbound reply channel: runner → shell.
pub static REPLIES: ReplyChannel = Channel::new();
