//! Inbound commands to the controller.
//!
//! These represent manual interventions requested by shell or diagnostics
//! tooling that the [`Controller`](super::service::Controller) interprets
//! between ticks.

use crate::control::applier::AppliedVia;
use crate::diagnostics::PinStatus;
use crate::error::Error;
use crate::pin::PinConfig;

/// Commands that external tooling can send into the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardCommand {
    /// Report level, last configuration and loop counters.
    CheckStatus,

    /// Run a corrective pass right now and report how it went.
    ForceReconfigure,

    /// Replace the desired configuration.
    SetDesired(PinConfig),

    /// Reset the attempt counter and re-run the boot pass.
    Restart,

    /// Cancel the loop and release the pin to its safe default.
    Shutdown,
}

/// Reply to a [`GuardCommand`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Status(PinStatus),
    Reconfigured(Result<AppliedVia, Error>),
    Ack,
    Rejected(Error),
}
