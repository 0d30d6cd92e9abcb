//! Application core: pure domain logic, no I/O.
//!
//! The corrective loop for the contended row: the [`service::Controller`],
//! its inbound [`commands`] and outbound [`events`], and the channels the
//! runner serves.  All interaction with hardware happens through the
//! **port traits** in [`ports`], so this layer runs unchanged against the
//! simulator and the nRF adapter.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
