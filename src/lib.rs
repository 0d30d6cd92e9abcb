//! pinguard: self-correcting configuration guard for a contended
//! keyboard matrix row.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator.  Hardware lives behind the port traits in [`app::ports`];
//! the nRF52840 adapter is behind the `nrf` feature.

#![cfg_attr(target_os = "none", no_std)]
#![deny(unused_must_use)]

// Link the embassy-time std driver that backs async-io-mini's Timer.
#[cfg(feature = "sim")]
use embassy_time as _;

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod error;
pub mod pin;
pub mod pins;
pub mod runner;
pub mod scheduler;
pub mod sensors;

pub use app::service::Controller;
pub use error::{Error, Result};
