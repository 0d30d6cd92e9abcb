//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                     | Connects to              |
//! |---------------|--------------------------------|--------------------------|
//! | `log_sink`    | EventSink                      | `log` facade             |
//! | `sim`         | PinPort, RegisterPort, DelayNs | In-memory GPIO + scanner |
//! | `timer`       | TimerPort                      | async-io-mini / embassy  |
//! | `config_file` | ConfigPort                     | JSON file (host)         |
//! | `nrf`         | PinPort, RegisterPort, DelayNs | nRF52840 P0/P1           |

pub mod log_sink;
#[cfg(not(target_os = "none"))]
pub mod sim;
#[cfg(any(feature = "sim", feature = "nrf"))]
pub mod timer;

#[cfg(feature = "sim")]
pub mod config_file;
#[cfg(feature = "nrf")]
pub mod nrf;
