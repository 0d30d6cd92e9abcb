//! Timer adapters.
//!
//! - **feature `sim`**: `async-io-mini` reactor timers, the same ones the
//!   host executor drives, with `std::time::Instant` as the clock.
//! - **feature `nrf`**: `embassy-time`, backed by the RTC1 time driver.
//!
//! Both yield to the executor.  Neither is suitable for the enhanced pull
//! hold, which goes through `DelayNs` instead.

use core::time::Duration;

use crate::app::ports::TimerPort;

/// Reactor-driven timer for the host runtime.
#[cfg(feature = "sim")]
#[derive(Debug, Clone, Copy)]
pub struct AsyncIoTimer {
    origin: std::time::Instant,
}

#[cfg(feature = "sim")]
impl AsyncIoTimer {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "sim")]
impl Default for AsyncIoTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "sim")]
impl TimerPort for AsyncIoTimer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        async_io_mini::Timer::after(duration).await;
    }
}

/// `embassy-time` timer for the nRF build.
#[cfg(feature = "nrf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyTimer;

#[cfg(feature = "nrf")]
impl TimerPort for EmbassyTimer {
    /// Uptime since the time driver started.
    fn now(&self) -> Duration {
        Duration::from_micros(embassy_time::Instant::now().as_micros())
    }

    async fn sleep(&self, duration: Duration) {
        let us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        embassy_time::Timer::after(embassy_time::Duration::from_micros(us)).await;
    }
}
