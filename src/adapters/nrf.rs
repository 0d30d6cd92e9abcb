//! nRF52840 adapter for the row pin.
//!
//! - Driver path: an embassy-nrf [`Flex`] pin, switched between input and
//!   output with the requested pull and drive.
//! - Raw path: volatile access to the GPIO port register block at the
//!   offsets in [`crate::pins`].
//! - Busy-wait: `cortex_m::asm::delay` at the 64 MHz core clock.
//!
//! The matrix scanner owns the same pad through its own driver instance,
//! which is exactly the contention the guard exists to correct.

use embassy_nrf::Peri;
use embassy_nrf::gpio::{Flex, OutputDrive, Pin, Pull as NrfPull};
use embedded_hal::delay::DelayNs;

use crate::app::ports::{PinPort, RegisterPort};
use crate::error::Result;
use crate::pin::{Direction, DriveStrength, Level, PinConfig, Pull};
use crate::pins;

/// Core clock in MHz, cycles per microsecond.
const CPU_MHZ: u32 = 64;

fn nrf_pull(pull: Pull) -> NrfPull {
    match pull {
        Pull::None => NrfPull::None,
        Pull::Down => NrfPull::Down,
        Pull::Up => NrfPull::Up,
    }
}

fn nrf_drive(drive: DriveStrength) -> OutputDrive {
    match drive {
        DriveStrength::Standard => OutputDrive::Standard,
        DriveStrength::HighDrive0Standard1 => OutputDrive::HighDrive0Standard1,
        DriveStrength::Standard0HighDrive1 => OutputDrive::Standard0HighDrive1,
        DriveStrength::HighDrive => OutputDrive::HighDrive,
        DriveStrength::Disconnect0Standard1 => OutputDrive::Disconnect0Standard1,
        DriveStrength::Disconnect0HighDrive1 => OutputDrive::Disconnect0HighDrive1,
        DriveStrength::Standard0Disconnect1 => OutputDrive::Standard0Disconnect1,
        DriveStrength::HighDrive0Disconnect1 => OutputDrive::HighDrive0Disconnect1,
    }
}

pub struct NrfPin<'d> {
    flex: Flex<'d>,
    base: usize,
}

impl<'d> NrfPin<'d> {
    /// `port` must be the port `pin` lives on; `None` for a port the
    /// nRF52840 does not have.
    pub fn new(pin: Peri<'d, impl Pin>, port: u8) -> Option<Self> {
        let base = pins::port_base(port)?;
        Some(Self {
            flex: Flex::new(pin),
            base,
        })
    }

    fn register(&self, offset: u32) -> *mut u32 {
        (self.base + offset as usize) as *mut u32
    }
}

impl PinPort for NrfPin<'_> {
    /// The GPIO block has no clock gate or init step; owning the pin is
    /// enough.
    fn is_ready(&self) -> bool {
        true
    }

    /// `Flex` takes a pull only for inputs and a drive only for outputs,
    /// which is exactly what a valid [`PinConfig`] carries.
    fn configure(&mut self, config: &PinConfig) -> Result<()> {
        match config.direction {
            Direction::Input => self.flex.set_as_input(nrf_pull(config.pull)),
            Direction::Output => {
                match config.initial_level {
                    Some(Level::High) => self.flex.set_high(),
                    _ => self.flex.set_low(),
                }
                self.flex.set_as_output(nrf_drive(config.drive));
            }
        }
        Ok(())
    }

    fn read_level(&mut self) -> Level {
        Level::from(self.flex.is_high())
    }
}

impl RegisterPort for NrfPin<'_> {
    fn read_register(&self, offset: u32) -> u32 {
        // SAFETY: `base` is a GPIO port base from `pins::port_base` and
        // every offset used by this crate lies inside that register block.
        unsafe { core::ptr::read_volatile(self.register(offset)) }
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        // SAFETY: as in `read_register`.  Word writes to these registers
        // have no side effects beyond the pins they name.
        unsafe { core::ptr::write_volatile(self.register(offset), value) };
        Ok(())
    }
}

impl DelayNs for NrfPin<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (u64::from(ns) * u64::from(CPU_MHZ)).div_ceil(1000);
        cortex_m::asm::delay(u32::try_from(cycles).unwrap_or(u32::MAX));
    }
}
