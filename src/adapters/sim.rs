//! Simulated GPIO port for host builds and tests.
//!
//! Models one row pin well enough to exercise every strategy:
//!
//! - a `PIN_CNF` word and the port `OUT` register, written by either the
//!   driver path or the raw register path;
//! - the net's stored charge, which a healthy pull resets immediately and
//!   a weak pull leaves stale until something drives the pin;
//! - a [`Contender`] handle standing in for the matrix scanner, which can
//!   reclaim the pin or drive the net from outside at any time.
//!
//! The port and its contender share state through `Rc<RefCell<_>>`; the
//! whole thing is single-threaded like the executor it runs on.

use core::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use log::trace;

use crate::app::ports::{PinPort, RegisterPort};
use crate::error::{ConfigStrategy, Error, Result};
use crate::pin::{Direction, Level, PinConfig, Pull, merge_pin_cnf};
use crate::pins;

/// `PIN_CNF` reset value: input, buffer disconnected, no pull.
const PIN_CNF_RESET: u32 = 0x0000_0002;

/// Return code reported by a failing simulated driver (`-EIO`).
pub const SIM_DRIVER_RC: i32 = -5;

/// Return code reported by a refused raw register write (`-EPERM`).
pub const SIM_REGISTER_RC: i32 = -1;

/// One hardware access, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    Configure(PinConfig),
    ReadLevel,
    ReadRegister(u32),
    WriteRegister { offset: u32, value: u32 },
    DelayNs(u32),
    /// The contender rewrote the pin.
    Reclaim(PinConfig),
}

struct SimState {
    pin: u8,
    pin_cnf: u32,
    out: u32,
    charge: Level,
    external: Option<Level>,
    ready: bool,
    weak_pull: bool,
    fail_driver: bool,
    fail_driver_for: Option<PinConfig>,
    fail_registers: bool,
    driver_calls: usize,
    register_accesses: usize,
    register_writes: usize,
    reclaims: usize,
    calls: Vec<SimCall>,
}

impl SimState {
    fn mask(&self) -> u32 {
        1 << self.pin
    }

    fn cnf_offset(&self) -> u32 {
        pins::pin_cnf_offset(self.pin)
    }

    fn out_level(&self) -> Level {
        Level::from(self.out & self.mask() != 0)
    }

    fn config(&self) -> Option<PinConfig> {
        PinConfig::from_pin_cnf(self.pin_cnf, self.out_level())
    }

    /// Level the net sits at right now.
    fn level(&self) -> Level {
        if let Some(level) = self.external {
            return level;
        }
        match self.config() {
            Some(cfg) if cfg.direction == Direction::Output => self.out_level(),
            Some(cfg) if cfg.pull != Pull::None && !self.weak_pull => cfg.pull.resting_level(),
            _ => self.charge,
        }
    }

    /// Let the net follow whatever is driving it.
    fn settle(&mut self) {
        self.charge = self.level();
    }

    fn set_out(&mut self, level: Level) {
        if level.is_high() {
            self.out |= self.mask();
        } else {
            self.out &= !self.mask();
        }
    }

    fn write_config(&mut self, config: &PinConfig) {
        if let Some(level) = config.initial_level {
            self.set_out(level);
        }
        self.pin_cnf = merge_pin_cnf(self.pin_cnf, config);
        self.settle();
    }
}

// ───────────────────────────────────────────────────────────────
// SimGpio
// ───────────────────────────────────────────────────────────────

/// Simulated GPIO port owning one row pin.
pub struct SimGpio {
    state: Rc<RefCell<SimState>>,
}

impl SimGpio {
    pub fn new(pin: u8) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                pin,
                pin_cnf: PIN_CNF_RESET,
                out: 0,
                charge: Level::Low,
                external: None,
                ready: true,
                weak_pull: false,
                fail_driver: false,
                fail_driver_for: None,
                fail_registers: false,
                driver_calls: 0,
                register_accesses: 0,
                register_writes: 0,
                reclaims: 0,
                calls: Vec::new(),
            })),
        }
    }

    /// Handle for the other side of the race (and for test knobs).
    pub fn contender(&self) -> Contender {
        Contender {
            state: Rc::clone(&self.state),
        }
    }
}

impl PinPort for SimGpio {
    fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    fn configure(&mut self, config: &PinConfig) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.driver_calls += 1;
        s.calls.push(SimCall::Configure(*config));
        if s.fail_driver || s.fail_driver_for == Some(*config) {
            return Err(Error::ConfigWriteFailed {
                strategy: ConfigStrategy::DriverLevelCall,
                code: SIM_DRIVER_RC,
            });
        }
        s.write_config(config);
        trace!("SimGpio: configure {} -> PIN_CNF=0x{:08x}", config, s.pin_cnf);
        Ok(())
    }

    fn read_level(&mut self) -> Level {
        let mut s = self.state.borrow_mut();
        s.calls.push(SimCall::ReadLevel);
        s.level()
    }
}

impl RegisterPort for SimGpio {
    fn read_register(&self, offset: u32) -> u32 {
        let mut s = self.state.borrow_mut();
        s.register_accesses += 1;
        s.calls.push(SimCall::ReadRegister(offset));
        match offset {
            pins::OUT => s.out,
            pins::IN => {
                if s.level().is_high() {
                    s.mask()
                } else {
                    0
                }
            }
            o if o == s.cnf_offset() => s.pin_cnf,
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        let mut s = self.state.borrow_mut();
        s.register_accesses += 1;
        s.register_writes += 1;
        s.calls.push(SimCall::WriteRegister { offset, value });
        if s.fail_registers {
            return Err(Error::ConfigWriteFailed {
                strategy: ConfigStrategy::RawRegisterWrite,
                code: SIM_REGISTER_RC,
            });
        }
        match offset {
            pins::OUT => s.out = value,
            pins::OUTSET => s.out |= value,
            pins::OUTCLR => s.out &= !value,
            o if o == s.cnf_offset() => s.pin_cnf = value,
            _ => {}
        }
        s.settle();
        Ok(())
    }
}

impl DelayNs for SimGpio {
    /// Records the hold instead of spinning; simulated time does not pass.
    fn delay_ns(&mut self, ns: u32) {
        self.state.borrow_mut().calls.push(SimCall::DelayNs(ns));
    }
}

// ───────────────────────────────────────────────────────────────
// Contender
// ───────────────────────────────────────────────────────────────

/// The matrix scanner's view of the same pin, plus fault injection.
#[derive(Clone)]
pub struct Contender {
    state: Rc<RefCell<SimState>>,
}

impl Contender {
    /// The scanner rewrites the pin with its own configuration.
    pub fn reclaim(&self, config: PinConfig) {
        let mut s = self.state.borrow_mut();
        s.reclaims += 1;
        s.calls.push(SimCall::Reclaim(config));
        s.write_config(&config);
    }

    /// Drive the net from outside (`None` releases it).
    pub fn drive_external(&self, level: Option<Level>) {
        let mut s = self.state.borrow_mut();
        s.external = level;
        s.settle();
    }

    /// Leave a stale charge on the net.
    pub fn set_charge(&self, level: Level) {
        self.state.borrow_mut().charge = level;
    }

    /// A weak pull does not discharge the net on its own.
    pub fn set_weak_pull(&self, weak: bool) {
        self.state.borrow_mut().weak_pull = weak;
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.borrow_mut().ready = ready;
    }

    pub fn fail_driver(&self, fail: bool) {
        let mut s = self.state.borrow_mut();
        s.fail_driver = fail;
        if !fail {
            s.fail_driver_for = None;
        }
    }

    /// Fail driver calls for one specific configuration only.
    pub fn fail_driver_for(&self, config: PinConfig) {
        self.state.borrow_mut().fail_driver_for = Some(config);
    }

    pub fn fail_registers(&self, fail: bool) {
        self.state.borrow_mut().fail_registers = fail;
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn level(&self) -> Level {
        self.state.borrow().level()
    }

    pub fn pin_cnf(&self) -> u32 {
        self.state.borrow().pin_cnf
    }

    /// Decoded configuration, `None` while disconnected.
    pub fn config(&self) -> Option<PinConfig> {
        self.state.borrow().config()
    }

    pub fn driver_calls(&self) -> usize {
        self.state.borrow().driver_calls
    }

    pub fn register_accesses(&self) -> usize {
        self.state.borrow().register_accesses
    }

    pub fn register_writes(&self) -> usize {
        self.state.borrow().register_writes
    }

    pub fn reclaims(&self) -> usize {
        self.state.borrow().reclaims
    }

    pub fn calls(&self) -> Vec<SimCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}
