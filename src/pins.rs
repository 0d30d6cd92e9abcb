//! Pin assignment and GPIO register map for the ergonude right half.
//!
//! Single source of truth for the contended matrix row.  The raw-register
//! strategy, the nRF adapter, and the simulator all take their offsets
//! from here.
//!
//! Register offsets are relative to the GPIO port base, per the nRF52840
//! product specification (GPIO chapter).

// ---------------------------------------------------------------------------
// Contended matrix row
// ---------------------------------------------------------------------------

/// GPIO port of the contended row (P0).
pub const ROW_PORT: u8 = 0;
/// Pin number of the contended row within its port (P0.05).
pub const ROW_PIN: u8 = 5;
/// Human-readable label used in logs and status frames.
pub const ROW_LABEL: &str = "P0.05";

// ---------------------------------------------------------------------------
// GPIO port base addresses
// ---------------------------------------------------------------------------

pub const P0_BASE: usize = 0x5000_0000;
pub const P1_BASE: usize = 0x5000_0300;

/// Base address for a port number, `None` if the port does not exist.
pub const fn port_base(port: u8) -> Option<usize> {
    match port {
        0 => Some(P0_BASE),
        1 => Some(P1_BASE),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Register offsets
// ---------------------------------------------------------------------------

/// Port output value.
pub const OUT: u32 = 0x504;
/// Write-1-to-set port output bits.
pub const OUTSET: u32 = 0x508;
/// Write-1-to-clear port output bits.
pub const OUTCLR: u32 = 0x50C;
/// Port input value.
pub const IN: u32 = 0x510;
/// `PIN_CNF[0]`; each pin's configuration word follows at a 4-byte stride.
pub const PIN_CNF_BASE: u32 = 0x700;

/// Offset of `PIN_CNF[pin]`.
pub const fn pin_cnf_offset(pin: u8) -> u32 {
    PIN_CNF_BASE + 4 * pin as u32
}
