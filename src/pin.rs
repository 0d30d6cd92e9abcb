//! Electrical pin configuration and its nRF52 `PIN_CNF` register encoding.
//!
//! ```text
//!  31        18 17 16 15    11 10  8 7     4 3  2  1   0
//! ┌────────────┬─────┬────────┬─────┬───────┬────┬─────┬───┐
//! │  reserved  │SENSE│  res.  │DRIVE│ res.  │PULL│INPUT│DIR│
//! └────────────┴─────┴────────┴─────┴───────┴────┴─────┴───┘
//! ```
//!
//! The encoding is shared by the raw-register strategy, the post-write
//! verification, and the simulated GPIO port, so all three agree on what a
//! given [`PinConfig`] looks like in hardware.

use serde::{Deserialize, Serialize};

// ── Register fields ───────────────────────────────────────────

const DIR_OUTPUT: u32 = 1 << 0;
const INPUT_DISCONNECT: u32 = 1 << 1;
const PULL_SHIFT: u32 = 2;
const PULL_MASK: u32 = 0b11 << PULL_SHIFT;
const DRIVE_SHIFT: u32 = 8;
const DRIVE_MASK: u32 = 0b111 << DRIVE_SHIFT;

/// SENSE field (bits 16–17).  Owned by whoever arms port-event wakeups;
/// preserved across raw writes and ignored by verification.
pub const SENSE_MASK: u32 = 0b11 << 16;

/// Bits this crate owns inside `PIN_CNF`.
pub const CNF_MASK: u32 = DIR_OUTPUT | INPUT_DISCONNECT | PULL_MASK | DRIVE_MASK;

// ── Types ─────────────────────────────────────────────────────

/// Logical pin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pull {
    None,
    Down,
    Up,
}

impl Pull {
    /// Level an undriven net settles at under this pull.  A floating net
    /// is treated as resting low.
    pub const fn resting_level(self) -> Level {
        match self {
            Self::Up => Level::High,
            Self::None | Self::Down => Level::Low,
        }
    }

    const fn bits(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Down => 1,
            Self::Up => 3,
        }
    }
}

/// Output drive configuration, `S` = standard, `H` = high drive,
/// `D` = disconnected, for the `0` and `1` levels respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveStrength {
    Standard,
    HighDrive0Standard1,
    Standard0HighDrive1,
    HighDrive,
    Disconnect0Standard1,
    Disconnect0HighDrive1,
    Standard0Disconnect1,
    HighDrive0Disconnect1,
}

impl DriveStrength {
    pub const ALL: [Self; 8] = [
        Self::Standard,
        Self::HighDrive0Standard1,
        Self::Standard0HighDrive1,
        Self::HighDrive,
        Self::Disconnect0Standard1,
        Self::Disconnect0HighDrive1,
        Self::Standard0Disconnect1,
        Self::HighDrive0Disconnect1,
    ];

    const fn bits(self) -> u32 {
        self as u32
    }
}

/// A complete electrical configuration for one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    pub direction: Direction,
    pub pull: Pull,
    pub drive: DriveStrength,
    /// Level to latch before switching to output.  Inputs carry `None`.
    pub initial_level: Option<Level>,
}

impl PinConfig {
    /// Input with pull-down: the configuration the matrix row needs for
    /// reliable key detection on the ergonude shield.
    pub const INPUT_PULL_DOWN: Self = Self::input(Pull::Down);

    /// Power-on reset state; what the pin is left in at shutdown.
    pub const SAFE_DEFAULT: Self = Self::input(Pull::None);

    pub const fn input(pull: Pull) -> Self {
        Self {
            direction: Direction::Input,
            pull,
            drive: DriveStrength::Standard,
            initial_level: None,
        }
    }

    pub const fn output(level: Level, drive: DriveStrength) -> Self {
        Self {
            direction: Direction::Output,
            pull: Pull::None,
            drive,
            initial_level: Some(level),
        }
    }

    /// Whether the driver path can express this configuration.
    ///
    /// Inputs carry no initial level and keep the standard drive; outputs
    /// carry a level and no pull.  Anything else would read back as a
    /// mismatch on hardware.
    pub const fn is_valid(&self) -> bool {
        match self.direction {
            Direction::Input => {
                self.initial_level.is_none() && matches!(self.drive, DriveStrength::Standard)
            }
            Direction::Output => self.initial_level.is_some() && matches!(self.pull, Pull::None),
        }
    }

    pub const fn is_input(&self) -> bool {
        matches!(self.direction, Direction::Input)
    }

    /// Encode into `PIN_CNF` bits.  The input buffer is always connected so
    /// the level stays readable in both directions.
    pub const fn to_pin_cnf(&self) -> u32 {
        let dir = match self.direction {
            Direction::Input => 0,
            Direction::Output => DIR_OUTPUT,
        };
        dir | (self.pull.bits() << PULL_SHIFT) | (self.drive.bits() << DRIVE_SHIFT)
    }

    /// Decode `PIN_CNF` plus the port's `OUT` bit for this pin.
    ///
    /// Returns `None` for encodings this crate never writes (disconnected
    /// input buffer, reserved pull value).
    pub fn from_pin_cnf(cnf: u32, out: Level) -> Option<Self> {
        if cnf & INPUT_DISCONNECT != 0 {
            return None;
        }
        let pull = match (cnf & PULL_MASK) >> PULL_SHIFT {
            0 => Pull::None,
            1 => Pull::Down,
            3 => Pull::Up,
            _ => return None,
        };
        let drive = DriveStrength::ALL[((cnf & DRIVE_MASK) >> DRIVE_SHIFT) as usize];
        let (direction, initial_level) = if cnf & DIR_OUTPUT != 0 {
            (Direction::Output, Some(out))
        } else {
            (Direction::Input, None)
        };
        Some(Self {
            direction,
            pull,
            drive,
            initial_level,
        })
    }
}

impl core::fmt::Display for PinConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.direction, self.initial_level) {
            (Direction::Output, Some(level)) => {
                write!(f, "output {:?} ({:?})", level, self.drive)
            }
            _ => write!(f, "{:?} pull={:?}", self.direction, self.pull),
        }
    }
}

/// Merge `config` into an existing register value, keeping bits this
/// crate does not own (SENSE, reserved).
pub const fn merge_pin_cnf(current: u32, config: &PinConfig) -> u32 {
    (current & !CNF_MASK) | config.to_pin_cnf()
}
