//! Video standard and the timing it dictates.

use crate::{MasterClock, Ticks};

/// PAL or NTSC. Selects the CPU clock, the raster geometry and therefore
/// the number of cycles in a tenth of a second for the time-of-day clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VideoStandard {
    #[default]
    Pal,
    Ntsc,
}

impl VideoStandard {
    /// CPU clock in Hz.
    #[must_use]
    pub const fn cpu_clock(self) -> u64 {
        match self {
            Self::Pal => 985_248,
            Self::Ntsc => 1_022_727,
        }
    }

    #[must_use]
    pub const fn master_clock(self) -> MasterClock {
        MasterClock::new(self.cpu_clock())
    }

    #[must_use]
    pub const fn cycles_per_line(self) -> u64 {
        match self {
            Self::Pal => 63,
            Self::Ntsc => 65,
        }
    }

    #[must_use]
    pub const fn lines_per_frame(self) -> u64 {
        match self {
            Self::Pal => 312,
            Self::Ntsc => 263,
        }
    }

    #[must_use]
    pub const fn cycles_per_frame(self) -> u64 {
        self.cycles_per_line() * self.lines_per_frame()
    }

    /// Cycles between time-of-day tenth-second increments.
    #[must_use]
    pub const fn tod_tenth_cycles(self) -> Ticks {
        self.master_clock().ticks_per_interval(10)
    }

    /// Stable encoding for save states.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Pal => 0,
            Self::Ntsc => 1,
        }
    }

    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Pal),
            1 => Some(Self::Ntsc),
            _ => None,
        }
    }
}
