//! Master clock rate.

use crate::Ticks;

/// The crystal-derived rate that every other period divides.
///
/// On the machines emulated here the processor clock is the master clock:
/// one tick is one CPU cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Clock frequency in Hz (e.g. `985_248` for a PAL C64).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Whole ticks in one period of an event recurring `per_second` times a
    /// second (integer division, the remainder is dropped).
    #[must_use]
    pub const fn ticks_per_interval(&self, per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / per_second)
    }
}
