//! Interval timers A and B.

use log::trace;

/// Control register bits shared by CRA ($xE) and CRB ($xF).
pub mod control {
    pub const START: u8 = 0x01;
    /// Timer output on PB6 (A) or PB7 (B).
    pub const PB_ON: u8 = 0x02;
    /// PB output toggles instead of pulsing.
    pub const TOGGLE: u8 = 0x04;
    pub const ONE_SHOT: u8 = 0x08;
    /// Strobe: copy latch to counter. Never stored.
    pub const FORCE_LOAD: u8 = 0x10;
    /// CRA: count CNT edges instead of φ2.
    pub const CRA_CNT: u8 = 0x20;
    /// CRA: serial port is an output.
    pub const CRA_SP_OUTPUT: u8 = 0x40;
    /// CRA: TOD input is 50 Hz.
    pub const CRA_TOD_50HZ: u8 = 0x80;
    /// CRB bits 5-6: Timer B input select.
    pub const CRB_INPUT: u8 = 0x60;
    /// CRB: TOD writes go to the alarm.
    pub const CRB_ALARM: u8 = 0x80;
}

use control::{FORCE_LOAD, ONE_SHOT, START};

/// What Timer B counts (CRB bits 5-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerBInput {
    Phi2,
    Cnt,
    TimerA,
    TimerAWhileCnt,
}

impl TimerBInput {
    #[must_use]
    pub fn from_crb(crb: u8) -> Self {
        match (crb & control::CRB_INPUT) >> 5 {
            0 => Self::Phi2,
            1 => Self::Cnt,
            2 => Self::TimerA,
            _ => Self::TimerAWhileCnt,
        }
    }
}

/// Which counter byte a read touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Half {
    Low,
    High,
}

/// A 16-bit down counter with reload latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    name: &'static str,
    pub(crate) latch: u16,
    pub(crate) counter: u16,
    /// Control byte as last written, minus the force-load strobe.
    pub(crate) control: u8,
    /// Counter value frozen by the first byte read while running, and which
    /// byte that read was.
    pub(crate) snapshot: Option<(Half, u16)>,
}

impl Timer {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            latch: 0xFFFF,
            counter: 0xFFFF,
            control: 0,
            snapshot: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.latch = 0xFFFF;
        self.counter = 0xFFFF;
        self.control = 0;
        self.snapshot = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.control & START != 0
    }

    #[must_use]
    pub fn is_one_shot(&self) -> bool {
        self.control & ONE_SHOT != 0
    }

    #[must_use]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    #[must_use]
    pub fn latch(&self) -> u16 {
        self.latch
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Count down `ticks` input events and return how many underflows
    /// happened. One-shot timers stop at zero on their first underflow;
    /// continuous timers reload from the latch.
    pub(crate) fn count(&mut self, ticks: u32) -> u32 {
        let mut left = ticks;
        let mut underflows = 0;
        while left > 0 && self.is_running() {
            let step = u32::from(self.counter).clamp(1, left);
            self.counter = self.counter.saturating_sub(step as u16);
            left -= step;
            if self.counter == 0 {
                underflows += 1;
                if self.is_one_shot() {
                    self.control &= !START;
                } else {
                    self.counter = self.latch;
                }
            }
        }
        underflows
    }

    pub(crate) fn write_latch_low(&mut self, value: u8) {
        self.latch = (self.latch & 0xFF00) | u16::from(value);
    }

    /// Writing the high byte of a stopped timer also loads the counter.
    pub(crate) fn write_latch_high(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(value) << 8);
        if !self.is_running() {
            self.counter = self.latch;
        }
    }

    /// Store a control byte. Returns true when the write strobed
    /// force-load.
    pub(crate) fn write_control(&mut self, value: u8) -> bool {
        let was_running = self.is_running();
        self.control = value & !FORCE_LOAD;
        if value & FORCE_LOAD != 0 {
            self.counter = self.latch;
            trace!("{}: force load ${:04X}", self.name, self.latch);
            return true;
        }
        if !was_running && self.is_running() {
            self.counter = self.latch;
        }
        false
    }

    /// Counter byte read. While running, a byte read freezes the value for
    /// one following read of the other byte. Reading the same byte again
    /// takes a fresh value.
    pub(crate) fn read(&mut self, half: Half) -> u8 {
        let value = match self.snapshot.take() {
            Some((first, frozen)) if first != half => frozen,
            _ => {
                if self.is_running() {
                    self.snapshot = Some((half, self.counter));
                }
                self.counter
            }
        };
        let [lo, hi] = value.to_le_bytes();
        match half {
            Half::Low => lo,
            Half::High => hi,
        }
    }
}
