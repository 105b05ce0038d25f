//! Time-of-day clock with alarm.
//!
//! Fields are held in binary and only converted to BCD at the register
//! boundary. Hours run 00-23.

use emu_core::{Ticks, VideoStandard};
use log::trace;

/// Register order: $x8 tenths, $x9 seconds, $xA minutes, $xB hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    pub tenths: u8,
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
}

const LIMITS: [u8; 4] = [10, 60, 60, 24];

impl Time {
    #[must_use]
    pub const fn new(hours: u8, minutes: u8, seconds: u8, tenths: u8) -> Self {
        Self {
            tenths,
            seconds,
            minutes,
            hours,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields()
            .iter()
            .zip(LIMITS)
            .all(|(&value, limit)| value < limit)
    }

    pub(crate) fn fields(&self) -> [u8; 4] {
        [self.tenths, self.seconds, self.minutes, self.hours]
    }

    pub(crate) fn from_fields([tenths, seconds, minutes, hours]: [u8; 4]) -> Self {
        Self {
            tenths,
            seconds,
            minutes,
            hours,
        }
    }

    fn field_mut(&mut self, index: usize) -> &mut u8 {
        match index {
            0 => &mut self.tenths,
            1 => &mut self.seconds,
            2 => &mut self.minutes,
            _ => &mut self.hours,
        }
    }

    /// Add one tenth, carrying through to hours and wrapping at midnight.
    fn increment(&mut self) {
        for (index, limit) in LIMITS.into_iter().enumerate() {
            let field = self.field_mut(index);
            *field += 1;
            if *field < limit {
                return;
            }
            *field = 0;
        }
    }
}

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

fn from_bcd(value: u8, limit: u8) -> u8 {
    (((value >> 4) & 0x0F) * 10 + (value & 0x0F)) % limit
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfDay {
    pub(crate) time: Time,
    pub(crate) alarm: Time,
    /// Frozen copy of the clock between the first field read and the
    /// hours read.
    pub(crate) latch: Option<Time>,
    /// Set by writing hours, cleared by writing tenths.
    pub(crate) halted: bool,
    /// Whether the clock currently equals the alarm.
    pub(crate) matched: bool,
    pub(crate) accumulator: u64,
    pub(crate) threshold: u64,
}

impl TimeOfDay {
    pub(crate) fn new(video: VideoStandard) -> Self {
        Self {
            time: Time::default(),
            alarm: Time::default(),
            latch: None,
            halted: false,
            matched: true,
            accumulator: 0,
            threshold: video.tod_tenth_cycles().get(),
        }
    }

    /// Power-on state. Time and alarm survive.
    pub(crate) fn reset(&mut self) {
        self.latch = None;
        self.halted = false;
        self.accumulator = 0;
        self.matched = self.time == self.alarm;
    }

    pub(crate) fn set_threshold(&mut self, cycles: Ticks) {
        self.threshold = cycles.get().max(1);
        self.accumulator %= self.threshold;
    }

    #[must_use]
    pub fn time(&self) -> Time {
        self.time
    }

    #[must_use]
    pub fn alarm(&self) -> Time {
        self.alarm
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[must_use]
    pub fn is_latched(&self) -> bool {
        self.latch.is_some()
    }

    /// Consume `cycles` of φ2 time. Returns true if the alarm matched on
    /// any tenth crossed.
    pub(crate) fn advance(&mut self, cycles: u32) -> bool {
        if self.halted {
            return false;
        }
        self.accumulator += u64::from(cycles);
        let mut alarm = false;
        while self.accumulator >= self.threshold {
            self.accumulator -= self.threshold;
            self.time.increment();
            let matched = self.time == self.alarm;
            if matched && !self.matched {
                trace!(
                    "TOD alarm at {:02}:{:02}:{:02}.{}",
                    self.time.hours, self.time.minutes, self.time.seconds, self.time.tenths
                );
                alarm = true;
            }
            self.matched = matched;
        }
        alarm
    }

    /// Read field 0-3 as BCD. Any read freezes the clock view; reading
    /// hours releases it.
    pub(crate) fn read(&mut self, index: usize) -> u8 {
        let view = *self.latch.get_or_insert(self.time);
        if index == 3 {
            self.latch = None;
        }
        to_bcd(view.fields()[index & 3])
    }

    /// Peek field 0-3 as BCD without touching the latch.
    #[must_use]
    pub fn peek(&self, index: usize) -> u8 {
        let view = self.latch.unwrap_or(self.time);
        to_bcd(view.fields()[index & 3])
    }

    /// Write field 0-3 from BCD to the clock, or to the alarm when
    /// `to_alarm` is set.
    pub(crate) fn write(&mut self, index: usize, value: u8, to_alarm: bool) {
        let index = index & 3;
        let value = from_bcd(value, LIMITS[index]);
        if to_alarm {
            *self.alarm.field_mut(index) = value;
        } else {
            *self.time.field_mut(index) = value;
            if let Some(latch) = self.latch.as_mut() {
                *latch.field_mut(index) = value;
            }
            match index {
                3 => self.halted = true,
                0 => {
                    self.halted = false;
                    self.accumulator = 0;
                }
                _ => {}
            }
        }
        self.matched = self.time == self.alarm;
    }
}
