//! MOS 6526 Complex Interface Adapter.
//!
//! Two 16-bit interval timers, a BCD time-of-day clock with alarm, a serial
//! shift register, two 8-bit parallel ports and the interrupt control
//! register that ties them together. The C64 has two: CIA1 drives IRQ and
//! CIA2 drives NMI.
//!
//! Register map (offset within the 16-byte block):
//!
//! | Offset | Read                       | Write                      |
//! |--------|----------------------------|----------------------------|
//! | $0     | Port A pins                | Port A output              |
//! | $1     | Port B pins                | Port B output              |
//! | $2     | DDR A                      | DDR A                      |
//! | $3     | DDR B                      | DDR B                      |
//! | $4/$5  | Timer A counter lo/hi      | Timer A latch lo/hi        |
//! | $6/$7  | Timer B counter lo/hi      | Timer B latch lo/hi        |
//! | $8-$B  | TOD tenths/sec/min/hours   | TOD clock or alarm         |
//! | $C     | Serial data                | Serial data                |
//! | $D     | ICR (read clears)          | ICR mask (set/clear)       |
//! | $E     | Control A                  | Control A                  |
//! | $F     | Control B                  | Control B                  |

mod icr;
mod port;
mod serial;
mod snapshot;
mod timer;
mod tod;

pub use icr::{IR, InterruptControl, Interrupts, SET_CLEAR};
pub use port::Port;
pub use serial::SerialPort;
pub use snapshot::{SNAPSHOT_TAG, SNAPSHOT_VERSION};
pub use timer::{Timer, TimerBInput, control};
pub use tod::{Time, TimeOfDay};

use emu_core::{Observable, Tickable, Ticks, Value, VideoStandard};
use log::debug;
use timer::Half;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cia6526 {
    name: &'static str,
    video: VideoStandard,
    pub(crate) port_a: Port,
    pub(crate) port_b: Port,
    pub(crate) timer_a: Timer,
    pub(crate) timer_b: Timer,
    pub(crate) tod: TimeOfDay,
    pub(crate) serial: SerialPort,
    pub(crate) icr: InterruptControl,
    /// CNT pin level.
    pub(crate) cnt: bool,
    /// FLAG pin level.
    pub(crate) flag: bool,
    /// PB6/PB7 toggle flip-flops for timers A and B.
    pub(crate) pb_toggle: [bool; 2],
    /// PB6/PB7 pulse outputs: the timer underflowed during the last advance.
    pub(crate) pb_pulse: [bool; 2],
}

impl Cia6526 {
    /// `name` only appears in log output.
    #[must_use]
    pub fn new(name: &'static str, video: VideoStandard) -> Self {
        Self {
            name,
            video,
            port_a: Port::default(),
            port_b: Port::default(),
            timer_a: Timer::new("timer A"),
            timer_b: Timer::new("timer B"),
            tod: TimeOfDay::new(video),
            serial: SerialPort::default(),
            icr: InterruptControl::default(),
            cnt: true,
            flag: true,
            pb_toggle: [false; 2],
            pb_pulse: [false; 2],
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Back to power-on registers. The TOD time and alarm are kept.
    pub fn reset(&mut self) {
        debug!("{}: reset", self.name);
        self.port_a.reset();
        self.port_b.reset();
        self.timer_a.reset();
        self.timer_b.reset();
        self.tod.reset();
        self.serial.reset();
        self.icr = InterruptControl::default();
        self.pb_toggle = [false; 2];
        self.pb_pulse = [false; 2];
    }

    #[must_use]
    pub fn video_standard(&self) -> VideoStandard {
        self.video
    }

    /// Changes the TOD tenth-second period.
    pub fn set_video_standard(&mut self, video: VideoStandard) {
        self.video = video;
        self.tod.set_threshold(video.tod_tenth_cycles());
    }

    /// Consume `cycles` of φ2 time.
    pub fn advance(&mut self, cycles: u32) {
        self.pb_pulse = [false; 2];

        let counts_phi2 = self.timer_a.control() & control::CRA_CNT == 0;
        let a_underflows = if counts_phi2 {
            self.timer_a.count(cycles)
        } else {
            0
        };
        self.timer_a_underflowed(a_underflows);

        let b_ticks = match TimerBInput::from_crb(self.timer_b.control()) {
            TimerBInput::Phi2 => cycles,
            TimerBInput::Cnt => 0,
            TimerBInput::TimerA => a_underflows,
            TimerBInput::TimerAWhileCnt if self.cnt => a_underflows,
            TimerBInput::TimerAWhileCnt => 0,
        };
        let b_underflows = self.timer_b.count(b_ticks);
        self.timer_b_underflowed(b_underflows);

        if self.tod.advance(cycles) {
            self.icr.latch(Interrupts::ALARM);
        }
    }

    fn timer_a_underflowed(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.icr.latch(Interrupts::TIMER_A);
        self.pb_pulse[0] = true;
        if count % 2 == 1 {
            self.pb_toggle[0] = !self.pb_toggle[0];
        }
        for _ in 0..count {
            if self.serial.timer_underflow() {
                self.icr.latch(Interrupts::SERIAL);
            }
        }
    }

    fn timer_b_underflowed(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.icr.latch(Interrupts::TIMER_B);
        self.pb_pulse[1] = true;
        if count % 2 == 1 {
            self.pb_toggle[1] = !self.pb_toggle[1];
        }
    }

    /// True while any enabled source is pending.
    #[must_use]
    pub fn irq_asserted(&self) -> bool {
        self.icr.asserted()
    }

    /// Register read with side effects (ICR clear, counter and TOD latches).
    pub fn read_register(&mut self, offset: u8) -> u8 {
        match offset & 0x0F {
            0x0 => self.port_a.read(),
            0x1 => self.port_b_pins(),
            0x2 => self.port_a.ddr,
            0x3 => self.port_b.ddr,
            0x4 => self.timer_a.read(Half::Low),
            0x5 => self.timer_a.read(Half::High),
            0x6 => self.timer_b.read(Half::Low),
            0x7 => self.timer_b.read(Half::High),
            reg @ 0x8..=0xB => self.tod.read(usize::from(reg - 8)),
            0xC => self.serial.data(),
            0xD => self.icr.read_and_clear(),
            0xE => self.timer_a.control(),
            _ => self.timer_b.control(),
        }
    }

    /// Register value without side effects.
    #[must_use]
    pub fn peek_register(&self, offset: u8) -> u8 {
        match offset & 0x0F {
            0x0 => self.port_a.read(),
            0x1 => self.port_b_pins(),
            0x2 => self.port_a.ddr,
            0x3 => self.port_b.ddr,
            0x4 => self.timer_a.counter() as u8,
            0x5 => (self.timer_a.counter() >> 8) as u8,
            0x6 => self.timer_b.counter() as u8,
            0x7 => (self.timer_b.counter() >> 8) as u8,
            reg @ 0x8..=0xB => self.tod.peek(usize::from(reg - 8)),
            0xC => self.serial.data(),
            0xD => self.icr.peek(),
            0xE => self.timer_a.control(),
            _ => self.timer_b.control(),
        }
    }

    pub fn write_register(&mut self, offset: u8, value: u8) {
        match offset & 0x0F {
            0x0 => self.port_a.output = value,
            0x1 => self.port_b.output = value,
            0x2 => self.port_a.ddr = value,
            0x3 => self.port_b.ddr = value,
            0x4 => self.timer_a.write_latch_low(value),
            0x5 => self.timer_a.write_latch_high(value),
            0x6 => self.timer_b.write_latch_low(value),
            0x7 => self.timer_b.write_latch_high(value),
            reg @ 0x8..=0xB => {
                let to_alarm = self.timer_b.control() & control::CRB_ALARM != 0;
                self.tod.write(usize::from(reg - 8), value, to_alarm);
            }
            0xC => self.serial.write_data(value),
            0xD => self.icr.write_mask(value),
            0xE => {
                let was_running = self.timer_a.is_running();
                if self.timer_a.write_control(value) {
                    self.icr.acknowledge(Interrupts::TIMER_A);
                }
                if !was_running && self.timer_a.is_running() {
                    self.pb_toggle[0] = true;
                }
                self.serial.set_output(value & control::CRA_SP_OUTPUT != 0);
            }
            _ => {
                let was_running = self.timer_b.is_running();
                if self.timer_b.write_control(value) {
                    self.icr.acknowledge(Interrupts::TIMER_B);
                }
                if !was_running && self.timer_b.is_running() {
                    self.pb_toggle[1] = true;
                }
            }
        }
    }

    /// Port B pins, with PB6/PB7 replaced by timer outputs when enabled.
    fn port_b_pins(&self) -> u8 {
        let mut value = self.port_b.read();
        for (index, timer) in [&self.timer_a, &self.timer_b].into_iter().enumerate() {
            let cr = timer.control();
            if cr & control::PB_ON == 0 {
                continue;
            }
            let high = if cr & control::TOGGLE != 0 {
                self.pb_toggle[index]
            } else {
                self.pb_pulse[index]
            };
            let bit = 0x40 << index;
            value = if high { value | bit } else { value & !bit };
        }
        value
    }

    /// CNT pin level change. A rising edge clocks CNT-counting timers and
    /// the serial input.
    pub fn notify_external_clock_edge(&mut self, level: bool) {
        let rising = level && !self.cnt;
        self.cnt = level;
        if !rising {
            return;
        }

        let mut a_underflows = 0;
        if self.timer_a.control() & control::CRA_CNT != 0 {
            a_underflows = self.timer_a.count(1);
            self.timer_a_underflowed(a_underflows);
        }
        let b_ticks = match TimerBInput::from_crb(self.timer_b.control()) {
            TimerBInput::Cnt => 1,
            TimerBInput::TimerA | TimerBInput::TimerAWhileCnt => a_underflows,
            TimerBInput::Phi2 => 0,
        };
        let b_underflows = self.timer_b.count(b_ticks);
        self.timer_b_underflowed(b_underflows);

        if self.serial.cnt_rising() {
            self.icr.latch(Interrupts::SERIAL);
        }
    }

    /// FLAG pin level change. A falling edge latches the FLAG interrupt.
    pub fn set_flag_pin(&mut self, level: bool) {
        if self.flag && !level {
            self.icr.latch(Interrupts::FLAG);
        }
        self.flag = level;
    }

    /// SP pin level driven from outside, sampled on CNT rising edges.
    pub fn set_sp_pin(&mut self, level: bool) {
        self.serial.sp_in = level;
    }

    pub fn set_port_a_input(&mut self, value: u8) {
        self.port_a.input = value;
    }

    pub fn set_port_b_input(&mut self, value: u8) {
        self.port_b.input = value;
    }

    /// Levels the chip drives on port A (output bits only; inputs read high).
    #[must_use]
    pub fn port_a_output(&self) -> u8 {
        self.port_a.output | !self.port_a.ddr
    }

    #[must_use]
    pub fn port_b_output(&self) -> u8 {
        self.port_b.output | !self.port_b.ddr
    }

    #[must_use]
    pub fn timer_a(&self) -> &Timer {
        &self.timer_a
    }

    #[must_use]
    pub fn timer_b(&self) -> &Timer {
        &self.timer_b
    }

    #[must_use]
    pub fn tod(&self) -> &TimeOfDay {
        &self.tod
    }

    #[must_use]
    pub fn serial(&self) -> &SerialPort {
        &self.serial
    }

    #[must_use]
    pub fn interrupt_control(&self) -> InterruptControl {
        self.icr
    }
}

impl Tickable for Cia6526 {
    fn tick(&mut self) {
        self.advance(1);
    }

    fn tick_n(&mut self, count: Ticks) {
        let mut left = count.get();
        while left > 0 {
            let step = left.min(u64::from(u32::MAX));
            self.advance(step as u32);
            left -= step;
        }
    }
}

const QUERY_PATHS: &[&str] = &[
    "timer_a.counter",
    "timer_a.latch",
    "timer_a.running",
    "timer_a.one_shot",
    "timer_b.counter",
    "timer_b.latch",
    "timer_b.running",
    "timer_b.one_shot",
    "cra",
    "crb",
    "icr.pending",
    "icr.mask",
    "irq",
    "tod.tenths",
    "tod.seconds",
    "tod.minutes",
    "tod.hours",
    "tod.halted",
    "tod.latched",
    "alarm.tenths",
    "alarm.seconds",
    "alarm.minutes",
    "alarm.hours",
    "port_a",
    "port_b",
    "ddr_a",
    "ddr_b",
    "sdr",
    "cnt",
];

impl Observable for Cia6526 {
    fn query(&self, path: &str) -> Option<Value> {
        let time = self.tod.time();
        let alarm = self.tod.alarm();
        let value = match path {
            "timer_a.counter" => self.timer_a.counter().into(),
            "timer_a.latch" => self.timer_a.latch().into(),
            "timer_a.running" => self.timer_a.is_running().into(),
            "timer_a.one_shot" => self.timer_a.is_one_shot().into(),
            "timer_b.counter" => self.timer_b.counter().into(),
            "timer_b.latch" => self.timer_b.latch().into(),
            "timer_b.running" => self.timer_b.is_running().into(),
            "timer_b.one_shot" => self.timer_b.is_one_shot().into(),
            "cra" => self.timer_a.control().into(),
            "crb" => self.timer_b.control().into(),
            "icr.pending" => self.icr.pending().bits().into(),
            "icr.mask" => self.icr.mask().bits().into(),
            "irq" => self.irq_asserted().into(),
            "tod.tenths" => time.tenths.into(),
            "tod.seconds" => time.seconds.into(),
            "tod.minutes" => time.minutes.into(),
            "tod.hours" => time.hours.into(),
            "tod.halted" => self.tod.is_halted().into(),
            "tod.latched" => self.tod.is_latched().into(),
            "alarm.tenths" => alarm.tenths.into(),
            "alarm.seconds" => alarm.seconds.into(),
            "alarm.minutes" => alarm.minutes.into(),
            "alarm.hours" => alarm.hours.into(),
            "port_a" => self.port_a.read().into(),
            "port_b" => self.port_b_pins().into(),
            "ddr_a" => self.port_a.ddr.into(),
            "ddr_b" => self.port_b.ddr.into(),
            "sdr" => self.serial.data().into(),
            "cnt" => self.cnt.into(),
            _ => return None,
        };
        Some(value)
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
