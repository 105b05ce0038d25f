//! Serial shift register ($xC).

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerialPort {
    /// Serial data register as seen by the CPU.
    pub(crate) data: u8,
    pub(crate) shift: u8,
    /// Bits shifted so far in the current byte.
    pub(crate) bits: u8,
    /// Output mode: Timer A underflow parity within the current bit.
    pub(crate) half: bool,
    /// Output mode: a byte is being shifted out.
    pub(crate) shifting: bool,
    /// Output mode: a byte was written while another was shifting.
    pub(crate) pending: bool,
    pub(crate) output: bool,
    /// Level of the SP pin as driven externally.
    pub(crate) sp_in: bool,
}

impl SerialPort {
    pub(crate) fn reset(&mut self) {
        *self = Self {
            sp_in: self.sp_in,
            ..Self::default()
        };
    }

    #[must_use]
    pub fn data(&self) -> u8 {
        self.data
    }

    #[must_use]
    pub fn is_output(&self) -> bool {
        self.output
    }

    /// Level currently driven on SP in output mode.
    #[must_use]
    pub fn sp_out(&self) -> bool {
        self.output && self.shift & 0x80 != 0
    }

    /// Switch direction. Any byte in progress is abandoned.
    pub(crate) fn set_output(&mut self, output: bool) {
        if output != self.output {
            self.output = output;
            self.bits = 0;
            self.half = false;
            self.shifting = false;
            self.pending = false;
        }
    }

    pub(crate) fn write_data(&mut self, value: u8) {
        self.data = value;
        if !self.output {
            return;
        }
        if self.shifting {
            self.pending = true;
        } else {
            self.start(value);
        }
    }

    fn start(&mut self, value: u8) {
        self.shift = value;
        self.bits = 0;
        self.half = false;
        self.shifting = true;
    }

    /// Timer A underflow in output mode. Returns true when a full byte has
    /// gone out.
    pub(crate) fn timer_underflow(&mut self) -> bool {
        if !self.output || !self.shifting {
            return false;
        }
        self.half = !self.half;
        if self.half {
            return false;
        }
        self.shift <<= 1;
        self.bits += 1;
        if self.bits < 8 {
            return false;
        }
        if self.pending {
            self.pending = false;
            self.start(self.data);
        } else {
            self.shifting = false;
            self.bits = 0;
        }
        true
    }

    /// Rising CNT edge in input mode. Returns true when a full byte has
    /// arrived.
    pub(crate) fn cnt_rising(&mut self) -> bool {
        if self.output {
            return false;
        }
        self.shift = (self.shift << 1) | u8::from(self.sp_in);
        self.bits += 1;
        if self.bits < 8 {
            return false;
        }
        self.bits = 0;
        self.data = self.shift;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_byte_takes_sixteen_underflows() {
        let mut sp = SerialPort::default();
        sp.set_output(true);
        sp.write_data(0xA5);
        let done: Vec<bool> = (0..16).map(|_| sp.timer_underflow()).collect();
        assert_eq!(done.iter().filter(|&&d| d).count(), 1);
        assert!(done[15]);
        assert!(!sp.timer_underflow());
    }

    #[test]
    fn pending_byte_follows_immediately() {
        let mut sp = SerialPort::default();
        sp.set_output(true);
        sp.write_data(0x01);
        sp.write_data(0x02);
        for _ in 0..15 {
            sp.timer_underflow();
        }
        assert!(sp.timer_underflow());
        assert_eq!(sp.shift, 0x02);
        assert!((0..16).filter(|_| sp.timer_underflow()).count() == 1);
    }

    #[test]
    fn input_assembles_msb_first() {
        let mut sp = SerialPort::default();
        let mut done = false;
        for bit in [1, 0, 1, 0, 0, 1, 0, 1] {
            sp.sp_in = bit == 1;
            done = sp.cnt_rising();
        }
        assert!(done);
        assert_eq!(sp.data(), 0xA5);
    }

    #[test]
    fn input_ignored_in_output_mode() {
        let mut sp = SerialPort::default();
        sp.set_output(true);
        assert!(!sp.cnt_rising());
    }
}
