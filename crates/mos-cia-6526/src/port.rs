//! Parallel data ports A and B.

/// One 8-bit port with its data direction register.
///
/// DDR bit 1 drives the pin from the output register; bit 0 leaves it an
/// input, pulled high unless something outside pulls it low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub output: u8,
    pub ddr: u8,
    /// Levels driven onto the pins from outside.
    pub input: u8,
}

impl Default for Port {
    fn default() -> Self {
        Self {
            output: 0,
            ddr: 0,
            input: 0xFF,
        }
    }
}

impl Port {
    /// Pin levels as seen by a register read.
    #[must_use]
    pub fn read(&self) -> u8 {
        (self.output & self.ddr) | (self.input & !self.ddr)
    }

    /// Back to power-on registers; external input is not the chip's state.
    pub fn reset(&mut self) {
        self.output = 0;
        self.ddr = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddr_selects_output_or_input_per_bit() {
        let mut port = Port::default();
        assert_eq!(port.read(), 0xFF);
        port.output = 0x00;
        port.ddr = 0x0F;
        port.input = 0xA5;
        assert_eq!(port.read(), 0xA0);
    }
}
