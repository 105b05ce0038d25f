//! Interrupt control register ($xD).

use bitflags::bitflags;

bitflags! {
    /// The five interrupt sources, as laid out in the ICR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Interrupts: u8 {
        const TIMER_A = 0x01;
        const TIMER_B = 0x02;
        const ALARM = 0x04;
        const SERIAL = 0x08;
        const FLAG = 0x10;
    }
}

/// Bit 7 of an ICR read: some pending source is enabled.
pub const IR: u8 = 0x80;

/// Bit 7 of an ICR write: set (1) or clear (0) the written mask bits.
pub const SET_CLEAR: u8 = 0x80;

/// Pending sources and the enable mask.
///
/// Pending bits latch regardless of the mask; the mask only decides whether
/// they reach the interrupt output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptControl {
    pending: Interrupts,
    mask: Interrupts,
}

impl InterruptControl {
    pub fn latch(&mut self, sources: Interrupts) {
        self.pending.insert(sources);
    }

    pub fn acknowledge(&mut self, sources: Interrupts) {
        self.pending.remove(sources);
    }

    /// `$xD` write: bit 7 set ORs bits 0-4 into the mask, clear ANDs them out.
    pub fn write_mask(&mut self, value: u8) {
        let bits = Interrupts::from_bits_truncate(value);
        if value & SET_CLEAR != 0 {
            self.mask.insert(bits);
        } else {
            self.mask.remove(bits);
        }
    }

    /// `$xD` read: pending bits plus IR, then clears exactly what it reported.
    pub fn read_and_clear(&mut self) -> u8 {
        let value = self.peek();
        self.pending.remove(Interrupts::from_bits_truncate(value));
        value
    }

    /// The value a read would return, without clearing.
    #[must_use]
    pub fn peek(&self) -> u8 {
        self.pending.bits() | if self.asserted() { IR } else { 0 }
    }

    /// Interrupt output: any pending source that is enabled.
    #[must_use]
    pub fn asserted(&self) -> bool {
        self.pending.intersects(self.mask)
    }

    #[must_use]
    pub fn pending(&self) -> Interrupts {
        self.pending
    }

    #[must_use]
    pub fn mask(&self) -> Interrupts {
        self.mask
    }

    pub(crate) fn from_raw(pending: u8, mask: u8) -> Self {
        Self {
            pending: Interrupts::from_bits_truncate(pending),
            mask: Interrupts::from_bits_truncate(mask),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn set_then_clear_leaves_bit_as_before() {
        let mut icr = InterruptControl::default();
        icr.write_mask(0x81);
        icr.write_mask(0x01);
        assert_eq!(icr.mask(), Interrupts::empty());

        icr.write_mask(0x83);
        icr.write_mask(0x01);
        assert_eq!(icr.mask(), Interrupts::TIMER_B);
    }

    #[test]
    fn read_reports_ir_only_when_enabled() {
        let mut icr = InterruptControl::default();
        icr.latch(Interrupts::TIMER_A);
        assert!(!icr.asserted());
        assert_eq!(icr.read_and_clear(), 0x01);
        assert_eq!(icr.read_and_clear(), 0x00);

        icr.write_mask(SET_CLEAR | 0x01);
        icr.latch(Interrupts::TIMER_A | Interrupts::FLAG);
        assert!(icr.asserted());
        assert_eq!(icr.read_and_clear(), 0x91);
        assert!(!icr.asserted());
    }

    proptest! {
        #[test]
        fn mask_write_only_touches_named_bits(start in 0u8..0x20, value in any::<u8>()) {
            let mut icr = InterruptControl::from_raw(0, start);
            icr.write_mask(value);
            let named = value & 0x1F;
            let expected = if value & 0x80 != 0 { start | named } else { start & !named };
            prop_assert_eq!(icr.mask().bits(), expected);
        }

        #[test]
        fn repeated_writes_are_idempotent(start in 0u8..0x20, value in any::<u8>()) {
            let mut once = InterruptControl::from_raw(0, start);
            once.write_mask(value);
            let mut twice = once;
            twice.write_mask(value);
            prop_assert_eq!(once, twice);
        }
    }
}
