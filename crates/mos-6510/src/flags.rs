//! Processor status register (P).

/// Carry.
pub const C: u8 = 0x01;

/// Zero.
pub const Z: u8 = 0x02;

/// IRQ disable.
pub const I: u8 = 0x04;

/// Decimal mode for ADC/SBC (and the ARR/RRA/ISC family).
pub const D: u8 = 0x08;

/// Break. Exists only in a pushed copy of P: set by BRK and PHP, clear when
/// an interrupt pushes. Never held in the live register.
pub const B: u8 = 0x10;

/// Unused bit, always reads as 1.
pub const U: u8 = 0x20;

/// Overflow.
pub const V: u8 = 0x40;

/// Negative.
pub const N: u8 = 0x80;

/// Live processor status. B is always clear and U always set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Status from a byte pulled off the stack or out of a snapshot.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self((value | U) & !B)
    }

    /// The register as observed: U set, B clear.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Byte pushed by BRK and PHP.
    #[must_use]
    pub const fn pushed_by_software(self) -> u8 {
        self.0 | B
    }

    /// Byte pushed by IRQ and NMI.
    #[must_use]
    pub const fn pushed_by_interrupt(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 = (self.0 | flag) & !B;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 = (self.0 & !flag) | U;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// N and Z from a result byte.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// Carry as 0 or 1 for arithmetic.
    #[must_use]
    pub const fn carry(self) -> u8 {
        self.0 & C
    }
}
