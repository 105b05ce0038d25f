//! The byte-wide bus port every processor cycle goes through.

/// Byte-wide memory and I/O port.
///
/// Both operations may have side effects: reading a chip register can clear
/// its interrupt flags, so dummy reads issued by the CPU must go through here
/// as well. Addresses nothing answers return the open-bus value, never an
/// error.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64 KiB RAM with no side effects.
///
/// Used to drive processors in isolation: tests, single-step vectors and
/// small tools that need nothing but memory.
pub struct SimpleBus {
    ram: Box<[u8; 0x1_0000]>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read without going through the `Bus` trait.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    /// Store a little-endian vector (reset, NMI or IRQ) at `address`.
    pub fn set_vector(&mut self, address: u16, target: u16) {
        let [lo, hi] = target.to_le_bytes();
        self.ram[address as usize] = lo;
        self.ram[address.wrapping_add(1) as usize] = hi;
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}
