//! C64 bus: RAM and CIA routing.
//!
//! Only the CIA blocks are decoded. `$DC00-$DCFF` is CIA1 and `$DD00-$DDFF`
//! is CIA2, each mirroring its 16 registers. `$DE00-$DFFF` belongs to the
//! expansion port; with nothing plugged in, reads return whatever was last
//! on the data bus. Everything else is RAM.

use emu_core::Bus;
use mos_cia_6526::Cia6526;

/// The C64 bus, implementing `emu_core::Bus`.
///
/// Owns the RAM and both CIAs.
#[derive(Debug, Clone)]
pub struct C64Bus {
    ram: Box<[u8; 0x10000]>,
    pub cia1: Cia6526,
    pub cia2: Cia6526,
    /// Last value driven on the data bus, returned for open-bus reads.
    last_data: u8,
}

impl C64Bus {
    #[must_use]
    pub fn new(cia1: Cia6526, cia2: Cia6526) -> Self {
        Self {
            ram: Box::new([0; 0x10000]),
            cia1,
            cia2,
            last_data: 0xFF,
        }
    }

    /// Copy `data` into RAM at `addr`, wrapping at the top of memory.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            self.ram[usize::from(addr.wrapping_add(offset as u16))] = byte;
        }
    }

    #[must_use]
    pub fn ram(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }

    #[must_use]
    pub fn last_data(&self) -> u8 {
        self.last_data
    }

    pub(crate) fn ram_bytes(&self) -> &[u8] {
        &self.ram[..]
    }

    pub(crate) fn restore_ram(&mut self, bytes: &[u8; 0x10000], last_data: u8) {
        self.ram.copy_from_slice(bytes);
        self.last_data = last_data;
    }
}

impl Bus for C64Bus {
    fn read(&mut self, addr: u16) -> u8 {
        let reg = (addr & 0x0F) as u8;
        let data = match addr {
            0xDC00..=0xDCFF => self.cia1.read_register(reg),
            0xDD00..=0xDDFF => self.cia2.read_register(reg),
            0xDE00..=0xDFFF => self.last_data,
            _ => self.ram[usize::from(addr)],
        };
        self.last_data = data;
        data
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_data = value;
        let reg = (addr & 0x0F) as u8;
        match addr {
            0xDC00..=0xDCFF => self.cia1.write_register(reg, value),
            0xDD00..=0xDDFF => self.cia2.write_register(reg, value),
            0xDE00..=0xDFFF => {}
            _ => self.ram[usize::from(addr)] = value,
        }
    }
}
