//! Top-level C64 system.

use emu_core::snapshot::Tag;
use emu_core::{
    Cpu, InterruptLine, InterruptSource, Observable, SnapshotError, SnapshotReader, SnapshotWriter,
    Value,
};
use log::{debug, warn};
use mos_6510::{CpuState, Mos6510};
use mos_cia_6526::Cia6526;

use crate::bus::C64Bus;
use crate::config::C64Config;

/// Everything that can pull the IRQ or NMI line.
///
/// Declaration order is the precedence reported by
/// [`InterruptLine::highest_priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// VIC-II raster, sprite collision and light pen (IRQ).
    Vic,
    /// CIA1 interrupt output (IRQ).
    Cia1,
    /// CIA2 interrupt output (NMI).
    Cia2,
    /// RESTORE key (NMI).
    Restore,
    /// Cartridge IRQ or NMI pin.
    Expansion,
}

impl InterruptSource for Signal {
    const ALL: &'static [Self] = &[
        Signal::Vic,
        Signal::Cia1,
        Signal::Cia2,
        Signal::Restore,
        Signal::Expansion,
    ];

    fn index(self) -> u32 {
        self as u32
    }
}

const LINES_TAG: Tag = *b"LINE";
const RAM_TAG: Tag = *b"RAM0";
const SNAPSHOT_VERSION: u8 = 1;

/// The C64 system.
///
/// Owns the CPU, the bus (RAM and both CIAs) and the two interrupt lines.
#[derive(Debug, Clone)]
pub struct C64 {
    config: C64Config,
    cpu: Mos6510,
    bus: C64Bus,
    irq: InterruptLine<Signal>,
    nmi: InterruptLine<Signal>,
}

impl C64 {
    /// A powered-on machine with empty RAM. Load a program and its vectors,
    /// then call [`C64::reset`].
    #[must_use]
    pub fn new(config: &C64Config) -> Self {
        debug!(
            "C64: {:?}, JAM policy {:?}",
            config.video, config.jam_policy
        );
        let bus = C64Bus::new(
            Cia6526::new("CIA1", config.video),
            Cia6526::new("CIA2", config.video),
        );
        Self {
            config: *config,
            cpu: Mos6510::with_config(config.video, config.jam_policy),
            bus,
            irq: InterruptLine::new("IRQ"),
            nmi: InterruptLine::new("NMI"),
        }
    }

    #[must_use]
    pub fn config(&self) -> &C64Config {
        &self.config
    }

    /// Reset line: CPU and both CIAs. External interrupt sources let go.
    pub fn reset(&mut self) {
        self.bus.cia1.reset();
        self.bus.cia2.reset();
        self.irq.clear_all();
        self.nmi.clear_all();
        self.cpu.set_irq(false);
        self.cpu.set_nmi(false);
        self.cpu.reset(&mut self.bus);
    }

    /// Run one CPU cycle.
    pub fn tick(&mut self) {
        self.cpu.tick(&mut self.bus);

        self.bus.cia1.advance(1);
        self.bus.cia2.advance(1);

        self.irq.set(Signal::Cia1, self.bus.cia1.irq_asserted());
        self.nmi.set(Signal::Cia2, self.bus.cia2.irq_asserted());
        self.cpu.set_irq(self.irq.is_asserted());
        self.cpu.set_nmi(self.nmi.is_asserted());
    }

    /// Run `cycles` CPU cycles.
    pub fn run_cycles(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    /// Run one video frame's worth of cycles. Returns the count.
    pub fn run_frame(&mut self) -> u64 {
        let cycles = self.config.video.cycles_per_frame();
        self.run_cycles(cycles);
        cycles
    }

    /// Run until the CPU is between instructions again, always ticking at
    /// least once. Returns the cycles taken.
    pub fn step_instruction(&mut self) -> u64 {
        let start = self.cpu.total_cycles();
        self.tick();
        while !self.cpu.is_at_boundary() {
            self.tick();
        }
        self.cpu.total_cycles() - start
    }

    /// Assert an interrupt source the system does not emulate itself.
    pub fn raise_irq(&mut self, source: Signal) {
        self.irq.raise(source);
        self.cpu.set_irq(true);
    }

    pub fn clear_irq(&mut self, source: Signal) {
        self.irq.clear(source);
        self.cpu.set_irq(self.irq.is_asserted());
    }

    pub fn raise_nmi(&mut self, source: Signal) {
        self.nmi.raise(source);
        self.cpu.set_nmi(true);
    }

    pub fn clear_nmi(&mut self, source: Signal) {
        self.nmi.clear(source);
        self.cpu.set_nmi(self.nmi.is_asserted());
    }

    #[must_use]
    pub fn irq_line(&self) -> &InterruptLine<Signal> {
        &self.irq
    }

    #[must_use]
    pub fn nmi_line(&self) -> &InterruptLine<Signal> {
        &self.nmi
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6510 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6510 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &C64Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut C64Bus {
        &mut self.bus
    }

    /// Save CPU, lines, both CIAs and RAM.
    ///
    /// # Panics
    ///
    /// Panics if the CPU is mid-instruction.
    pub fn save_state(&self, out: &mut SnapshotWriter) {
        self.cpu.save_state(out);
        out.chunk(LINES_TAG, SNAPSHOT_VERSION, |c| {
            c.put_u32(self.irq.mask());
            c.put_u32(self.nmi.mask());
        });
        self.bus.cia1.save_state(out);
        self.bus.cia2.save_state(out);
        out.chunk(RAM_TAG, SNAPSHOT_VERSION, |c| {
            c.put_u8(self.bus.last_data());
            c.put_bytes(self.bus.ram_bytes());
        });
    }

    /// Load a whole-system snapshot. Every chunk is decoded before anything
    /// is applied, so on error the machine is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the CPU is mid-instruction.
    pub fn try_load_state(&mut self, input: &mut SnapshotReader<'_>) -> Result<(), SnapshotError> {
        let cpu = CpuState::read(input)?;

        let mut lines = input.read_chunk(LINES_TAG, SNAPSHOT_VERSION)?;
        let irq_mask = lines.get_u32()?;
        let nmi_mask = lines.get_u32()?;
        let mut irq = InterruptLine::<Signal>::new("IRQ");
        let mut nmi = InterruptLine::<Signal>::new("NMI");
        for &source in Signal::ALL {
            irq.set(source, irq_mask & source.bit() != 0);
            nmi.set(source, nmi_mask & source.bit() != 0);
        }
        if irq.mask() != irq_mask {
            return Err(lines.invalid("irq sources", u64::from(irq_mask)));
        }
        if nmi.mask() != nmi_mask {
            return Err(lines.invalid("nmi sources", u64::from(nmi_mask)));
        }

        let mut cia1 = self.bus.cia1.clone();
        cia1.try_load_state(input)?;
        let mut cia2 = self.bus.cia2.clone();
        cia2.try_load_state(input)?;

        let mut ram = input.read_chunk(RAM_TAG, SNAPSHOT_VERSION)?;
        let last_data = ram.get_u8()?;
        let memory = ram.get_bytes::<0x10000>()?;

        self.cpu.restore(&cpu);
        self.config.video = cpu.video;
        self.config.jam_policy = cpu.jam_policy;
        self.irq = irq;
        self.nmi = nmi;
        self.bus.cia1 = cia1;
        self.bus.cia2 = cia2;
        self.bus.restore_ram(&memory, last_data);
        Ok(())
    }

    /// Returns false, leaving the machine as it was, if the data is
    /// malformed.
    pub fn load_state(&mut self, input: &mut SnapshotReader<'_>) -> bool {
        match self.try_load_state(input) {
            Ok(()) => true,
            Err(e) => {
                warn!("C64 state not loaded: {e}");
                false
            }
        }
    }
}

const QUERY_PATHS: &[&str] = &[
    "cpu.<path>",
    "cia1.<path>",
    "cia2.<path>",
    "irq",
    "irq.source",
    "nmi",
    "nmi.source",
    "memory.<address>",
];

impl Observable for C64 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia1.") {
            self.bus.cia1.query(rest)
        } else if let Some(rest) = path.strip_prefix("cia2.") {
            self.bus.cia2.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix('$'))
            {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.bus.ram(a)))
        } else {
            match path {
                "irq" => Some(self.irq.is_asserted().into()),
                "nmi" => Some(self.nmi.is_asserted().into()),
                "irq.source" => Some(source_name(self.irq.highest_priority()).into()),
                "nmi.source" => Some(source_name(self.nmi.highest_priority()).into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}

fn source_name(source: Option<Signal>) -> &'static str {
    match source {
        None => "none",
        Some(Signal::Vic) => "vic",
        Some(Signal::Cia1) => "cia1",
        Some(Signal::Cia2) => "cia2",
        Some(Signal::Restore) => "restore",
        Some(Signal::Expansion) => "expansion",
    }
}
