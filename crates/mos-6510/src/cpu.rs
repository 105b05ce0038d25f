//! The 6510 engine: cycle budget, interrupt polling and pin inputs.

use emu_core::{Bus, Cpu, Observable, Value, VideoStandard};

use crate::flags::{C, D, I, N, V, Z};
use crate::state::Event;
use crate::{JamPolicy, Registers, RunState};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken by reset, IRQ and NMI entry.
const INTERRUPT_CYCLES: i32 = 7;

/// The MOS 6510 processor core.
///
/// The I/O port at `$00/$01` is part of the memory map and lives in the
/// system's bus, not here.
#[derive(Debug, Clone)]
pub struct Mos6510 {
    pub regs: Registers,

    pub(crate) run_state: RunState,
    pub(crate) jam_policy: JamPolicy,
    /// Address of the last JAM reported, so a frozen engine warns once.
    pub(crate) last_jam: Option<u16>,

    /// Cycles still owed by the instruction in flight.
    pub(crate) budget: i32,
    pub(crate) total_cycles: u64,
    pub(crate) video: VideoStandard,

    /// Set on an inactive-to-active NMI edge, cleared when serviced.
    pub(crate) nmi_latch: bool,
    /// IRQ is ignored at the next boundary (after CLI, PLP, RTI).
    pub(crate) irq_suppress_one: bool,
    pub(crate) irq_level: bool,
    pub(crate) nmi_level: bool,
    pub(crate) rdy_held: bool,
}

impl Default for Mos6510 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6510 {
    /// A PAL engine that halts on JAM. Call `reset()` before running.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VideoStandard::Pal, JamPolicy::Halt)
    }

    #[must_use]
    pub fn with_config(video: VideoStandard, jam_policy: JamPolicy) -> Self {
        Self {
            regs: Registers::new(),
            run_state: RunState::Running,
            jam_policy,
            last_jam: None,
            budget: 0,
            total_cycles: 0,
            video,
            nmi_latch: false,
            irq_suppress_one: false,
            irq_level: false,
            nmi_level: false,
            rdy_held: false,
        }
    }

    fn step<B: Bus>(&mut self, bus: &mut B) {
        self.total_cycles += 1;

        if self.budget > 0 {
            self.budget -= 1;
            return;
        }
        if self.run_state == RunState::Halted {
            return;
        }
        if let Some(vector) = self.poll_interrupts() {
            self.enter_interrupt(bus, vector);
            return;
        }
        if self.rdy_held {
            return;
        }

        let at = self.regs.pc;
        let opcode = self.fetch_byte(bus);
        let extra = self.execute(bus, at, opcode);
        self.budget = i32::from(crate::OPCODES[opcode as usize].cycles) + extra - 1;
    }

    /// Vector to take at this boundary, if any. Consumes the IRQ
    /// suppression window when NMI is not taken and an opcode will be
    /// fetched; a RDY hold keeps it for the next instruction.
    fn poll_interrupts(&mut self) -> Option<u16> {
        if self.nmi_latch {
            self.transition(Event::NmiTaken);
            return Some(NMI_VECTOR);
        }
        let suppressed = if self.rdy_held {
            self.irq_suppress_one
        } else {
            std::mem::take(&mut self.irq_suppress_one)
        };
        if self.irq_level && !self.regs.p.is_set(I) && !suppressed {
            self.transition(Event::IrqTaken);
            return Some(IRQ_VECTOR);
        }
        None
    }

    /// Hardware interrupt entry: two dummy fetches, push PC and P (B clear),
    /// set I, load the vector.
    fn enter_interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        bus.read(self.regs.pc);
        bus.read(self.regs.pc);
        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
        self.push(bus, self.regs.p.pushed_by_interrupt());
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, vector);
        self.budget = INTERRUPT_CYCLES - 1;
    }

    // ------------------------------------------------------------------
    // Pins and configuration
    // ------------------------------------------------------------------

    /// Latch an NMI as if the line had just gone active.
    pub fn trigger_nmi(&mut self) {
        self.nmi_latch = true;
    }

    /// Drive the RDY hold input. While `held`, no opcode is fetched; an
    /// instruction already in flight still finishes its cycles.
    pub fn set_rdy(&mut self, held: bool) {
        self.rdy_held = held;
    }

    pub fn set_jam_policy(&mut self, policy: JamPolicy) {
        self.jam_policy = policy;
    }

    #[must_use]
    pub fn jam_policy(&self) -> JamPolicy {
        self.jam_policy
    }

    pub fn set_video_standard(&mut self, video: VideoStandard) {
        self.video = video;
    }

    #[must_use]
    pub fn video_standard(&self) -> VideoStandard {
        self.video
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Cycles since power-on. Reset does not clear it.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Position within the current video frame.
    #[must_use]
    pub fn frame_cycle(&self) -> u64 {
        self.total_cycles % self.video.cycles_per_frame()
    }

    /// True when the next tick starts a new instruction or interrupt.
    #[must_use]
    pub fn is_at_boundary(&self) -> bool {
        self.budget == 0
    }

    #[must_use]
    pub fn nmi_latched(&self) -> bool {
        self.nmi_latch
    }

    #[must_use]
    pub fn irq_suppressed(&self) -> bool {
        self.irq_suppress_one
    }
}

impl Cpu for Mos6510 {
    type Registers = Registers;

    fn tick<B: Bus>(&mut self, bus: &mut B) {
        self.step(bus);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.run_state == RunState::Halted
    }

    fn set_irq(&mut self, level: bool) {
        self.irq_level = level;
    }

    fn set_nmi(&mut self, level: bool) {
        if level && !self.nmi_level {
            self.nmi_latch = true;
        }
        self.nmi_level = level;
    }

    /// SP=$FD, P=I|U, PC from `$FFFC`. A, X and Y keep their values and
    /// the next fetch happens after the seven reset cycles.
    fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs.s = 0xFD;
        self.regs.p = crate::Status::from_byte(I);
        self.regs.pc = self.read_word(bus, RESET_VECTOR);
        self.budget = INTERRUPT_CYCLES;
        self.transition(Event::Reset);
    }
}

impl Observable for Mos6510 {
    fn query(&self, path: &str) -> Option<Value> {
        let p = self.regs.p;
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "sp" => Some(self.regs.s.into()),
            "p" => Some(p.bits().into()),
            "flags.c" => Some(p.is_set(C).into()),
            "flags.z" => Some(p.is_set(Z).into()),
            "flags.i" => Some(p.is_set(I).into()),
            "flags.d" => Some(p.is_set(D).into()),
            "flags.v" => Some(p.is_set(V).into()),
            "flags.n" => Some(p.is_set(N).into()),
            "cycles" => Some(self.total_cycles.into()),
            "frame_cycle" => Some(self.frame_cycle().into()),
            "budget" => Some(Value::U32(self.budget.max(0) as u32)),
            "halted" => Some(self.is_halted().into()),
            "nmi_latched" => Some(self.nmi_latch.into()),
            "irq" => Some(self.irq_level.into()),
            "rdy_held" => Some(self.rdy_held.into()),
            "jam_policy" => Some(format!("{:?}", self.jam_policy).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "sp",
            "p",
            "flags.c",
            "flags.z",
            "flags.i",
            "flags.d",
            "flags.v",
            "flags.n",
            "cycles",
            "frame_cycle",
            "budget",
            "halted",
            "nmi_latched",
            "irq",
            "rdy_held",
            "jam_policy",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn booted(program: &[u8]) -> (Mos6510, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.set_vector(RESET_VECTOR, 0x0200);
        bus.load(0x0200, program);
        let mut cpu = Mos6510::new();
        cpu.reset(&mut bus);
        (cpu, bus)
    }

    #[test]
    fn reset_loads_vector_and_waits_seven_cycles() {
        let (mut cpu, mut bus) = booted(&[0xA9, 0x42]);
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.regs.s, 0xFD);
        assert_eq!(cpu.regs.p.bits(), 0x24);
        for _ in 0..7 {
            cpu.tick(&mut bus);
        }
        assert_eq!(cpu.regs.pc, 0x0200);
        cpu.tick(&mut bus);
        assert_eq!(cpu.regs.a, 0x42);
    }

    #[test]
    fn budget_holds_off_the_next_fetch() {
        let (mut cpu, mut bus) = booted(&[0xEA, 0xA9, 0x01]);
        cpu.budget = 0;
        cpu.tick(&mut bus);
        assert_eq!(cpu.regs.pc, 0x0201);
        assert!(!cpu.is_at_boundary());
        cpu.tick(&mut bus);
        assert!(cpu.is_at_boundary());
        cpu.tick(&mut bus);
        assert_eq!(cpu.regs.a, 0x01);
    }

    #[test]
    fn rdy_blocks_fetch_but_cycles_still_count() {
        let (mut cpu, mut bus) = booted(&[0xA9, 0x42]);
        cpu.budget = 0;
        cpu.set_rdy(true);
        for _ in 0..10 {
            cpu.tick(&mut bus);
        }
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.total_cycles(), 10);
        cpu.set_rdy(false);
        cpu.tick(&mut bus);
        assert_eq!(cpu.regs.a, 0x42);
    }

    #[test]
    fn nmi_latches_on_rising_edge_only() {
        let mut cpu = Mos6510::new();
        cpu.set_nmi(true);
        assert!(cpu.nmi_latched());
        cpu.nmi_latch = false;
        cpu.set_nmi(true);
        assert!(!cpu.nmi_latched());
        cpu.set_nmi(false);
        cpu.set_nmi(true);
        assert!(cpu.nmi_latched());
    }

    #[test]
    fn frame_cycle_wraps_with_video_standard() {
        let mut cpu = Mos6510::with_config(VideoStandard::Ntsc, JamPolicy::Halt);
        cpu.total_cycles = 17_095 + 5;
        assert_eq!(cpu.frame_cycle(), 5);
        cpu.set_video_standard(VideoStandard::Pal);
        assert_eq!(cpu.frame_cycle(), 17_100);
    }

    #[test]
    fn query_paths_all_resolve() {
        let cpu = Mos6510::new();
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
        assert_eq!(cpu.query("sp"), Some(Value::U8(0xFD)));
        assert_eq!(cpu.query("nope"), None);
    }
}
