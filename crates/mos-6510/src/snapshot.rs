//! Save and restore of the engine.
//!
//! Two chunks: the register file (`CPUR`) and everything else the engine
//! needs to resume mid-stream (`CPUX`). Version 1 of `CPUX` predates the
//! trailing IRQ/NMI pin levels; such chunks still load with both pins
//! released.

use emu_core::snapshot::{ChunkReader, Tag};
use emu_core::{SnapshotError, SnapshotReader, SnapshotWriter, VideoStandard};
use log::warn;

use crate::{JamPolicy, Mos6510, Registers, RunState, Status};

pub const CORE_TAG: Tag = *b"CPUR";
const CORE_VERSION: u8 = 1;

pub const EXTENDED_TAG: Tag = *b"CPUX";
pub const EXTENDED_VERSION: u8 = 2;

/// Everything needed to resume the engine at an instruction boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    pub regs: Registers,
    pub jam_policy: JamPolicy,
    pub halted: bool,
    pub nmi_latch: bool,
    pub irq_suppress_one: bool,
    pub budget: i32,
    pub total_cycles: u64,
    pub video: VideoStandard,
    pub irq_level: bool,
    pub nmi_level: bool,
}

impl CpuState {
    pub fn write(&self, out: &mut SnapshotWriter) {
        out.chunk(CORE_TAG, CORE_VERSION, |c| {
            c.put_u16(self.regs.pc);
            c.put_u8(self.regs.a);
            c.put_u8(self.regs.x);
            c.put_u8(self.regs.y);
            c.put_u8(self.regs.s);
            c.put_u8(self.regs.p.bits());
        });
        out.chunk(EXTENDED_TAG, EXTENDED_VERSION, |c| {
            c.put_u8(self.jam_policy.to_byte());
            c.put_bool(self.halted);
            c.put_bool(self.nmi_latch);
            c.put_bool(self.irq_suppress_one);
            c.put_i32(self.budget);
            c.put_u64(self.total_cycles);
            c.put_u8(self.video.to_byte());
            c.put_bool(self.irq_level);
            c.put_bool(self.nmi_level);
        });
    }

    /// Decode both chunks. Nothing is applied anywhere; a failure leaves the
    /// caller's engine untouched.
    pub fn read(input: &mut SnapshotReader<'_>) -> Result<Self, SnapshotError> {
        let mut core = input.read_chunk(CORE_TAG, CORE_VERSION)?;
        let regs = Registers {
            pc: core.get_u16()?,
            a: core.get_u8()?,
            x: core.get_u8()?,
            y: core.get_u8()?,
            s: core.get_u8()?,
            p: Status::from_byte(core.get_u8()?),
        };

        let mut ext = input.read_chunk(EXTENDED_TAG, EXTENDED_VERSION)?;
        let policy = ext.get_u8()?;
        let jam_policy =
            JamPolicy::from_byte(policy).ok_or_else(|| ext.invalid("jam policy", u64::from(policy)))?;
        let halted = ext.get_bool("halted")?;
        let nmi_latch = ext.get_bool("nmi latch")?;
        let irq_suppress_one = ext.get_bool("irq suppression")?;
        let budget = ext.get_i32()?;
        if budget < 0 {
            return Err(ext.invalid("cycle budget", u64::from(budget.unsigned_abs())));
        }
        let total_cycles = ext.get_u64()?;
        let video_byte = ext.get_u8()?;
        let video = VideoStandard::from_byte(video_byte)
            .ok_or_else(|| ext.invalid("video standard", u64::from(video_byte)))?;
        let (irq_level, nmi_level) = read_pin_levels(&mut ext)?;

        Ok(Self {
            regs,
            jam_policy,
            halted,
            nmi_latch,
            irq_suppress_one,
            budget,
            total_cycles,
            video,
            irq_level,
            nmi_level,
        })
    }
}

fn read_pin_levels(ext: &mut ChunkReader<'_>) -> Result<(bool, bool), SnapshotError> {
    if ext.version() < 2 || ext.is_empty() {
        return Ok((false, false));
    }
    Ok((ext.get_bool("irq level")?, ext.get_bool("nmi level")?))
}

impl Mos6510 {
    /// Whole-engine snapshot.
    ///
    /// # Panics
    ///
    /// Panics if called while an instruction is still in flight.
    #[must_use]
    pub fn state(&self) -> CpuState {
        assert!(
            self.is_at_boundary(),
            "6510 state taken mid-instruction ({} cycles owed)",
            self.budget
        );
        CpuState {
            regs: self.regs,
            jam_policy: self.jam_policy,
            halted: self.run_state == RunState::Halted,
            nmi_latch: self.nmi_latch,
            irq_suppress_one: self.irq_suppress_one,
            budget: self.budget,
            total_cycles: self.total_cycles,
            video: self.video,
            irq_level: self.irq_level,
            nmi_level: self.nmi_level,
        }
    }

    /// Replace the engine's state.
    ///
    /// # Panics
    ///
    /// Panics if called while an instruction is still in flight.
    pub fn restore(&mut self, state: &CpuState) {
        assert!(
            self.is_at_boundary(),
            "6510 restored mid-instruction ({} cycles owed)",
            self.budget
        );
        self.regs = state.regs;
        self.jam_policy = state.jam_policy;
        self.run_state = if state.halted {
            RunState::Halted
        } else {
            RunState::Running
        };
        self.nmi_latch = state.nmi_latch;
        self.irq_suppress_one = state.irq_suppress_one;
        self.budget = state.budget;
        self.total_cycles = state.total_cycles;
        self.video = state.video;
        self.irq_level = state.irq_level;
        self.nmi_level = state.nmi_level;
        self.last_jam = None;
    }

    pub fn save_state(&self, out: &mut SnapshotWriter) {
        self.state().write(out);
    }

    pub fn try_load_state(&mut self, input: &mut SnapshotReader<'_>) -> Result<(), SnapshotError> {
        let state = CpuState::read(input)?;
        self.restore(&state);
        Ok(())
    }

    /// Returns false, leaving the engine as it was, if the data is malformed.
    pub fn load_state(&mut self, input: &mut SnapshotReader<'_>) -> bool {
        match self.try_load_state(input) {
            Ok(()) => true,
            Err(e) => {
                warn!("6510 state not loaded: {e}");
                false
            }
        }
    }
}
