//! Run state, jam handling and interrupt bookkeeping.
//!
//! Everything that changes whether and how the engine proceeds goes through
//! [`Mos6510::transition`], so halting, freezing and the IRQ suppression
//! window have a single owner.

use log::{debug, trace, warn};

use crate::Mos6510;
use crate::state::RunState::{Halted, Running};

/// What the engine does when it fetches one of the twelve JAM opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JamPolicy {
    /// Stop until the next reset, as the silicon does.
    #[default]
    Halt,
    /// Keep refetching the JAM opcode forever. The engine stays live, so
    /// interrupts are still taken.
    Freeze,
    /// Treat it as a one-byte NOP.
    Ignore,
}

impl JamPolicy {
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Halt => 0,
            Self::Freeze => 1,
            Self::Ignore => 2,
        }
    }

    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Halt),
            1 => Some(Self::Freeze),
            2 => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// Coarse execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    /// Jammed under [`JamPolicy::Halt`]; only reset leaves this state.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Reset,
    /// A JAM opcode was fetched from `at`.
    Jam { at: u16, opcode: u8 },
    /// CLI, PLP or RTI retired: the next boundary ignores IRQ.
    MaskWritten,
    NmiTaken,
    IrqTaken,
}

impl Mos6510 {
    pub(crate) fn transition(&mut self, event: Event) {
        match event {
            Event::Reset => {
                self.run_state = Running;
                self.nmi_latch = false;
                self.irq_suppress_one = false;
                self.last_jam = None;
                debug!("6510 reset, PC=${:04X}", self.regs.pc);
            }
            Event::Jam { at, opcode } => {
                if self.last_jam != Some(at) {
                    warn!(
                        "JAM ${opcode:02X} at ${at:04X}, policy {:?}",
                        self.jam_policy
                    );
                    self.last_jam = Some(at);
                }
                match self.jam_policy {
                    JamPolicy::Halt => self.run_state = Halted,
                    JamPolicy::Freeze => self.regs.pc = at,
                    JamPolicy::Ignore => {}
                }
            }
            Event::MaskWritten => self.irq_suppress_one = true,
            Event::NmiTaken => {
                self.nmi_latch = false;
                trace!("NMI taken at ${:04X}", self.regs.pc);
            }
            Event::IrqTaken => trace!("IRQ taken at ${:04X}", self.regs.pc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_bytes_round_trip_and_reject_unknown() {
        for policy in [JamPolicy::Halt, JamPolicy::Freeze, JamPolicy::Ignore] {
            assert_eq!(JamPolicy::from_byte(policy.to_byte()), Some(policy));
        }
        assert_eq!(JamPolicy::from_byte(3), None);
    }

    #[test]
    fn jam_under_each_policy() {
        let mut cpu = Mos6510::new();
        cpu.regs.pc = 0x1001;
        cpu.transition(Event::Jam { at: 0x1000, opcode: 0x02 });
        assert_eq!(cpu.run_state(), RunState::Halted);

        let mut cpu = Mos6510::new();
        cpu.set_jam_policy(JamPolicy::Freeze);
        cpu.regs.pc = 0x1001;
        cpu.transition(Event::Jam { at: 0x1000, opcode: 0x02 });
        assert_eq!(cpu.run_state(), RunState::Running);
        assert_eq!(cpu.regs.pc, 0x1000);

        let mut cpu = Mos6510::new();
        cpu.set_jam_policy(JamPolicy::Ignore);
        cpu.regs.pc = 0x1001;
        cpu.transition(Event::Jam { at: 0x1000, opcode: 0x02 });
        assert_eq!(cpu.run_state(), RunState::Running);
        assert_eq!(cpu.regs.pc, 0x1001);
    }

    #[test]
    fn reset_clears_halt_and_pending_state() {
        let mut cpu = Mos6510::new();
        cpu.transition(Event::Jam { at: 0, opcode: 0x02 });
        cpu.transition(Event::MaskWritten);
        cpu.trigger_nmi();
        cpu.transition(Event::Reset);
        assert_eq!(cpu.run_state(), RunState::Running);
        assert!(!cpu.nmi_latched());
        assert!(!cpu.irq_suppressed());
    }
}
