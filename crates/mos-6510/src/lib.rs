//! MOS 6510 instruction engine.
//!
//! Each `tick()` is one CPU cycle. An instruction runs all of its bus
//! cycles, dummy reads and dummy writes included, on the cycle its opcode is
//! fetched, then the engine sits out the rest of its documented cycle count.
//! Interrupts are only considered once that budget has drained, which is
//! exactly where the real part samples its interrupt inputs.

mod alu;
mod cpu;
mod execute;
pub mod flags;
mod opcodes;
mod registers;
mod snapshot;
mod state;

pub use cpu::{IRQ_VECTOR, Mos6510, NMI_VECTOR, RESET_VECTOR};
pub use flags::Status;
pub use opcodes::{Mnemonic, Mode, OPCODES, Opcode};
pub use registers::Registers;
pub use snapshot::{CORE_TAG, CpuState, EXTENDED_TAG, EXTENDED_VERSION};
pub use state::{JamPolicy, RunState};
