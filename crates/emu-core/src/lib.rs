//! Core traits and types for cycle-accurate emulation.
//!
//! Everything is counted in CPU cycles. Chips borrow the bus and the
//! interrupt lines from a single owning system; no component holds a
//! reference to another.

mod bus;
mod clock;
mod cpu;
mod interrupt;
mod observable;
pub mod snapshot;
mod tickable;
mod ticks;
mod video;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use interrupt::{InterruptLine, InterruptSource};
pub use observable::{Observable, Value};
pub use snapshot::{ChunkReader, ChunkWriter, SnapshotError, SnapshotReader, SnapshotWriter};
pub use tickable::Tickable;
pub use ticks::Ticks;
pub use video::VideoStandard;
