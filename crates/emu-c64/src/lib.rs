//! Commodore 64 processor and interrupt core.
//!
//! The system ticks at CPU cycle rate (985,248 Hz PAL, 1,022,727 Hz NTSC).
//! Each cycle the 6510 runs first, then both CIAs consume the same cycle,
//! then the IRQ and NMI lines are recomputed for the CPU's next boundary.
//! CIA1 drives IRQ and CIA2 drives NMI; the video chip, RESTORE key and
//! expansion port are raised and cleared by the embedder.

mod bus;
mod c64;
pub mod config;

pub use bus::C64Bus;
pub use c64::{C64, Signal};
pub use config::C64Config;
