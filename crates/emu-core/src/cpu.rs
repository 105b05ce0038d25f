//! Processor core trait.

use crate::Bus;

/// A processor core advanced one bus cycle at a time.
///
/// The bus is borrowed per call, never owned, so the system that owns the
/// processor can also hand it to the chips behind it. Interrupt inputs are
/// pin levels: the owner recomputes them every cycle and the core decides
/// at its own instruction boundaries whether to act on them.
pub trait Cpu {
    /// Register file as returned for inspection.
    type Registers;

    /// Advance by exactly one cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Current program counter.
    fn pc(&self) -> u16;

    /// Copy of the register file.
    fn registers(&self) -> Self::Registers;

    /// True while the core is stopped and only a reset can restart it.
    fn is_halted(&self) -> bool;

    /// Drive the maskable interrupt input (true = asserted).
    fn set_irq(&mut self, level: bool);

    /// Drive the non-maskable interrupt input (true = asserted).
    ///
    /// Only the inactive-to-active transition is significant.
    fn set_nmi(&mut self, level: bool);

    /// Run the reset sequence, fetching the reset vector through `bus`.
    fn reset<B: Bus>(&mut self, bus: &mut B);
}
