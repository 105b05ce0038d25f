//! Components driven by elapsed cycles.

use crate::Ticks;

/// A component that consumes elapsed time but never touches the bus.
///
/// Peripheral chips implement this; the processor does not, because it
/// needs the bus on every cycle (see [`crate::Cpu`]).
pub trait Tickable {
    /// Consume one cycle.
    fn tick(&mut self);

    /// Consume `count` cycles.
    ///
    /// Overrides must produce the same state as calling `tick()` `count`
    /// times.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
