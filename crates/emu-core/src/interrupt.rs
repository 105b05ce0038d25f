//! Shared open-collector interrupt lines.
//!
//! Several chips pull the same wire low; the line stays asserted until every
//! one of them lets go. Each source owns one bit in a mask and the line is
//! the OR of the mask, so raising and clearing from different chips commute
//! and no chip can cancel another's request.

use std::fmt;
use std::marker::PhantomData;

/// A chip or signal that can pull an interrupt line.
///
/// `ALL` lists the sources in precedence order. The order only matters for
/// [`InterruptLine::highest_priority`], which is a diagnostic; the processor
/// never sees which source asked.
pub trait InterruptSource: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Bit position of this source in the line mask (0..32).
    fn index(self) -> u32;

    #[must_use]
    fn bit(self) -> u32 {
        1 << self.index()
    }
}

/// One IRQ or NMI wire and the sources currently holding it.
#[derive(Clone, PartialEq, Eq)]
pub struct InterruptLine<S> {
    name: &'static str,
    mask: u32,
    _source: PhantomData<S>,
}

impl<S: InterruptSource> InterruptLine<S> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            mask: 0,
            _source: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn raise(&mut self, source: S) {
        self.mask |= source.bit();
    }

    pub fn clear(&mut self, source: S) {
        self.mask &= !source.bit();
    }

    /// Raise or clear depending on `level`.
    pub fn set(&mut self, source: S, level: bool) {
        if level {
            self.raise(source);
        } else {
            self.clear(source);
        }
    }

    /// Release every source.
    pub fn clear_all(&mut self) {
        self.mask = 0;
    }

    /// True when at least one source holds the line.
    #[must_use]
    pub fn is_asserted(&self) -> bool {
        self.mask != 0
    }

    #[must_use]
    pub fn is_raised(&self, source: S) -> bool {
        self.mask & source.bit() != 0
    }

    /// First raised source in `S::ALL` order.
    #[must_use]
    pub fn highest_priority(&self) -> Option<S> {
        S::ALL.iter().copied().find(|&s| self.is_raised(s))
    }

    /// Raw source mask, bit `n` for the source with index `n`.
    #[must_use]
    pub fn mask(&self) -> u32 {
        self.mask
    }
}

impl<S> fmt::Debug for InterruptLine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptLine")
            .field("name", &self.name)
            .field("mask", &format_args!("{:#b}", self.mask))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Src {
        Video,
        TimerA,
        TimerB,
    }

    impl InterruptSource for Src {
        const ALL: &'static [Self] = &[Src::Video, Src::TimerA, Src::TimerB];

        fn index(self) -> u32 {
            self as u32
        }
    }

    #[test]
    fn line_is_or_of_sources() {
        let mut line = InterruptLine::<Src>::new("irq");
        assert!(!line.is_asserted());
        line.raise(Src::TimerA);
        line.raise(Src::TimerB);
        line.clear(Src::TimerA);
        assert!(line.is_asserted());
        assert!(line.is_raised(Src::TimerB));
        line.clear(Src::TimerB);
        assert!(!line.is_asserted());
    }

    #[test]
    fn clearing_an_idle_source_leaves_others() {
        let mut line = InterruptLine::<Src>::new("irq");
        line.raise(Src::Video);
        line.clear(Src::TimerB);
        assert!(line.is_raised(Src::Video));
    }

    #[test]
    fn priority_follows_declaration_order() {
        let mut line = InterruptLine::<Src>::new("irq");
        assert_eq!(line.highest_priority(), None);
        line.set(Src::TimerB, true);
        line.set(Src::TimerA, true);
        assert_eq!(line.highest_priority(), Some(Src::TimerA));
        line.set(Src::Video, true);
        assert_eq!(line.highest_priority(), Some(Src::Video));
    }
}
