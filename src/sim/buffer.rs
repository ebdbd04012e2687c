//! Two-slot frame buffer
//!
//! Each component owns one `DoubleBuffer`. During a tick it writes only the
//! "next" slot while every reader sees the committed "current" slot. The tick
//! driver flips all buffers once every component has finished writing.

/// Typed frame copy. Implementations list their columns explicitly.
pub trait CopyFrom {
    fn copy_from(&mut self, other: &Self);
}

#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> DoubleBuffer<T> {
    /// Build both slots with the same constructor
    pub fn from_fn(mut make: impl FnMut() -> T) -> Self {
        Self {
            slots: [make(), make()],
            current: 0,
        }
    }

    /// Committed frame
    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    /// Mutable access to the committed frame. Only for setup between ticks.
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.slots[self.current]
    }

    /// In-progress frame, without seeding it from the current one
    pub fn next_mut(&mut self) -> &mut T {
        &mut self.slots[self.current ^ 1]
    }

    /// Split into (current, next) borrows
    pub fn split(&mut self) -> (&T, &mut T) {
        let [a, b] = &mut self.slots;
        if self.current == 0 { (&*a, b) } else { (&*b, a) }
    }

    /// Promote "next" to "current"
    pub fn swap(&mut self) {
        self.current ^= 1;
    }
}

impl<T: CopyFrom> DoubleBuffer<T> {
    /// Seed "next" from "current" and return both for the write phase
    pub fn begin(&mut self) -> (&T, &mut T) {
        let (current, next) = self.split();
        next.copy_from(current);
        (current, next)
    }
}
