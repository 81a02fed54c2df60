//! Shared "keep running" switch.

use std::cell::Cell;
use std::rc::Rc;

/// A cloneable handle to one boolean that the frame loop polls between
/// frames.
///
/// Failures discovered deep inside a per-frame hook clear the flag instead of
/// unwinding; the loop stops before the next frame mutates more state.
#[derive(Debug, Clone)]
pub struct RunFlag(Rc<Cell<bool>>);

impl RunFlag {
    /// Create a flag in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    /// Returns `true` until someone calls [`RunFlag::stop`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.get()
    }

    /// Ask the loop to stop after the current frame.
    pub fn stop(&self) {
        self.0.set(false);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}
