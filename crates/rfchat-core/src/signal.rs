//! Disconnect signal shared by the two pumps of a session

use std::sync::atomic::{AtomicBool, Ordering};

/// Edge-triggered, set-once flag that lets either pump end the session.
///
/// Pumps only ever hold a shared reference and can therefore only raise it.
/// Clearing requires `&mut self`, which the borrow checker grants only once
/// both pumps have been joined.
#[derive(Debug, Default)]
pub struct DisconnectSignal {
    raised: AtomicBool,
}

impl DisconnectSignal {
    /// Create a lowered signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns `true` only for the call that performed the transition.
    pub fn raise(&self) -> bool {
        !self.raised.swap(true, Ordering::AcqRel)
    }

    /// Whether the signal has been raised
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the signal between sessions
    pub fn reset(&mut self) {
        *self.raised.get_mut() = false;
    }
}
