//! Cooperative cancellation (§5): a single boolean behind a mutex, polled by
//! the turn loop at three documented points. Not a propagating cancellation
//! token — in-flight tool I/O is never force-aborted, only the next poll
//! point notices the request (see DESIGN.md for why this was chosen over a
//! `tokio_util::CancellationToken`).

use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InterruptFlag(Arc<Mutex<bool>>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(false)))
    }

    /// Request an interrupt. Callable from any thread.
    pub fn request(&self) {
        *self.0.lock().unwrap() = true;
    }

    pub fn is_set(&self) -> bool {
        *self.0.lock().unwrap()
    }

    /// Clear the flag for the next turn.
    pub fn clear(&self) {
        *self.0.lock().unwrap() = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_sets_and_clear_resets() {
        let flag = InterruptFlag::new();
        assert!(!flag.is_set());
        flag.request();
        assert!(flag.is_set());
        flag.clear();
        assert!(!flag.is_set());
    }

    #[test]
    fn clones_share_the_same_underlying_state() {
        let flag = InterruptFlag::new();
        let clone = flag.clone();
        clone.request();
        assert!(flag.is_set());
    }
}
