//! core::cancel
//!
//! Cooperative cancellation token.
//!
//! The lock guard's wait loop has no upper bound, so a hosting process
//! that wants bounded waits must be able to interrupt it. The token is a
//! shared flag: clone it into whatever context can decide to cancel
//! (a signal handler, a timeout thread) and poll it from the wait loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag.
///
/// All clones observe the same flag. Once set, the flag stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
