//! pull::cancel
//!
//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clone-shared, cooperative cancellation token.
///
/// Setting the token requests cancellation; it does not interrupt
/// anything by itself. A running pull checks the token at
/// engine-defined intervals, so observation is prompt but not
/// instantaneous. There is no built-in timeout; compose a deadline by
/// cancelling the token from a timer the caller owns.
///
/// Clones share one flag: cancelling any clone cancels them all.
///
/// # Example
///
/// ```
/// use cairn::pull::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
///
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; cannot be undone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
