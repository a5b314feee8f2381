//! Cancellation signal shared by discovery, loading, and dispatch.
//!
//! # Invariants
//! - `Interrupted` is never converted into a warning by core code.
//! - A tripped `CancelToken` stays tripped until `reset` is called.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Deliberate cancellation of the running extension operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interrupted;

impl Display for Interrupted {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "extension operation interrupted")
    }
}

impl Error for Interrupted {}

/// Host-owned cancellation flag.
///
/// Clones share one flag, so a signal handler on another thread can trip the
/// token observed by the scan thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(Interrupted)` once the token has been cancelled.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, Interrupted};

    #[test]
    fn clones_observe_the_same_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(observer.check().is_ok());

        token.cancel();
        assert_eq!(observer.check(), Err(Interrupted));

        observer.reset();
        assert!(!token.is_cancelled());
    }
}
