//! # Store Errors
//!
//! The recovery path tells three store-level conditions apart because each
//! drives different behavior upstream: an absent store is skipped, a locked
//! store is surfaced so the operator can close the owning browser, and an
//! unreadable store triggers the raw fallback scan.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while opening or reading an extension store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds the store's lock
    #[error("Store locked by another process: {0}")]
    Locked(String),

    /// Structured access failed for a reason other than locking
    #[error("Store unreadable: {0}")]
    Unreadable(String),

    /// Filesystem error while listing or reading segments
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when the failure is the lock condition, which clears once the
    /// owning process exits.
    pub fn is_locked(&self) -> bool {
        matches!(self, StoreError::Locked(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_detection() {
        assert!(StoreError::Locked("held".into()).is_locked());
        assert!(!StoreError::Unreadable("bad block".into()).is_locked());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!err.is_locked());
    }
}
