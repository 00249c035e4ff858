//! Error taxonomy for the engine.
//!
//! `EconomyError` values are recoverable rejections: the state is left
//! untouched and the presentation layer is told why. Persistence errors
//! never poison in-memory state.

use std::io;

use thiserror::Error;

/// A rejected economy command. No state was changed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    #[error("not enough gold: need {cost}, have {gold}")]
    InsufficientFunds { cost: f64, gold: f64 },
    #[error("no prestige shards available yet")]
    NothingToPrestige,
    #[error("unknown generator: {0}")]
    UnknownGenerator(String),
}

/// The persisted snapshot could not be interpreted at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Failure reported by a snapshot storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage backend failed: {0}")]
    Backend(String),
    /// The stored bytes are not a text snapshot. The engine moves them aside.
    #[error("stored snapshot is unreadable: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("snapshot storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_funds_message_names_both_amounts() {
        let err = EconomyError::InsufficientFunds {
            cost: 10.0,
            gold: 3.0,
        };
        assert_eq!(err.to_string(), "not enough gold: need 10, have 3");
    }

    #[test]
    fn corrupt_store_error_keeps_reason() {
        let err: EngineError = StoreError::Corrupt("invalid utf-8".to_string()).into();
        assert_eq!(
            err.to_string(),
            "snapshot storage failed: stored snapshot is unreadable: invalid utf-8"
        );
    }

    #[test]
    fn io_error_wraps_into_store_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: EngineError = StoreError::from(io_err).into();
        assert!(err.to_string().contains("read-only"));
    }
}
