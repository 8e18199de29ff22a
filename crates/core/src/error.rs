//! Error types for Concord
//!
//! One taxonomy, three retry behaviors:
//! - protocol misuse (`ReadAfterWrite`, `InvalidOperation`): programming
//!   errors, fatal to the transaction, never retried;
//! - commit conflicts (`CommitConflict`, `ScanConflict`, `ConditionNotMet`):
//!   fatal to this attempt, the whole transaction may be retried from
//!   scratch by the caller;
//! - storage failures (`Storage`, `Serialization`): propagated unchanged,
//!   retry policy is the coordinator's call.

use crate::api::Scan;
use crate::types::Key;
use thiserror::Error;

/// Result type alias for Concord operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the transaction and storage layers
#[derive(Debug, Error)]
pub enum Error {
    /// A key was read after being written in the same transaction
    ///
    /// The protocol assumes reads precede writes to a key within one
    /// transaction; violating that is a CRUD-protocol bug in the caller,
    /// not a conflict.
    #[error("read-after-write violation on {key}: key already has a buffered write in this transaction")]
    ReadAfterWrite {
        /// Key with a buffered write
        key: Key,
    },

    /// A record this transaction read changed before it could commit
    #[error("commit conflict on {key}: record changed after it was read")]
    CommitConflict {
        /// Key whose record changed
        key: Key,
    },

    /// A recorded scan returned a different key set at validation time
    #[error("commit conflict: result set changed for scan {scan:?}")]
    ScanConflict {
        /// The scan whose result set changed
        scan: Box<Scan>,
    },

    /// A conditional mutation's precondition did not hold
    ///
    /// Another transaction has already advanced this record.
    #[error("condition not met for mutation on {key}")]
    ConditionNotMet {
        /// Key the rejected mutation targeted
        key: Key,
    },

    /// Operation issued against a transaction in the wrong state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Backend or transport failure, propagated unchanged
    #[error("storage error: {0}")]
    Storage(String),

    /// Record encode/decode failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error is a commit conflict
    ///
    /// Conflicts mean the transaction must be rolled back and may be
    /// retried from scratch; they are never resumable in place.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::CommitConflict { .. } | Error::ScanConflict { .. } | Error::ConditionNotMet { .. }
        )
    }
}
