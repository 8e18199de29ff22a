//! Record metadata model
//!
//! Every stored record carries its transaction metadata inline: the id of
//! the transaction that last touched it, a per-record monotonic version, a
//! state, timestamps, and a one-step before-image. This metadata is the
//! lock table of the commit protocol: conditional writes keyed on
//! `(state, transaction_id, version)` are the only synchronization
//! primitive, so everything a concurrent writer needs to observe lives on
//! the record itself.

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// State of a stored record within the commit protocol
///
/// Transitions per record, driven by the three mutation phases:
///
/// ```text
/// (absent | Committed) --prepare--> Prepared --commit--> Committed
///                                   Prepared --rollback--> (absent | prior Committed)
/// ```
///
/// `Deleted` is the prepared tombstone: a delete is prepared as a
/// conditional put carrying this state, and the physical delete happens at
/// commit. Rolling back a `Deleted` record restores the before-image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Durable, visible to other transactions
    Committed,
    /// Claimed by an in-flight transaction's prepare phase
    Prepared,
    /// Prepared tombstone; physically removed at commit
    Deleted,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::Prepared => write!(f, "PREPARED"),
            TransactionState::Deleted => write!(f, "DELETED"),
        }
    }
}

/// One stored record together with its transaction metadata
///
/// `version` strictly increases with each successful commit of the record.
/// `before_image` holds the immediately preceding committed state, a
/// single level of undo, never a chain, which is exactly what rollback
/// needs and nothing more. The nested image always has `before_image:
/// None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Committed column values of the record
    pub values: BTreeMap<String, Value>,
    /// Id of the transaction that wrote this version
    pub transaction_id: String,
    /// Record state within the commit protocol
    pub state: TransactionState,
    /// Per-record monotonic version
    pub version: u64,
    /// Millisecond timestamp of the prepare that wrote this version
    pub prepared_at: i64,
    /// Millisecond timestamp of the commit, if committed
    pub committed_at: Option<i64>,
    /// The immediately preceding committed state (single-step undo)
    pub before_image: Option<Box<TransactionResult>>,
}

impl TransactionResult {
    /// Whether this record is visible as committed data
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }

    /// Whether this record is claimed by an in-flight transaction
    ///
    /// True for both `Prepared` and `Deleted` (the prepared tombstone).
    pub fn is_claimed(&self) -> bool {
        matches!(
            self.state,
            TransactionState::Prepared | TransactionState::Deleted
        )
    }

    /// Copy of this record suitable for embedding as a before-image
    ///
    /// Strips the record's own before-image so the undo history stays one
    /// step deep.
    pub fn as_before_image(&self) -> TransactionResult {
        TransactionResult {
            before_image: None,
            ..self.clone()
        }
    }
}
