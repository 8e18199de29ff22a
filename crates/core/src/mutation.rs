//! Conditional mutation model
//!
//! The composers turn a transaction's logical writes into these
//! storage-level mutations. Each mutation targets a single record and
//! carries a precondition on the record's metadata; the storage layer
//! checks the condition and applies the write atomically per record. A
//! failed condition means another transaction got there first.

use crate::record::{TransactionResult, TransactionState};
use crate::types::Key;
use serde::{Deserialize, Serialize};

/// Precondition a storage mutation is guarded by
///
/// Evaluated against the record's current metadata under the storage
/// engine's single-record atomicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationCondition {
    /// The record must not exist (insert / phantom guard)
    NotExists,
    /// The record must exist at exactly this committed version
    VersionIs {
        /// Expected current version
        version: u64,
    },
    /// The record must be claimed by this transaction in this state
    ///
    /// The guard of the commit and rollback phases; it is what makes both
    /// idempotent: once the state flips, re-applying fails harmlessly.
    StateIs {
        /// Expected record state
        state: TransactionState,
        /// Expected claiming transaction id
        transaction_id: String,
    },
}

/// Conditional write of a full record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalPut {
    /// Record address
    pub key: Key,
    /// Complete new record state, metadata included
    pub record: TransactionResult,
    /// Precondition on the current record
    pub condition: MutationCondition,
}

/// Conditional physical removal of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalDelete {
    /// Record address
    pub key: Key,
    /// Precondition on the current record
    pub condition: MutationCondition,
}

/// A single-record conditional storage operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Conditional put
    Put(ConditionalPut),
    /// Conditional delete
    Delete(ConditionalDelete),
}

impl Mutation {
    /// Address of the record this mutation targets
    pub fn key(&self) -> &Key {
        match self {
            Mutation::Put(put) => &put.key,
            Mutation::Delete(delete) => &delete.key,
        }
    }

    /// Precondition guarding this mutation
    pub fn condition(&self) -> &MutationCondition {
        match self {
            Mutation::Put(put) => &put.condition,
            Mutation::Delete(delete) => &delete.condition,
        }
    }
}
