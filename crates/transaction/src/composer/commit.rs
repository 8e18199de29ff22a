//! Commit-phase composer
//!
//! Commit flips every record this transaction claimed at prepare to
//! `Committed`, and performs the physical delete the tombstones deferred.
//! Every mutation is guarded on "still claimed by me": state `Prepared`
//! (puts) or `Deleted` (tombstones) and this transaction's id. A guard
//! that fails means the record was rolled back or taken over by recovery;
//! the coordinator treats that as fatal to this attempt.

use super::{next_version, overlay_values, MutationComposer};
use chrono::Utc;
use concord_core::api::{Delete, Put};
use concord_core::error::Result;
use concord_core::mutation::{ConditionalDelete, ConditionalPut, Mutation, MutationCondition};
use concord_core::record::{TransactionResult, TransactionState};
use concord_core::types::Key;

/// Composes the conditional batch of the commit phase
pub struct CommitMutationComposer {
    transaction_id: String,
    prepared_at: i64,
    committed_at: i64,
    mutations: Vec<Mutation>,
}

impl CommitMutationComposer {
    /// Composer for the given transaction, commit stamped with the current
    /// time
    ///
    /// `prepared_at` is the timestamp the prepare phase wrote; the commit
    /// put carries it forward unchanged so the prepare-to-commit lag stays
    /// observable on committed records.
    pub fn new(transaction_id: impl Into<String>, prepared_at: i64) -> Self {
        Self::at(transaction_id, prepared_at, Utc::now().timestamp_millis())
    }

    /// Composer with explicit prepare and commit timestamps
    pub fn at(transaction_id: impl Into<String>, prepared_at: i64, committed_at: i64) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            prepared_at,
            committed_at,
            mutations: Vec::new(),
        }
    }

    /// Consume the composer and take the composed batch
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    fn claim_guard(&self, state: TransactionState) -> MutationCondition {
        MutationCondition::StateIs {
            state,
            transaction_id: self.transaction_id.clone(),
        }
    }
}

impl MutationComposer for CommitMutationComposer {
    fn add_put(&mut self, put: &Put, prior: Option<&TransactionResult>) -> Result<()> {
        // Recomposes the record exactly as prepare did (same overlay, same
        // version) with the commit outcome applied: Committed state, a
        // commit timestamp, and the before-image cleared.
        self.mutations.push(Mutation::Put(ConditionalPut {
            key: Key::from(put),
            record: TransactionResult {
                values: overlay_values(put, prior),
                transaction_id: self.transaction_id.clone(),
                state: TransactionState::Committed,
                version: next_version(prior),
                prepared_at: self.prepared_at,
                committed_at: Some(self.committed_at),
                before_image: None,
            },
            condition: self.claim_guard(TransactionState::Prepared),
        }));
        Ok(())
    }

    fn add_delete(&mut self, delete: &Delete, _prior: Option<&TransactionResult>) -> Result<()> {
        // The deferred physical delete: remove the tombstone this
        // transaction prepared.
        self.mutations.push(Mutation::Delete(ConditionalDelete {
            key: Key::from(delete),
            condition: self.claim_guard(TransactionState::Deleted),
        }));
        Ok(())
    }

    fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}
