//! Rollback-phase composer
//!
//! Rollback undoes prepare: claimed records are restored to the
//! before-image the prepare phase stored, and records that did not exist
//! before the transaction are removed. Every mutation is guarded on the
//! claim still being this transaction's, so a rollback that races a
//! completed commit (or a second rollback) composes guards that simply
//! fail to match and leaves the committed state untouched.

use super::MutationComposer;
use concord_core::api::{Delete, Put};
use concord_core::error::Result;
use concord_core::mutation::{ConditionalDelete, ConditionalPut, Mutation, MutationCondition};
use concord_core::record::{TransactionResult, TransactionState};
use concord_core::types::Key;

/// Composes the conditional batch of the rollback phase
pub struct RollbackMutationComposer {
    transaction_id: String,
    mutations: Vec<Mutation>,
}

impl RollbackMutationComposer {
    /// Composer for the given transaction
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
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

    fn restore(&mut self, key: Key, prior: Option<&TransactionResult>, claimed: TransactionState) {
        match prior {
            // The record predates the transaction: put the observed
            // committed record back verbatim.
            Some(record) => self.mutations.push(Mutation::Put(ConditionalPut {
                key,
                record: record.clone(),
                condition: self.claim_guard(claimed),
            })),
            // The prepare created the record; undo is removal.
            None => self.mutations.push(Mutation::Delete(ConditionalDelete {
                key,
                condition: self.claim_guard(claimed),
            })),
        }
    }
}

impl MutationComposer for RollbackMutationComposer {
    fn add_put(&mut self, put: &Put, prior: Option<&TransactionResult>) -> Result<()> {
        self.restore(Key::from(put), prior, TransactionState::Prepared);
        Ok(())
    }

    fn add_delete(&mut self, delete: &Delete, prior: Option<&TransactionResult>) -> Result<()> {
        self.restore(Key::from(delete), prior, TransactionState::Deleted);
        Ok(())
    }

    fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}
