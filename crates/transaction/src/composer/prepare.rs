//! Prepare-phase composer
//!
//! Prepare claims every record the transaction writes: a conditional put
//! that stamps this transaction's id, bumps the version, and stores the
//! prior committed record as the before-image. Deletes are prepared as
//! `Deleted`-state tombstones: deleting eagerly here would destroy the
//! before-image rollback needs; the physical delete is deferred to commit.
//!
//! Any condition mismatch when storage executes the batch means another
//! transaction already advanced the record; that surfaces as a conflict
//! and is never retried at this layer.

use super::{next_version, overlay_values, prepare_guard, MutationComposer};
use chrono::Utc;
use concord_core::api::{Delete, Put};
use concord_core::error::Result;
use concord_core::mutation::{ConditionalPut, Mutation};
use concord_core::record::{TransactionResult, TransactionState};
use concord_core::types::Key;

/// Composes the conditional batch of the prepare phase
pub struct PrepareMutationComposer {
    transaction_id: String,
    prepared_at: i64,
    mutations: Vec<Mutation>,
}

impl PrepareMutationComposer {
    /// Composer for the given transaction, stamped with the current time
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self::at(transaction_id, Utc::now().timestamp_millis())
    }

    /// Composer with an explicit prepare timestamp
    pub fn at(transaction_id: impl Into<String>, prepared_at: i64) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            prepared_at,
            mutations: Vec::new(),
        }
    }

    /// Consume the composer and take the composed batch
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    fn claimed_record(
        &self,
        put: &Put,
        prior: Option<&TransactionResult>,
        state: TransactionState,
    ) -> TransactionResult {
        TransactionResult {
            values: overlay_values(put, prior),
            transaction_id: self.transaction_id.clone(),
            state,
            version: next_version(prior),
            prepared_at: self.prepared_at,
            committed_at: None,
            before_image: prior.map(|r| Box::new(r.as_before_image())),
        }
    }
}

impl MutationComposer for PrepareMutationComposer {
    fn add_put(&mut self, put: &Put, prior: Option<&TransactionResult>) -> Result<()> {
        self.mutations.push(Mutation::Put(ConditionalPut {
            key: Key::from(put),
            record: self.claimed_record(put, prior, TransactionState::Prepared),
            condition: prepare_guard(prior),
        }));
        Ok(())
    }

    fn add_delete(&mut self, delete: &Delete, prior: Option<&TransactionResult>) -> Result<()> {
        // Tombstone keeps the prior columns; only the state says "gone".
        let tombstone_source = Put::from_key(&Key::from(delete));
        self.mutations.push(Mutation::Put(ConditionalPut {
            key: Key::from(delete),
            record: self.claimed_record(&tombstone_source, prior, TransactionState::Deleted),
            condition: prepare_guard(prior),
        }));
        Ok(())
    }

    fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}
