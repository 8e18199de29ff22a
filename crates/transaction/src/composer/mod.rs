//! Mutation composers for the three commit phases
//!
//! A composer consumes `(logical mutation, prior observed record)` pairs
//! from [`Snapshot::to`](crate::Snapshot::to) and accumulates the
//! conditional storage batch for one phase of the protocol. The three
//! implementations share the contract but differ in output:
//!
//! - [`PrepareMutationComposer`]: claim records by writing `Prepared` (or
//!   `Deleted` tombstone) state under a version/existence guard
//! - [`CommitMutationComposer`]: flip claimed records to `Committed` and
//!   perform deferred physical deletes, guarded on this transaction's claim
//! - [`RollbackMutationComposer`]: restore prior state (or remove prepared
//!   inserts), guarded the same way, which makes rollback idempotent
//!
//! Composers are stateless across transactions: one composer instance
//! serves exactly one `to()` pass.

mod commit;
mod prepare;
mod rollback;

pub use commit::CommitMutationComposer;
pub use prepare::PrepareMutationComposer;
pub use rollback::RollbackMutationComposer;

use concord_core::api::{Delete, Put};
use concord_core::error::Result;
use concord_core::mutation::{Mutation, MutationCondition};
use concord_core::record::TransactionResult;
use concord_core::types::Value;
use std::collections::BTreeMap;

/// Contract shared by the three phase composers
pub trait MutationComposer {
    /// Compose the conditional mutation for one buffered put
    ///
    /// `prior` is the record this transaction observed before writing;
    /// `None` for a blind write.
    ///
    /// # Errors
    /// Composition itself does not touch storage; errors are reserved for
    /// malformed input.
    fn add_put(&mut self, put: &Put, prior: Option<&TransactionResult>) -> Result<()>;

    /// Compose the conditional mutation for one buffered delete
    ///
    /// # Errors
    /// See [`MutationComposer::add_put`].
    fn add_delete(&mut self, delete: &Delete, prior: Option<&TransactionResult>) -> Result<()>;

    /// The batch composed so far, in `add` order
    fn mutations(&self) -> &[Mutation];
}

/// Column values after applying a put on top of the prior record
///
/// Prepare and commit must agree byte-for-byte on the record they compose,
/// so both go through this.
pub(crate) fn overlay_values(
    put: &Put,
    prior: Option<&TransactionResult>,
) -> BTreeMap<String, Value> {
    let mut values = prior.map(|r| r.values.clone()).unwrap_or_default();
    values.extend(put.values.iter().map(|(k, v)| (k.clone(), v.clone())));
    values
}

/// Version the record takes when this transaction's write lands
pub(crate) fn next_version(prior: Option<&TransactionResult>) -> u64 {
    prior.map_or(1, |r| r.version + 1)
}

/// Prepare-phase guard: insert-if-absent, else update-if-unchanged
pub(crate) fn prepare_guard(prior: Option<&TransactionResult>) -> MutationCondition {
    match prior {
        None => MutationCondition::NotExists,
        Some(r) => MutationCondition::VersionIs { version: r.version },
    }
}
