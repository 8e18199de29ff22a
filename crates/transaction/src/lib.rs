//! Consensus Commit transaction core
//!
//! This crate implements the snapshot/validation/mutation-composition
//! subsystem of the Consensus Commit protocol:
//! - [`Snapshot`]: the per-transaction ledger of reads, scans, writes, and
//!   deletes
//! - [`Isolation`] / [`SerializableStrategy`]: the two isolation levels and
//!   the two serializable validation strategies
//! - [`MutationComposer`] and its three implementations, which turn the
//!   snapshot's write/delete sets into the conditional storage batches of
//!   the prepare, commit, and rollback phases
//!
//! The commit coordinator that drives prepare → commit (or rollback) lives
//! outside this crate; it calls [`Snapshot::to`] and
//! [`Snapshot::to_serializable_with_extra_read`] as the two commit-time
//! hooks and hands the composed batches to storage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composer;
pub mod isolation;
pub mod snapshot;

pub use composer::{
    CommitMutationComposer, MutationComposer, PrepareMutationComposer, RollbackMutationComposer,
};
pub use isolation::{Isolation, SerializableStrategy};
pub use snapshot::Snapshot;

use uuid::Uuid;

/// Generate a fresh transaction id
///
/// Ids only need to be unique among in-flight transactions; UUID v4 gives
/// that without coordination.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}
