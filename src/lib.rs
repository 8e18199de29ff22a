//! Concord - ACID multi-record transactions over conditional-write storage
//!
//! Concord layers multi-record transactions on top of storage that only
//! offers single-record conditional writes. Transaction metadata (id,
//! state, version, before-image) travels inside each record; the
//! conditional write is the only lock primitive.
//!
//! # Quick Start
//!
//! ```ignore
//! use concorddb::{
//!     generate_transaction_id, Isolation, PrepareMutationComposer,
//!     SerializableStrategy, Snapshot, Storage,
//! };
//!
//! let id = generate_transaction_id();
//! let snapshot = Snapshot::new(&id, Isolation::Snapshot, SerializableStrategy::ExtraWrite);
//!
//! // ... record reads and buffer writes on the snapshot ...
//!
//! let mut prepare = PrepareMutationComposer::new(&id);
//! snapshot.to(&mut prepare)?;
//! storage.mutate(prepare.mutations())?;
//! ```
//!
//! # Architecture
//!
//! - [`concord_core`]: record addressing, operations, the conditional
//!   mutation model, the [`Storage`] trait, and the error taxonomy
//! - [`concord_storage`]: the in-memory reference backend
//! - [`concord_transaction`]: the per-transaction [`Snapshot`] ledger and
//!   the prepare/commit/rollback mutation composers
//!
//! The commit coordinator (retry policy, lazy recovery of abandoned
//! transactions) sits above this crate and drives the two commit-time
//! hooks, [`Snapshot::to`] and [`Snapshot::to_serializable_with_extra_read`].

// Re-export the public API from the member crates
pub use concord_core::*;
pub use concord_storage::MemoryStorage;
pub use concord_transaction::{
    generate_transaction_id, CommitMutationComposer, Isolation, MutationComposer,
    PrepareMutationComposer, RollbackMutationComposer, SerializableStrategy, Snapshot,
};
