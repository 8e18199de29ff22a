//! Isolation levels and serializable validation strategies
//!
//! Both are fixed at snapshot creation and apply to the whole transaction.
//! The strategy only matters under [`Isolation::Serializable`]; snapshot
//! isolation never runs extra validation and relies solely on the
//! conditional writes at prepare to catch concurrent writers (write skew is
//! possible by design).

use serde::{Deserialize, Serialize};

/// Isolation level of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Isolation {
    /// Conditional writes at prepare are the only conflict check
    #[default]
    Snapshot,
    /// Read/scan sets are additionally validated per the chosen strategy
    Serializable,
}

/// How serializability is validated at commit time
///
/// `ExtraWrite` converts read-write anti-dependencies into write-write
/// conflicts by composing a no-op read-marker put for every key that was
/// only read, piggybacking on the storage layer's own conditional check:
/// no extra round-trip, but markers churn records for pure readers.
/// `ExtraRead` instead re-reads every read-set entry and re-runs every
/// recorded scan at commit time: one extra storage pass, no marker churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerializableStrategy {
    /// Compose read markers into the effective write set
    #[default]
    ExtraWrite,
    /// Re-read the read and scan sets before prepare
    ExtraRead,
}
