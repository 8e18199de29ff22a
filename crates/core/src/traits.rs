//! Storage capability trait
//!
//! The transaction layer consumes storage as a capability: point reads,
//! range reads, and conditional mutation. Any backend that provides
//! single-record atomic conditional writes can implement this trait; the
//! in-memory backend in `concord-storage` is the reference implementation
//! and the semantics tests run against.

use crate::api::{Get, Scan};
use crate::error::Result;
use crate::mutation::Mutation;
use crate::record::TransactionResult;
use crate::types::Key;

/// Storage abstraction with single-record conditional-write semantics
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Every method is a blocking I/O
/// boundary.
pub trait Storage: Send + Sync {
    /// Point-read one record
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn get(&self, get: &Get) -> Result<Option<TransactionResult>>;

    /// Range-read the records of one partition
    ///
    /// Results are returned with their addresses, ordered by clustering key
    /// per the scan's `order`, bounded and limited per the scan.
    ///
    /// # Errors
    /// Returns an error if the backend fails.
    fn scan(&self, scan: &Scan) -> Result<Vec<(Key, TransactionResult)>>;

    /// Apply conditional mutations, each atomic at single-record granularity
    ///
    /// Conditions are checked per record; there is no cross-record
    /// atomicity here; that is exactly what the commit protocol builds on
    /// top. Implementations fail fast on the first rejected condition.
    ///
    /// # Errors
    /// `Error::ConditionNotMet` when a precondition does not hold;
    /// `Error::Storage` on backend failure.
    fn mutate(&self, mutations: &[Mutation]) -> Result<()>;
}
