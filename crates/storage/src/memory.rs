//! In-memory storage with single-record conditional writes
//!
//! `MemoryStorage` is the reference backend: a `BTreeMap` keyed by record
//! address, guarded by a `parking_lot::RwLock`. Conditions are evaluated
//! and applied under the write lock, which gives exactly the single-record
//! atomic compare-and-set the commit protocol requires, and nothing more.
//! There is deliberately no cross-record atomicity here.

use concord_core::api::{Get, Order, Scan, ScanBound};
use concord_core::error::{Error, Result};
use concord_core::mutation::{Mutation, MutationCondition};
use concord_core::record::TransactionResult;
use concord_core::traits::Storage;
use concord_core::types::{Key, RecordKey};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory `Storage` implementation
///
/// Key ordering (namespace, table, partition key, clustering key) keeps one
/// partition's records contiguous and clustering-sorted, so scans are a
/// filtered range walk.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<BTreeMap<Key, TransactionResult>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the storage holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Install a record unconditionally
    ///
    /// Test scaffolding: lets suites seed committed or in-flight states
    /// without driving the full protocol.
    pub fn put_record(&self, key: Key, record: TransactionResult) {
        self.records.write().insert(key, record);
    }

    /// Read a record by address
    pub fn get_record(&self, key: &Key) -> Option<TransactionResult> {
        self.records.read().get(key).cloned()
    }

    fn condition_holds(
        condition: &MutationCondition,
        current: Option<&TransactionResult>,
    ) -> bool {
        match condition {
            MutationCondition::NotExists => current.is_none(),
            MutationCondition::VersionIs { version } => {
                current.is_some_and(|r| r.version == *version)
            }
            MutationCondition::StateIs {
                state,
                transaction_id,
            } => current.is_some_and(|r| r.state == *state && r.transaction_id == *transaction_id),
        }
    }

    fn within_bounds(
        clustering_key: Option<&RecordKey>,
        start: Option<&ScanBound>,
        end: Option<&ScanBound>,
    ) -> bool {
        let Some(ck) = clustering_key else {
            // Records without a clustering key only match unbounded scans.
            return start.is_none() && end.is_none();
        };
        if let Some(bound) = start {
            let ok = if bound.inclusive { *ck >= bound.key } else { *ck > bound.key };
            if !ok {
                return false;
            }
        }
        if let Some(bound) = end {
            let ok = if bound.inclusive { *ck <= bound.key } else { *ck < bound.key };
            if !ok {
                return false;
            }
        }
        true
    }
}

impl Storage for MemoryStorage {
    fn get(&self, get: &Get) -> Result<Option<TransactionResult>> {
        let key = Key::from(get);
        Ok(self.records.read().get(&key).cloned())
    }

    fn scan(&self, scan: &Scan) -> Result<Vec<(Key, TransactionResult)>> {
        let records = self.records.read();

        // BTreeMap iteration is ascending in Key order, which within one
        // partition means ascending clustering-key order.
        let mut results: Vec<(Key, TransactionResult)> = records
            .iter()
            .filter(|(key, _)| {
                key.namespace() == scan.namespace
                    && key.table() == scan.table
                    && key.partition_key() == &scan.partition_key
                    && Self::within_bounds(key.clustering_key(), scan.start.as_ref(), scan.end.as_ref())
            })
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();

        if scan.order == Order::Descending {
            results.reverse();
        }
        if scan.limit > 0 {
            results.truncate(scan.limit);
        }
        Ok(results)
    }

    fn mutate(&self, mutations: &[Mutation]) -> Result<()> {
        let mut records = self.records.write();

        for mutation in mutations {
            let key = mutation.key();
            let current = records.get(key);

            if !Self::condition_holds(mutation.condition(), current) {
                debug!(%key, condition = ?mutation.condition(), "conditional mutation rejected");
                return Err(Error::ConditionNotMet { key: key.clone() });
            }

            match mutation {
                Mutation::Put(put) => {
                    records.insert(put.key.clone(), put.record.clone());
                }
                Mutation::Delete(delete) => {
                    records.remove(&delete.key);
                }
            }
        }
        Ok(())
    }
}
