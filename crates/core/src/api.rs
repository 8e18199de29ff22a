//! Logical CRUD operations
//!
//! These are the operations the application issues against a transaction:
//! point reads ([`Get`]), range reads ([`Scan`]), and buffered writes
//! ([`Put`], [`Delete`]). `Scan` is value-equal and hashable because the
//! scan itself (range, ordering, limit) is the lookup key of the
//! snapshot's scan set.

use crate::types::{Key, RecordKey, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point read of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Get {
    /// Namespace to read from
    pub namespace: String,
    /// Table to read from
    pub table: String,
    /// Partition key of the record
    pub partition_key: RecordKey,
    /// Clustering key of the record, if the table has one
    pub clustering_key: Option<RecordKey>,
}

impl Get {
    /// Point read addressed by partition key only
    pub fn new(
        namespace: impl Into<String>,
        table: impl Into<String>,
        partition_key: RecordKey,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            partition_key,
            clustering_key: None,
        }
    }

    /// Add a clustering key
    pub fn with_clustering_key(mut self, clustering_key: RecordKey) -> Self {
        self.clustering_key = Some(clustering_key);
        self
    }
}

impl From<&Key> for Get {
    fn from(key: &Key) -> Self {
        Self {
            namespace: key.namespace().to_string(),
            table: key.table().to_string(),
            partition_key: key.partition_key().clone(),
            clustering_key: key.clustering_key().cloned(),
        }
    }
}

impl From<&Get> for Key {
    fn from(get: &Get) -> Self {
        match &get.clustering_key {
            Some(ck) => Key::with_clustering(
                get.namespace.clone(),
                get.table.clone(),
                get.partition_key.clone(),
                ck.clone(),
            ),
            None => Key::new(
                get.namespace.clone(),
                get.table.clone(),
                get.partition_key.clone(),
            ),
        }
    }
}

/// Clustering-key order of a scan's results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    /// Ascending clustering-key order
    #[default]
    Ascending,
    /// Descending clustering-key order
    Descending,
}

/// One end of a clustering-key range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanBound {
    /// Clustering-key value at this end of the range
    pub key: RecordKey,
    /// Whether the bound itself is included
    pub inclusive: bool,
}

/// A range read over the records of one partition
///
/// Identity matters: two scans are the same scan-set entry only if their
/// namespace, table, partition key, bounds, order, and limit are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scan {
    /// Namespace to scan
    pub namespace: String,
    /// Table to scan
    pub table: String,
    /// Partition whose records are scanned
    pub partition_key: RecordKey,
    /// Lower clustering-key bound, if any
    pub start: Option<ScanBound>,
    /// Upper clustering-key bound, if any
    pub end: Option<ScanBound>,
    /// Result ordering
    pub order: Order,
    /// Maximum number of records to return; 0 means unlimited
    pub limit: usize,
}

impl Scan {
    /// Scan a whole partition in ascending order, no limit
    pub fn new(
        namespace: impl Into<String>,
        table: impl Into<String>,
        partition_key: RecordKey,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            partition_key,
            start: None,
            end: None,
            order: Order::default(),
            limit: 0,
        }
    }

    /// Set the inclusive/exclusive lower clustering-key bound
    pub fn with_start(mut self, key: RecordKey, inclusive: bool) -> Self {
        self.start = Some(ScanBound { key, inclusive });
        self
    }

    /// Set the inclusive/exclusive upper clustering-key bound
    pub fn with_end(mut self, key: RecordKey, inclusive: bool) -> Self {
        self.end = Some(ScanBound { key, inclusive });
        self
    }

    /// Set the result ordering
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Cap the number of returned records
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A buffered insert or update of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Put {
    /// Namespace to write to
    pub namespace: String,
    /// Table to write to
    pub table: String,
    /// Partition key of the record
    pub partition_key: RecordKey,
    /// Clustering key of the record, if the table has one
    pub clustering_key: Option<RecordKey>,
    /// Columns to write; overlays existing columns on update
    pub values: BTreeMap<String, Value>,
}

impl Put {
    /// Put addressed by partition key only, no columns yet
    pub fn new(
        namespace: impl Into<String>,
        table: impl Into<String>,
        partition_key: RecordKey,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            partition_key,
            clustering_key: None,
            values: BTreeMap::new(),
        }
    }

    /// Build a put addressed at an existing key, carrying no columns
    ///
    /// This is the shape of a serializable read marker: same address as the
    /// read, nothing new to write.
    pub fn from_key(key: &Key) -> Self {
        Self {
            namespace: key.namespace().to_string(),
            table: key.table().to_string(),
            partition_key: key.partition_key().clone(),
            clustering_key: key.clustering_key().cloned(),
            values: BTreeMap::new(),
        }
    }

    /// Add a clustering key
    pub fn with_clustering_key(mut self, clustering_key: RecordKey) -> Self {
        self.clustering_key = Some(clustering_key);
        self
    }

    /// Add a column value
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }
}

impl From<&Put> for Key {
    fn from(put: &Put) -> Self {
        match &put.clustering_key {
            Some(ck) => Key::with_clustering(
                put.namespace.clone(),
                put.table.clone(),
                put.partition_key.clone(),
                ck.clone(),
            ),
            None => Key::new(
                put.namespace.clone(),
                put.table.clone(),
                put.partition_key.clone(),
            ),
        }
    }
}

/// A buffered deletion of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delete {
    /// Namespace to delete from
    pub namespace: String,
    /// Table to delete from
    pub table: String,
    /// Partition key of the record
    pub partition_key: RecordKey,
    /// Clustering key of the record, if the table has one
    pub clustering_key: Option<RecordKey>,
}

impl Delete {
    /// Delete addressed by partition key only
    pub fn new(
        namespace: impl Into<String>,
        table: impl Into<String>,
        partition_key: RecordKey,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            partition_key,
            clustering_key: None,
        }
    }

    /// Add a clustering key
    pub fn with_clustering_key(mut self, clustering_key: RecordKey) -> Self {
        self.clustering_key = Some(clustering_key);
        self
    }
}

impl From<&Delete> for Key {
    fn from(delete: &Delete) -> Self {
        match &delete.clustering_key {
            Some(ck) => Key::with_clustering(
                delete.namespace.clone(),
                delete.table.clone(),
                delete.partition_key.clone(),
                ck.clone(),
            ),
            None => Key::new(
                delete.namespace.clone(),
                delete.table.clone(),
                delete.partition_key.clone(),
            ),
        }
    }
}
