//! Record addressing types
//!
//! A stored record is addressed by a [`Key`]: namespace, table, partition
//! key, and optional clustering key. Keys are value-equal and hashable so
//! they can serve as the deduplication unit for the per-transaction
//! read/write/delete sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed column value
///
/// Values are totally ordered so clustering keys can be range-compared and
/// scan results sorted. Ordering across variants follows declaration order;
/// within a table the same column always carries the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    /// Boolean column
    Boolean(bool),
    /// 64-bit signed integer column
    Int(i64),
    /// UTF-8 text column
    Text(String),
    /// Opaque binary column
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "0x{}", hex(b)),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// An ordered list of named column values forming a partition or clustering key
///
/// Two record keys are equal when their columns (names, values, and order)
/// are equal. The derived `Ord` compares column-by-column, which is what
/// clustering-key range bounds rely on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    columns: Vec<(String, Value)>,
}

impl RecordKey {
    /// Create a record key from named column values
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Single text column key
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(vec![(name.into(), Value::Text(value.into()))])
    }

    /// Single integer column key
    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::new(vec![(name.into(), Value::Int(value))])
    }

    /// The key's columns, in declaration order
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Full address of one logical record
///
/// `(namespace, table, partition_key, clustering_key)` uniquely identifies a
/// record. Immutable once constructed; value-equal keys deduplicate in the
/// snapshot's sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    namespace: String,
    table: String,
    partition_key: RecordKey,
    clustering_key: Option<RecordKey>,
}

impl Key {
    /// Create a key without a clustering key
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

    /// Create a key with a clustering key
    pub fn with_clustering(
        namespace: impl Into<String>,
        table: impl Into<String>,
        partition_key: RecordKey,
        clustering_key: RecordKey,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            partition_key,
            clustering_key: Some(clustering_key),
        }
    }

    /// Namespace this record belongs to
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Table this record belongs to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Partition key columns
    pub fn partition_key(&self) -> &RecordKey {
        &self.partition_key
    }

    /// Clustering key columns, if the table has them
    pub fn clustering_key(&self) -> Option<&RecordKey> {
        self.clustering_key.as_ref()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}", self.namespace, self.table, self.partition_key)?;
        if let Some(ck) = &self.clustering_key {
            write!(f, ";{}", ck)?;
        }
        write!(f, "]")
    }
}
