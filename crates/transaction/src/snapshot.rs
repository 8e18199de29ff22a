//! The per-transaction snapshot ledger
//!
//! A [`Snapshot`] records everything one transaction has observed and
//! buffered: the read set (point reads and scan-produced records), the scan
//! set (whole scans and the keys they returned), and the write and delete
//! sets (buffered mutations, applied only at commit). At commit time the
//! snapshot is the sole input to mutation composition and serializable
//! validation.
//!
//! All set-mutating methods take `&self`; the sets are individually locked
//! so the sub-operations of one transaction may run in parallel. Locks are
//! always acquired in write, delete, read, scan order.

use crate::composer::MutationComposer;
use crate::isolation::{Isolation, SerializableStrategy};
use concord_core::api::{Delete, Get, Put, Scan};
use concord_core::error::{Error, Result};
use concord_core::record::TransactionResult;
use concord_core::traits::Storage;
use concord_core::types::Key;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A hash map that remembers insertion order
///
/// Composition must feed mutations to the composer in the order the
/// transaction buffered them, and a plain `HashMap` loses that.
struct OrderedMap<K, V> {
    entries: HashMap<K, V>,
    order: Vec<K>,
}

impl<K: Clone + Eq + Hash, V> OrderedMap<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let prev = self.entries.insert(key.clone(), value);
        if prev.is_none() {
            self.order.push(key);
        }
        prev
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let prev = self.entries.remove(key);
        if prev.is_some() {
            self.order.retain(|k| k != key);
        }
        prev
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k, v)))
    }
}

/// `(transaction_id, version)` pair identifying one observed record state
fn record_identity(result: Option<&TransactionResult>) -> Option<(&str, u64)> {
    result.map(|r| (r.transaction_id.as_str(), r.version))
}

/// The ledger of one transaction's reads, scans, and buffered mutations
pub struct Snapshot {
    id: String,
    isolation: Isolation,
    strategy: SerializableStrategy,
    write_set: Mutex<OrderedMap<Key, Put>>,
    delete_set: Mutex<OrderedMap<Key, Delete>>,
    read_set: Mutex<OrderedMap<Key, Option<TransactionResult>>>,
    scan_set: Mutex<HashMap<Scan, Vec<Key>>>,
}

impl Snapshot {
    /// Snapshot for a new transaction
    ///
    /// Isolation and strategy are fixed for the snapshot's lifetime.
    pub fn new(
        id: impl Into<String>,
        isolation: Isolation,
        strategy: SerializableStrategy,
    ) -> Self {
        Self {
            id: id.into(),
            isolation,
            strategy,
            write_set: Mutex::new(OrderedMap::new()),
            delete_set: Mutex::new(OrderedMap::new()),
            read_set: Mutex::new(OrderedMap::new()),
            scan_set: Mutex::new(HashMap::new()),
        }
    }

    /// The owning transaction's id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Isolation level of the owning transaction
    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Serializable validation strategy of the owning transaction
    pub fn strategy(&self) -> SerializableStrategy {
        self.strategy
    }

    fn has_buffered_mutation(&self, key: &Key) -> bool {
        if self.write_set.lock().contains_key(key) {
            return true;
        }
        self.delete_set.lock().contains_key(key)
    }

    /// Record the result of a storage read
    ///
    /// `None` records the observed absence of the record, which matters for
    /// serializable validation. Recording a read for a key that already has
    /// a buffered write is a protocol violation.
    ///
    /// # Errors
    /// `ReadAfterWrite` when the key has a buffered write or delete;
    /// `CommitConflict` when the key was already read with different record
    /// metadata (a point read and a scan disagreeing means another
    /// transaction committed in between).
    pub fn put_into_read_set(&self, key: Key, result: Option<TransactionResult>) -> Result<()> {
        if self.has_buffered_mutation(&key) {
            return Err(Error::ReadAfterWrite { key });
        }
        let mut read_set = self.read_set.lock();
        if let Some(existing) = read_set.get(&key) {
            if record_identity(existing.as_ref()) != record_identity(result.as_ref()) {
                tracing::warn!(key = %key, "conflicting observations of the same key");
                return Err(Error::CommitConflict { key });
            }
        }
        read_set.insert(key, result);
        Ok(())
    }

    /// Look up what this transaction has already read for a key
    ///
    /// Returns `Ok(None)` both when the key was never read and when it was
    /// read as absent; the read set itself distinguishes the two, the CRUD
    /// layer does not need to.
    ///
    /// # Errors
    /// `ReadAfterWrite` when the key has a buffered write or delete.
    pub fn get_from_read_set(&self, key: &Key) -> Result<Option<TransactionResult>> {
        if self.has_buffered_mutation(key) {
            return Err(Error::ReadAfterWrite { key: key.clone() });
        }
        Ok(self.read_set.lock().get(key).cloned().flatten())
    }

    /// Buffer a put
    ///
    /// Last write wins: a put supersedes an earlier put or delete of the
    /// same key.
    pub fn put_into_write_set(&self, key: Key, put: Put) {
        let mut write_set = self.write_set.lock();
        self.delete_set.lock().remove(&key);
        write_set.insert(key, put);
    }

    /// Buffer a delete
    ///
    /// Last write wins: a delete supersedes an earlier put or delete of the
    /// same key.
    pub fn put_into_delete_set(&self, key: Key, delete: Delete) {
        let mut write_set = self.write_set.lock();
        write_set.remove(&key);
        self.delete_set.lock().insert(key, delete);
    }

    /// Record a scan and the keys it returned
    pub fn put_into_scan_set(&self, scan: Scan, keys: Vec<Key>) {
        self.scan_set.lock().insert(scan, keys);
    }

    /// Look up the recorded result of a scan, if this exact scan ran before
    ///
    /// The whole scan is the map key; a scan differing in range, ordering,
    /// or limit is a different entry.
    pub fn get_from_scan_set(&self, scan: &Scan) -> Option<Vec<Key>> {
        self.scan_set.lock().get(scan).cloned()
    }

    /// Number of read-set entries, absent reads included
    pub fn read_set_size(&self) -> usize {
        self.read_set.lock().len()
    }

    /// Number of buffered puts
    pub fn write_set_size(&self) -> usize {
        self.write_set.lock().len()
    }

    /// Number of buffered deletes
    pub fn delete_set_size(&self) -> usize {
        self.delete_set.lock().len()
    }

    /// Number of recorded scans
    pub fn scan_set_size(&self) -> usize {
        self.scan_set.lock().len()
    }

    /// Whether the transaction buffered any mutation at all
    ///
    /// A read-only transaction can skip the prepare and commit phases under
    /// snapshot isolation.
    pub fn has_writes(&self) -> bool {
        !self.write_set.lock().is_empty() || !self.delete_set.lock().is_empty()
    }

    /// Feed the buffered mutations to a phase composer
    ///
    /// Write-set entries first, then delete-set entries, each in insertion
    /// order and paired with the prior record this transaction read for the
    /// key (`None` for blind writes). Under serializable isolation with the
    /// extra-write strategy, every read-set entry whose key has no buffered
    /// mutation is additionally fed as a value-less read-marker put, for
    /// present and absent reads alike; an absent read composes a
    /// put-if-not-exists, which is what catches phantom inserts.
    ///
    /// Markers are synthesized per pass and never stored, so composing the
    /// prepare and commit batches from the same snapshot yields matching
    /// records.
    ///
    /// # Errors
    /// Propagates composer errors.
    pub fn to<C: MutationComposer + ?Sized>(&self, composer: &mut C) -> Result<()> {
        let write_set = self.write_set.lock();
        let delete_set = self.delete_set.lock();
        let read_set = self.read_set.lock();

        for (key, put) in write_set.iter() {
            let prior = read_set.get(key).and_then(|r| r.as_ref());
            composer.add_put(put, prior)?;
        }
        for (key, delete) in delete_set.iter() {
            let prior = read_set.get(key).and_then(|r| r.as_ref());
            composer.add_delete(delete, prior)?;
        }

        let mut markers = 0usize;
        if self.isolation == Isolation::Serializable
            && self.strategy == SerializableStrategy::ExtraWrite
        {
            for (key, read) in read_set.iter() {
                if write_set.contains_key(key) || delete_set.contains_key(key) {
                    continue;
                }
                let marker = Put::from_key(key);
                composer.add_put(&marker, read.as_ref())?;
                markers += 1;
            }
        }

        tracing::debug!(
            transaction_id = %self.id,
            writes = write_set.len(),
            deletes = delete_set.len(),
            markers,
            "composed mutation batch"
        );
        Ok(())
    }

    /// Validate serializability by re-reading, under the extra-read strategy
    ///
    /// No-op unless the snapshot is serializable with extra-read. Re-reads
    /// every read-set entry whose key has no buffered mutation (those keys
    /// are guarded by the conditional prepare itself) and re-runs every
    /// recorded scan. Fails on the first record whose presence flipped or
    /// whose `(transaction_id, version)` moved, and on the first scan whose
    /// key set changed in either direction. Ordering differences within a
    /// scan are not conflicts. Storage is never written.
    ///
    /// # Errors
    /// `CommitConflict` / `ScanConflict` on validation failure; storage
    /// errors are propagated unchanged.
    pub fn to_serializable_with_extra_read<S: Storage + ?Sized>(&self, storage: &S) -> Result<()> {
        if self.isolation != Isolation::Serializable
            || self.strategy != SerializableStrategy::ExtraRead
        {
            return Ok(());
        }

        let scans: Vec<(Scan, Vec<Key>)> = self
            .scan_set
            .lock()
            .iter()
            .map(|(s, keys)| (s.clone(), keys.clone()))
            .collect();
        for (scan, recorded) in scans {
            let rescanned: HashSet<Key> =
                storage.scan(&scan)?.into_iter().map(|(key, _)| key).collect();
            let recorded: HashSet<Key> = recorded.into_iter().collect();
            if rescanned != recorded {
                tracing::warn!(transaction_id = %self.id, "scan result set changed during validation");
                return Err(Error::ScanConflict {
                    scan: Box::new(scan),
                });
            }
        }

        let reads: Vec<(Key, Option<(String, u64)>)> = self
            .read_set
            .lock()
            .iter()
            .map(|(key, result)| {
                let identity = record_identity(result.as_ref())
                    .map(|(id, version)| (id.to_string(), version));
                (key.clone(), identity)
            })
            .collect();
        for (key, recorded) in reads {
            if self.has_buffered_mutation(&key) {
                continue;
            }
            let latest = storage.get(&Get::from(&key))?;
            let latest_identity = record_identity(latest.as_ref())
                .map(|(id, version)| (id.to_string(), version));
            if latest_identity != recorded {
                tracing::warn!(transaction_id = %self.id, key = %key, "record changed during validation");
                return Err(Error::CommitConflict { key });
            }
        }

        Ok(())
    }
}
