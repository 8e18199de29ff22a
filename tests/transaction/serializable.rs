//! Serializable validation under both strategies

use crate::common;
use concorddb::{
    Error, Isolation, MemoryStorage, SerializableStrategy, Snapshot, TransactionState,
};

fn extra_write(id: &str) -> Snapshot {
    Snapshot::new(id, Isolation::Serializable, SerializableStrategy::ExtraWrite)
}

fn extra_read(id: &str) -> Snapshot {
    Snapshot::new(id, Isolation::Serializable, SerializableStrategy::ExtraRead)
}

// === Extra-write ===

#[test]
fn extra_write_commits_a_read_marker_for_read_only_keys() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    let tx = extra_write("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));
    common::commit_transaction(&storage, &tx).unwrap();

    // The marker rewrote alice under this transaction with no column
    // changes; the version moved, the balance did not.
    let alice = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(alice.transaction_id, "tx1");
    assert_eq!(alice.version, 4);
    assert_eq!(alice.state, TransactionState::Committed);
    assert_eq!(common::balance_of(&alice), 100);
}

#[test]
fn extra_write_turns_anti_dependency_into_write_conflict() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    // tx1 only reads alice; a concurrent writer commits first.
    let tx1 = extra_write("tx1");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    tx1.put_into_write_set(common::key("bob"), common::put("bob", 1));

    let writer = Snapshot::new("tx2", Isolation::Snapshot, SerializableStrategy::ExtraWrite);
    common::read(&storage, &writer, &common::key("alice")).unwrap();
    writer.put_into_write_set(common::key("alice"), common::put("alice", 999));
    common::commit_transaction(&storage, &writer).unwrap();

    // tx1's marker guards on the version it read; the prepare fails.
    let err = common::commit_transaction(&storage, &tx1).unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet { .. }));
}

#[test]
fn extra_write_catches_phantom_inserts() {
    let storage = MemoryStorage::new();

    // tx1 observed absence of alice.
    let tx1 = extra_write("tx1");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    tx1.put_into_write_set(common::key("bob"), common::put("bob", 1));

    // Someone inserts alice before tx1 commits.
    let inserter = Snapshot::new("tx2", Isolation::Snapshot, SerializableStrategy::ExtraWrite);
    common::read(&storage, &inserter, &common::key("alice")).unwrap();
    inserter.put_into_write_set(common::key("alice"), common::put("alice", 1));
    common::commit_transaction(&storage, &inserter).unwrap();

    // The absent-read marker is a put-if-not-exists; it fails now.
    let err = common::commit_transaction(&storage, &tx1).unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet { .. }));
}

#[test]
fn extra_write_absent_marker_commits_when_still_absent() {
    let storage = MemoryStorage::new();

    let tx = extra_write("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));
    common::commit_transaction(&storage, &tx).unwrap();

    // The marker materialized an empty committed record for alice.
    let alice = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(alice.version, 1);
    assert!(alice.values.is_empty());
}

// === Extra-read ===

#[test]
fn extra_read_passes_when_nothing_changed() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    let tx = extra_read("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));
    common::commit_transaction(&storage, &tx).unwrap();

    // No marker under extra-read: alice is untouched.
    let alice = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(alice.version, 3);
    assert_eq!(alice.transaction_id, "seed-alice");
}

#[test]
fn extra_read_conflicts_when_a_read_record_moved() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    let tx = extra_read("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));

    // Concurrent writer advances alice before validation.
    common::seed(&storage, "alice", 999, 4);

    let err = common::commit_transaction(&storage, &tx).unwrap_err();
    assert!(matches!(err, Error::CommitConflict { .. }));
    // Validation runs before the prepare batch is issued; bob was never
    // written at all.
    assert!(storage.get_record(&common::key("bob")).is_none());
}

#[test]
fn extra_read_conflicts_when_presence_flips() {
    let storage = MemoryStorage::new();

    let tx = extra_read("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));

    // Phantom insert after the absent read.
    common::seed(&storage, "alice", 1, 1);

    let err = common::commit_transaction(&storage, &tx).unwrap_err();
    assert!(matches!(err, Error::CommitConflict { .. }));
}

#[test]
fn extra_read_revalidates_scans_order_insensitively() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 1);

    let tx = extra_read("tx1");
    common::scan(&storage, &tx, &common::scan_partition("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));
    common::commit_transaction(&storage, &tx).unwrap();
}

#[test]
fn extra_read_conflicts_when_a_scan_gains_a_record() {
    let storage = MemoryStorage::new();

    let tx = extra_read("tx1");
    // Scan sees an empty partition.
    common::scan(&storage, &tx, &common::scan_partition("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));

    // A record appears in the scanned partition.
    common::seed(&storage, "alice", 1, 1);

    let err = common::commit_transaction(&storage, &tx).unwrap_err();
    assert!(matches!(err, Error::ScanConflict { .. }));
}

#[test]
fn extra_read_conflicts_when_a_scan_loses_a_record() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 1);

    let tx = extra_read("tx1");
    common::scan(&storage, &tx, &common::scan_partition("alice")).unwrap();
    tx.put_into_write_set(common::key("bob"), common::put("bob", 1));

    // The scanned record disappears before validation.
    let eraser = Snapshot::new("tx2", Isolation::Snapshot, SerializableStrategy::ExtraWrite);
    common::read(&storage, &eraser, &common::key("alice")).unwrap();
    eraser.put_into_delete_set(common::key("alice"), common::delete("alice"));
    common::commit_transaction(&storage, &eraser).unwrap();

    let err = common::commit_transaction(&storage, &tx).unwrap_err();
    assert!(matches!(err, Error::ScanConflict { .. }));
}

#[test]
fn extra_read_does_not_revalidate_written_keys() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    // Read-modify-write of the same key: after prepare the record carries
    // this transaction's claim, which must not read as a conflict.
    let tx = extra_read("tx1");
    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("alice"), common::put("alice", 150));
    common::commit_transaction(&storage, &tx).unwrap();

    assert_eq!(common::balance_of(&storage.get_record(&common::key("alice")).unwrap()), 150);
}

#[test]
fn snapshot_isolation_permits_write_skew() {
    // The contrast case: under snapshot isolation two transactions reading
    // each other's write target both commit.
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 1);
    common::seed(&storage, "bob", 100, 1);

    let tx1 = Snapshot::new("tx1", Isolation::Snapshot, SerializableStrategy::ExtraWrite);
    let tx2 = Snapshot::new("tx2", Isolation::Snapshot, SerializableStrategy::ExtraWrite);
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    common::read(&storage, &tx1, &common::key("bob")).unwrap();
    common::read(&storage, &tx2, &common::key("alice")).unwrap();
    common::read(&storage, &tx2, &common::key("bob")).unwrap();

    tx1.put_into_write_set(common::key("alice"), common::put("alice", 0));
    tx2.put_into_write_set(common::key("bob"), common::put("bob", 0));

    common::commit_transaction(&storage, &tx1).unwrap();
    common::commit_transaction(&storage, &tx2).unwrap();

    assert_eq!(common::balance_of(&storage.get_record(&common::key("alice")).unwrap()), 0);
    assert_eq!(common::balance_of(&storage.get_record(&common::key("bob")).unwrap()), 0);
}

#[test]
fn serializable_extra_write_forbids_the_same_write_skew() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 1);
    common::seed(&storage, "bob", 100, 1);

    let tx1 = extra_write("tx1");
    let tx2 = extra_write("tx2");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    common::read(&storage, &tx1, &common::key("bob")).unwrap();
    common::read(&storage, &tx2, &common::key("alice")).unwrap();
    common::read(&storage, &tx2, &common::key("bob")).unwrap();

    tx1.put_into_write_set(common::key("alice"), common::put("alice", 0));
    tx2.put_into_write_set(common::key("bob"), common::put("bob", 0));

    common::commit_transaction(&storage, &tx1).unwrap();
    // tx2's marker on alice guards on the version tx1 just advanced.
    let err = common::commit_transaction(&storage, &tx2).unwrap_err();
    assert!(err.is_conflict());
}
