//! Prepare/commit rounds against the in-memory backend

use crate::common;
use concorddb::{
    Error, Isolation, MemoryStorage, SerializableStrategy, Snapshot, TransactionState,
};

fn snapshot(id: &str) -> Snapshot {
    Snapshot::new(id, Isolation::Snapshot, SerializableStrategy::ExtraWrite)
}

#[test]
fn fresh_insert_commits_at_version_one() {
    let storage = MemoryStorage::new();
    let tx = snapshot("tx1");

    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("alice"), common::put("alice", 100));
    common::commit_transaction(&storage, &tx).unwrap();

    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.state, TransactionState::Committed);
    assert_eq!(record.version, 1);
    assert_eq!(record.transaction_id, "tx1");
    assert_eq!(common::balance_of(&record), 100);
    // The commit put keeps the prepare timestamp and adds its own.
    assert_eq!(record.prepared_at, common::PREPARED_AT);
    assert_eq!(record.committed_at, Some(common::COMMITTED_AT));
    assert!(record.before_image.is_none());
}

#[test]
fn update_bumps_version_and_overlays_columns() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);
    let tx = snapshot("tx1");

    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("alice"), common::put("alice", 250));
    common::commit_transaction(&storage, &tx).unwrap();

    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.version, 4);
    assert_eq!(common::balance_of(&record), 250);
    assert_eq!(record.state, TransactionState::Committed);
}

#[test]
fn prepared_record_carries_the_before_image() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);
    let tx = snapshot("tx1");

    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("alice"), common::put("alice", 250));
    common::prepare(&storage, &tx).unwrap();

    // Between prepare and commit the record is claimed, undo intact.
    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.state, TransactionState::Prepared);
    assert_eq!(record.version, 4);
    assert!(record.committed_at.is_none());
    let image = record.before_image.as_ref().unwrap();
    assert_eq!(image.version, 3);
    assert_eq!(common::balance_of(image), 100);
}

#[test]
fn commit_clears_the_before_image() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);
    let tx = snapshot("tx1");

    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_write_set(common::key("alice"), common::put("alice", 250));
    common::commit_transaction(&storage, &tx).unwrap();

    let record = storage.get_record(&common::key("alice")).unwrap();
    assert!(record.before_image.is_none());
}

#[test]
fn delete_prepares_a_tombstone_then_removes_at_commit() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);
    let tx = snapshot("tx1");

    common::read(&storage, &tx, &common::key("alice")).unwrap();
    tx.put_into_delete_set(common::key("alice"), common::delete("alice"));

    common::prepare(&storage, &tx).unwrap();
    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.state, TransactionState::Deleted);
    assert_eq!(record.before_image.as_ref().unwrap().version, 3);

    common::commit(&storage, &tx).unwrap();
    assert!(storage.get_record(&common::key("alice")).is_none());
}

#[test]
fn concurrent_writers_conflict_at_prepare() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    let tx1 = snapshot("tx1");
    let tx2 = snapshot("tx2");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    common::read(&storage, &tx2, &common::key("alice")).unwrap();
    tx1.put_into_write_set(common::key("alice"), common::put("alice", 150));
    tx2.put_into_write_set(common::key("alice"), common::put("alice", 175));

    common::prepare(&storage, &tx1).unwrap();

    // The record is already claimed at version 4; tx2's guard expects 3.
    let err = common::prepare(&storage, &tx2).unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet { .. }));
    assert!(err.is_conflict());

    common::commit(&storage, &tx1).unwrap();
    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.transaction_id, "tx1");
    assert_eq!(common::balance_of(&record), 150);
}

#[test]
fn two_blind_inserts_race_and_one_wins() {
    let storage = MemoryStorage::new();

    let tx1 = snapshot("tx1");
    let tx2 = snapshot("tx2");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    common::read(&storage, &tx2, &common::key("alice")).unwrap();
    tx1.put_into_write_set(common::key("alice"), common::put("alice", 1));
    tx2.put_into_write_set(common::key("alice"), common::put("alice", 2));

    common::prepare(&storage, &tx1).unwrap();
    let err = common::prepare(&storage, &tx2).unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet { .. }));

    common::commit(&storage, &tx1).unwrap();
    assert_eq!(common::balance_of(&storage.get_record(&common::key("alice")).unwrap()), 1);
}

#[test]
fn commit_is_guarded_against_foreign_claims() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 3);

    let tx1 = snapshot("tx1");
    common::read(&storage, &tx1, &common::key("alice")).unwrap();
    tx1.put_into_write_set(common::key("alice"), common::put("alice", 150));
    common::prepare(&storage, &tx1).unwrap();

    // A commit attempt by a transaction that never claimed the record
    // must not flip it.
    let tx2 = snapshot("tx2");
    tx2.put_into_read_set(common::key("alice"), Some(common::balance_record(100, 3)))
        .unwrap();
    tx2.put_into_write_set(common::key("alice"), common::put("alice", 999));
    let err = common::commit(&storage, &tx2).unwrap_err();
    assert!(matches!(err, Error::ConditionNotMet { .. }));

    let record = storage.get_record(&common::key("alice")).unwrap();
    assert_eq!(record.transaction_id, "tx1");
    assert_eq!(record.state, TransactionState::Prepared);
}

#[test]
fn multi_record_transfer_commits_atomically_in_effect() {
    let storage = MemoryStorage::new();
    common::seed(&storage, "alice", 100, 1);
    common::seed(&storage, "bob", 50, 1);

    let tx = snapshot("tx1");
    let alice = common::read(&storage, &tx, &common::key("alice")).unwrap().unwrap();
    let bob = common::read(&storage, &tx, &common::key("bob")).unwrap().unwrap();
    let amount = 30;
    tx.put_into_write_set(
        common::key("alice"),
        common::put("alice", common::balance_of(&alice) - amount),
    );
    tx.put_into_write_set(
        common::key("bob"),
        common::put("bob", common::balance_of(&bob) + amount),
    );
    common::commit_transaction(&storage, &tx).unwrap();

    assert_eq!(common::balance_of(&storage.get_record(&common::key("alice")).unwrap()), 70);
    assert_eq!(common::balance_of(&storage.get_record(&common::key("bob")).unwrap()), 80);
}
