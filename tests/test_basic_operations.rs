use lmstore::{Database, DbFlags, EnvOptions, Environment, Error, WriteFlags};
use tempfile::TempDir;

// Common test setup
fn setup_test_env() -> (TempDir, Environment) {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::open(temp_dir.path(), &EnvOptions::default()).unwrap();
    (temp_dir, env)
}

#[test]
fn test_keyspace_open() {
    let (_dir, env) = setup_test_env();
    let txn = env.begin_txn().unwrap();

    // The default keyspace always exists
    let db = txn.open_db(None, false).unwrap();
    assert!(db.flags().is_empty());
    assert_eq!(db.name(), None);

    // Named keyspaces are created on demand
    let db = txn.open_db(Some("testdb"), true).unwrap();
    assert_eq!(db.name(), Some("testdb"));
    txn.commit().unwrap();
}

#[test]
fn test_basic_put_get() {
    let (_dir, env) = setup_test_env();
    let mut txn = env.begin_txn().unwrap();
    let db = txn.open_db(None, false).unwrap();

    let key = b"test_key";
    let value = b"test_value";

    txn.put(&db, key, value, WriteFlags::empty()).unwrap();
    let result = txn.get(&db, key).unwrap();

    assert_eq!(result.unwrap(), value);
}

#[test]
fn test_delete_operations() {
    let (_dir, env) = setup_test_env();
    let mut txn = env.begin_txn().unwrap();
    let db = txn.open_db(None, false).unwrap();

    let key = b"delete_key";
    let value = b"delete_value";

    txn.put(&db, key, value, WriteFlags::empty()).unwrap();
    assert!(txn.get(&db, key).unwrap().is_some());

    // First delete removes the pair, second reports it absent
    assert!(txn.del(&db, key).unwrap());
    assert!(txn.get(&db, key).unwrap().is_none());
    assert!(!txn.del(&db, key).unwrap());
}

#[test]
fn test_keyspace_stats() {
    let (_dir, env) = setup_test_env();
    let mut txn = env.begin_txn().unwrap();
    let db = txn.open_db(None, false).unwrap();

    let stats = db.stat(&txn).unwrap();
    assert_eq!(stats.entries, 0);

    for i in 0..5 {
        let key = format!("key_{}", i);
        let value = format!("value_{}", i);
        txn.put(&db, key.as_bytes(), value.as_bytes(), WriteFlags::empty())
            .unwrap();
    }

    let stats = db.stat(&txn).unwrap();
    assert_eq!(stats.entries, 5);
    assert!(stats.page_size > 0);
}

#[test]
fn test_error_handling() {
    let (_dir, env) = setup_test_env();
    let mut txn = env.begin_txn().unwrap();
    let db = txn.open_db(None, false).unwrap();

    // A missing key is an ordinary outcome, not an error
    let result = txn.get(&db, b"nonexistent_key").unwrap();
    assert!(result.is_none());

    // NOOVERWRITE reports an existing key as KeyExist
    let key = b"unique_key";
    txn.put(&db, key, b"value1", WriteFlags::empty()).unwrap();
    let result = txn.put(&db, key, b"value2", WriteFlags::NOOVERWRITE);
    assert!(matches!(result, Err(Error::KeyExist)));
}

#[test]
fn test_transaction_isolation() {
    let (_dir, env) = setup_test_env();

    // Register the keyspace first so both transactions can open it
    let txn = env.begin_txn().unwrap();
    let db = txn.open_db(Some("shared"), true).unwrap();
    txn.commit().unwrap();

    // Uncommitted writes must not be visible to a concurrent reader
    let mut write_txn = env.begin_txn().unwrap();
    write_txn
        .put(&db, b"key", b"value", WriteFlags::empty())
        .unwrap();

    let read_txn = env.begin_ro_txn().unwrap();
    assert!(read_txn.get(&db, b"key").unwrap().is_none());
    read_txn.abort();

    // After commit a fresh reader observes the write
    write_txn.commit().unwrap();
    let read_txn = env.begin_ro_txn().unwrap();
    assert_eq!(read_txn.get(&db, b"key").unwrap(), Some(&b"value"[..]));
}

#[test]
fn test_explicit_open_with_flags() {
    let (_dir, env) = setup_test_env();
    let txn = env.begin_txn().unwrap();

    let db =
        Database::open_with_flags(&txn, Some("explicit"), DbFlags::DUPSORT | DbFlags::CREATE)
            .unwrap();
    assert!(db.flags().contains(DbFlags::DUPSORT));
    // CREATE is an open-time request, not a property of the keyspace
    assert!(!db.flags().contains(DbFlags::CREATE));
    txn.commit().unwrap();
}

// The end-to-end scenario: write under one transaction, observe the commit
// from a fresh snapshot, and walk the keyspace in order.
#[test]
fn test_example_scenario() {
    let (_dir, env) = setup_test_env();

    let mut txn = env.begin_txn().unwrap();
    let users = txn.open_db(Some("users"), true).unwrap();
    txn.put(&users, b"alice", b"1", WriteFlags::empty()).unwrap();
    txn.commit().unwrap();

    let txn = env.begin_ro_txn().unwrap();
    assert_eq!(txn.get(&users, b"alice").unwrap(), Some(&b"1"[..]));

    let mut cursor = txn.cursor(&users).unwrap();
    let (key, value) = {
        let entry = cursor.first().unwrap().unwrap();
        (entry.0.to_vec(), entry.1.to_vec())
    };
    assert_eq!(key, b"alice");
    assert_eq!(value, b"1");
    assert!(cursor.next().unwrap().is_none());

    cursor.close();
    drop(cursor);
    txn.abort();
}
