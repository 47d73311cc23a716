use lmstore::{Database, DbFlags, EnvOptions, Environment, Error, WriteFlags};
use tempfile::TempDir;

// Common test setup
fn setup_test_env() -> (TempDir, Environment) {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::open(temp_dir.path(), &EnvOptions::default()).unwrap();
    (temp_dir, env)
}

fn populate(env: &Environment, name: &str, keys: &[&[u8]]) -> Database {
    let mut txn = env.begin_txn().unwrap();
    let db = txn.open_db(Some(name), true).unwrap();
    for key in keys {
        txn.put(&db, key, b"x", WriteFlags::empty()).unwrap();
    }
    txn.commit().unwrap();
    db
}

#[test]
fn test_cursor_order() {
    let (_dir, env) = setup_test_env();
    // Inserted out of order; traversal must come back sorted
    let db = populate(&env, "ordered", &[b"delta", b"alpha", b"charlie", b"bravo"]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();

    let mut keys = Vec::new();
    if let Some((key, _)) = cursor.first().unwrap() {
        keys.push(key.to_vec());
    }
    while let Some((key, _)) = cursor.next().unwrap() {
        keys.push(key.to_vec());
    }

    assert_eq!(
        keys,
        vec![
            b"alpha".to_vec(),
            b"bravo".to_vec(),
            b"charlie".to_vec(),
            b"delta".to_vec(),
        ]
    );
}

#[test]
fn test_cursor_last_and_prev() {
    let (_dir, env) = setup_test_env();
    let db = populate(&env, "ordered", &[b"alpha", b"bravo", b"charlie"]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();

    let last = cursor.last().unwrap().unwrap().0.to_vec();
    assert_eq!(last, b"charlie");
    let prev = cursor.prev().unwrap().unwrap().0.to_vec();
    assert_eq!(prev, b"bravo");

    // Stepping past the first entry is end-of-sequence, not an error
    cursor.prev().unwrap();
    assert!(cursor.prev().unwrap().is_none());
}

#[test]
fn test_cursor_get_current() {
    let (_dir, env) = setup_test_env();
    let db = populate(&env, "ordered", &[b"alpha", b"bravo"]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();

    // Unpositioned cursor has no current entry
    assert!(cursor.get_current().unwrap().is_none());

    cursor.first().unwrap();
    let current = cursor.get_current().unwrap().unwrap().0.to_vec();
    assert_eq!(current, b"alpha");

    // get_current does not move the position
    let again = cursor.get_current().unwrap().unwrap().0.to_vec();
    assert_eq!(again, b"alpha");
}

#[test]
fn test_cursor_empty_keyspace() {
    let (_dir, env) = setup_test_env();
    let db = populate(&env, "empty", &[]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();

    assert!(cursor.first().unwrap().is_none());
    assert!(cursor.last().unwrap().is_none());
    assert!(cursor.next().unwrap().is_none());
}

#[test]
fn test_cursor_seek() {
    let (_dir, env) = setup_test_env();
    let db = populate(&env, "ordered", &[b"alpha", b"bravo", b"charlie"]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();

    let hit = cursor.seek(b"bravo").unwrap().unwrap().0.to_vec();
    assert_eq!(hit, b"bravo");
    assert!(cursor.seek(b"bogus").unwrap().is_none());

    // Range positioning lands on the first key at or after the probe
    let near = cursor.seek_range(b"b").unwrap().unwrap().0.to_vec();
    assert_eq!(near, b"bravo");
    assert!(cursor.seek_range(b"zzz").unwrap().is_none());
}

#[test]
fn test_cursor_reverse_key_order() {
    let (_dir, env) = setup_test_env();

    // Simulate a keyspace created elsewhere with reverse key comparison
    let mut txn = env.begin_txn().unwrap();
    let db = Database::open_with_flags(
        &txn,
        Some("reversed"),
        DbFlags::REVERSEKEY | DbFlags::CREATE,
    )
    .unwrap();
    for key in [&b"az"[..], b"by", b"cx"] {
        txn.put(&db, key, b"x", WriteFlags::empty()).unwrap();
    }
    txn.commit().unwrap();

    // Negotiation discovers the reverse-key layout without being told
    let txn = env.begin_ro_txn().unwrap();
    let db = txn.open_db(Some("reversed"), false).unwrap();
    assert!(db.flags().contains(DbFlags::REVERSEKEY));

    let mut cursor = txn.cursor(&db).unwrap();
    let mut keys = Vec::new();
    if let Some((key, _)) = cursor.first().unwrap() {
        keys.push(key.to_vec());
    }
    while let Some((key, _)) = cursor.next().unwrap() {
        keys.push(key.to_vec());
    }

    // Keys compare from their last byte backwards
    assert_eq!(keys, vec![b"cx".to_vec(), b"by".to_vec(), b"az".to_vec()]);
}

#[test]
fn test_cursor_duplicate_values() {
    let (_dir, env) = setup_test_env();

    let mut txn = env.begin_txn().unwrap();
    let db = Database::open_with_flags(&txn, Some("tags"), DbFlags::DUPSORT | DbFlags::CREATE)
        .unwrap();
    txn.put(&db, b"post", b"rust", WriteFlags::empty()).unwrap();
    txn.put(&db, b"post", b"storage", WriteFlags::empty()).unwrap();

    let mut cursor = txn.cursor(&db).unwrap();
    cursor.seek(b"post").unwrap().unwrap();
    assert_eq!(cursor.count().unwrap(), 2);

    // Duplicates come back in value order under the same key
    let first = cursor.get_current().unwrap().unwrap().1.to_vec();
    assert_eq!(first, b"rust");
    let second = cursor.next().unwrap().unwrap().1.to_vec();
    assert_eq!(second, b"storage");

    drop(cursor);
    txn.commit().unwrap();
}

#[test]
fn test_cursor_close_idempotent() {
    let (_dir, env) = setup_test_env();
    let db = populate(&env, "ordered", &[b"alpha"]);

    let txn = env.begin_ro_txn().unwrap();
    let mut cursor = txn.cursor(&db).unwrap();
    cursor.first().unwrap();

    cursor.close();
    cursor.close();

    // Operations on a closed cursor report the state instead of crashing
    assert!(matches!(cursor.first(), Err(Error::CursorClosed)));
    assert!(matches!(cursor.count(), Err(Error::CursorClosed)));
}
