use lmdb_sys as ffi;
use log::{debug, trace};
use std::ptr;
use std::sync::MutexGuard;

use crate::constants::WriteFlags;
use crate::cursor::Cursor;
use crate::database::Database;
use crate::env::Environment;
use crate::error::{lmdb_result, Error, Result};
use crate::value::{empty_val, slice_to_val, val_to_slice};

/// An atomic unit of work, read-only or read-write, against one environment.
///
/// A transaction borrows its environment, so the environment cannot be
/// closed while the transaction is live. `commit` and `abort` consume the
/// transaction; further use of an ended transaction is a compile error
/// rather than a runtime fault. A transaction that is dropped without being
/// ended explicitly is aborted as a backstop.
///
/// Transactions hold a raw engine handle and are tied to the thread that
/// began them; they are neither `Send` nor `Sync`.
#[derive(Debug)]
pub struct Transaction<'env> {
    /// Raw engine handle; null once committed or aborted
    txn: *mut ffi::MDB_txn,
    /// The environment this transaction runs against
    env: &'env Environment,
    /// Transaction was begun read-only
    readonly: bool,
    /// Writers hold the environment's write lock for their whole lifetime
    _write_guard: Option<MutexGuard<'env, ()>>,
}

impl<'env> Transaction<'env> {
    pub(crate) fn new(
        env: &'env Environment,
        readonly: bool,
        write_guard: Option<MutexGuard<'env, ()>>,
    ) -> Result<Transaction<'env>> {
        let env_ptr = env.env_ptr()?;
        let flags = if readonly { ffi::MDB_RDONLY } else { 0 };

        let mut txn: *mut ffi::MDB_txn = ptr::null_mut();
        lmdb_result(unsafe { ffi::mdb_txn_begin(env_ptr, ptr::null_mut(), flags, &mut txn) })?;

        Ok(Transaction {
            txn,
            env,
            readonly,
            _write_guard: write_guard,
        })
    }

    /// The environment this transaction runs against
    pub fn env(&self) -> &'env Environment {
        self.env
    }

    /// Whether the transaction was begun read-only
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub(crate) fn txn_ptr(&self) -> *mut ffi::MDB_txn {
        self.txn
    }

    /// Open a keyspace by name, negotiating its flags.
    ///
    /// Convenience for [`Database::open`]. `None` or the empty string
    /// addresses the default keyspace.
    pub fn open_db(&self, name: Option<&str>, create: bool) -> Result<Database> {
        Database::open(self, name, create)
    }

    /// Look up a key. A missing key is `Ok(None)`, not an error.
    pub fn get<'txn>(&'txn self, db: &Database, key: &[u8]) -> Result<Option<&'txn [u8]>> {
        let mut key_val = slice_to_val(key);
        let mut data_val = empty_val();

        let rc = unsafe { ffi::mdb_get(self.txn, db.dbi(), &mut key_val, &mut data_val) };
        match rc {
            0 => Ok(Some(unsafe { val_to_slice(&data_val) })),
            ffi::MDB_NOTFOUND => Ok(None),
            rc => Err(Error::from_err_code(rc)),
        }
    }

    /// Store a key/value pair.
    ///
    /// With [`WriteFlags::NOOVERWRITE`] an existing key fails with
    /// [`Error::KeyExist`]; under duplicate-keys keyspaces a plain put adds
    /// another value for the key.
    pub fn put(&mut self, db: &Database, key: &[u8], data: &[u8], flags: WriteFlags) -> Result<()> {
        if self.readonly {
            return Err(Error::TxnReadOnly);
        }
        trace!("put {} bytes under {} byte key", data.len(), key.len());

        let mut key_val = slice_to_val(key);
        let mut data_val = slice_to_val(data);
        lmdb_result(unsafe {
            ffi::mdb_put(self.txn, db.dbi(), &mut key_val, &mut data_val, flags.bits())
        })
    }

    /// Delete a key. Returns `false` when the key was absent; deleting a
    /// missing key is not an error.
    pub fn del(&mut self, db: &Database, key: &[u8]) -> Result<bool> {
        if self.readonly {
            return Err(Error::TxnReadOnly);
        }

        let mut key_val = slice_to_val(key);
        let rc = unsafe { ffi::mdb_del(self.txn, db.dbi(), &mut key_val, ptr::null_mut()) };
        match rc {
            0 => Ok(true),
            ffi::MDB_NOTFOUND => Ok(false),
            rc => Err(Error::from_err_code(rc)),
        }
    }

    /// Remove every entry from a keyspace, keeping the keyspace itself
    /// registered and openable.
    pub fn clear_db(&mut self, db: &Database) -> Result<()> {
        if self.readonly {
            return Err(Error::TxnReadOnly);
        }
        debug!("clearing keyspace {:?}", db.name().unwrap_or(""));
        lmdb_result(unsafe { ffi::mdb_drop(self.txn, db.dbi(), 0) })
    }

    /// Delete a keyspace and everything in it, consuming the handle.
    pub fn drop_db(&mut self, db: Database) -> Result<()> {
        if self.readonly {
            return Err(Error::TxnReadOnly);
        }
        debug!("dropping keyspace {:?}", db.name().unwrap_or(""));
        lmdb_result(unsafe { ffi::mdb_drop(self.txn, db.dbi(), 1) })?;
        self.env.forget_db_flags(db.name().unwrap_or(""));
        Ok(())
    }

    /// Open a cursor over a keyspace.
    ///
    /// The cursor borrows this transaction: ending the transaction while
    /// the cursor is alive is a compile error, which is how cursor
    /// invalidation on commit/abort is enforced.
    pub fn cursor<'txn>(&'txn self, db: &Database) -> Result<Cursor<'txn>> {
        Cursor::new(self, db)
    }

    /// Atomically persist all writes made in this transaction.
    ///
    /// On failure the transaction is already finished as far as the engine
    /// is concerned: the error is fatal for this transaction and the caller
    /// must begin a new one to retry.
    pub fn commit(mut self) -> Result<()> {
        let rc = unsafe { ffi::mdb_txn_commit(self.txn) };
        // The engine frees the handle on commit, success or failure.
        self.txn = ptr::null_mut();
        lmdb_result(rc)
    }

    /// Discard all writes made since `begin`. Always succeeds.
    pub fn abort(mut self) {
        unsafe { ffi::mdb_txn_abort(self.txn) };
        self.txn = ptr::null_mut();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.txn.is_null() {
            debug!("aborting transaction left open at drop");
            unsafe { ffi::mdb_txn_abort(self.txn) };
        }
    }
}
