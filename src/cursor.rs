use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use libc::EINVAL;
use lmdb_sys as ffi;

use crate::database::Database;
use crate::error::{lmdb_result, Error, Result};
use crate::transaction::Transaction;
use crate::value::{empty_val, slice_to_val, val_to_slice};

/// Ordered, positionable iteration over one keyspace within one transaction.
///
/// Traversal follows the keyspace's negotiated comparison order:
/// lexicographic on raw bytes by default, reversed when the reverse-key flag
/// was negotiated. Positioning past either end returns `None`, the
/// end-of-sequence outcome.
///
/// The cursor borrows its transaction, so it cannot outlive a commit or
/// abort. `close` is idempotent; dropping an unclosed cursor closes it.
#[derive(Debug)]
pub struct Cursor<'txn> {
    /// Raw engine handle; `None` once closed
    cursor: Option<NonNull<ffi::MDB_cursor>>,
    _txn: PhantomData<&'txn ()>,
}

impl<'txn> Cursor<'txn> {
    pub(crate) fn new(txn: &'txn Transaction<'_>, db: &Database) -> Result<Cursor<'txn>> {
        let mut cursor: *mut ffi::MDB_cursor = ptr::null_mut();
        lmdb_result(unsafe { ffi::mdb_cursor_open(txn.txn_ptr(), db.dbi(), &mut cursor) })?;
        Ok(Cursor {
            cursor: NonNull::new(cursor),
            _txn: PhantomData,
        })
    }

    /// Position at the first entry
    pub fn first(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        self.position(None, ffi::MDB_FIRST)
    }

    /// Position at the last entry
    pub fn last(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        self.position(None, ffi::MDB_LAST)
    }

    /// Advance to the next entry in the keyspace's order
    pub fn next(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        self.position(None, ffi::MDB_NEXT)
    }

    /// Step back to the previous entry
    pub fn prev(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        self.position(None, ffi::MDB_PREV)
    }

    /// The entry at the current position, without moving.
    ///
    /// `None` when the cursor has not been positioned yet.
    pub fn get_current(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        match self.position(None, ffi::MDB_GET_CURRENT) {
            Err(Error::Io(err)) if err.raw_os_error() == Some(EINVAL) => Ok(None),
            other => other,
        }
    }

    /// Position at an exact key, or `None` if the key is absent
    pub fn seek(&mut self, key: &[u8]) -> Result<Option<(&[u8], &[u8])>> {
        self.position(Some(key), ffi::MDB_SET_KEY)
    }

    /// Position at the first key greater than or equal to `key`
    pub fn seek_range(&mut self, key: &[u8]) -> Result<Option<(&[u8], &[u8])>> {
        self.position(Some(key), ffi::MDB_SET_RANGE)
    }

    /// Number of duplicate values stored under the current key.
    ///
    /// Only meaningful for keyspaces negotiated with duplicate keys.
    pub fn count(&self) -> Result<usize> {
        let cursor = self.cursor.ok_or(Error::CursorClosed)?;
        let mut count: usize = 0;
        lmdb_result(unsafe { ffi::mdb_cursor_count(cursor.as_ptr(), &mut count) })?;
        Ok(count)
    }

    /// Close the cursor. Idempotent.
    pub fn close(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            unsafe { ffi::mdb_cursor_close(cursor.as_ptr()) };
        }
    }

    fn position(
        &mut self,
        set_key: Option<&[u8]>,
        op: ffi::MDB_cursor_op,
    ) -> Result<Option<(&[u8], &[u8])>> {
        let cursor = self.cursor.ok_or(Error::CursorClosed)?;

        let mut key_val = match set_key {
            Some(key) => slice_to_val(key),
            None => empty_val(),
        };
        let mut data_val = empty_val();

        let rc = unsafe { ffi::mdb_cursor_get(cursor.as_ptr(), &mut key_val, &mut data_val, op) };
        match rc {
            0 => Ok(Some(unsafe {
                (val_to_slice(&key_val), val_to_slice(&data_val))
            })),
            ffi::MDB_NOTFOUND => Ok(None),
            rc => Err(Error::from_err_code(rc)),
        }
    }
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
