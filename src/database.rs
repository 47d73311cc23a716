use std::ffi::CString;
use std::mem;
use std::ptr;

use lmdb_sys as ffi;
use log::debug;

use crate::constants::{DbFlags, DB_OPEN_ATTEMPTS};
use crate::error::{lmdb_result, Error, Result};
use crate::transaction::Transaction;
use crate::types::Stat;

/// A named, ordered key range within an environment.
///
/// Immutable once opened. The handle stays valid across transactions after
/// the transaction that opened it commits; a handle opened inside an
/// aborted transaction must be discarded.
#[derive(Debug, Clone)]
pub struct Database {
    /// Engine keyspace identifier
    dbi: ffi::MDB_dbi,
    /// Flags the keyspace was opened with
    flags: DbFlags,
    /// Keyspace name; `None` is the default keyspace
    name: Option<String>,
}

impl Database {
    /// Open a keyspace by name, negotiating its creation flags.
    ///
    /// The engine insists on the flag set a keyspace was created under, and
    /// that set is not always knowable in advance: another process or an
    /// older version may have created it. This walks a fixed, ordered list
    /// of flag combinations (default, duplicate keys, reverse key order,
    /// fixed-size duplicates, reverse duplicate order) and stops at the
    /// first one the engine accepts; if every combination is rejected the
    /// last attempt's error is surfaced.
    ///
    /// Flags negotiated once are cached on the environment and tried first
    /// when the same name is re-opened during this process run.
    ///
    /// With `create = false` a nonexistent keyspace fails with
    /// [`Error::DbNotFound`] immediately; existence does not depend on
    /// flags, so there is nothing to negotiate.
    pub fn open(txn: &Transaction<'_>, name: Option<&str>, create: bool) -> Result<Database> {
        if create && txn.is_readonly() {
            return Err(Error::TxnReadOnly);
        }

        let env = txn.env();
        let cache_key = name.unwrap_or("");

        if let Some(cached) = env.cached_db_flags(cache_key) {
            let flags = if create { cached | DbFlags::CREATE } else { cached };
            match Database::open_with_flags(txn, name, flags) {
                Ok(db) => return Ok(db),
                Err(err @ Error::DbNotFound(_)) => return Err(err),
                // The keyspace changed under us; renegotiate below.
                Err(_) => {}
            }
        }

        let mut last_err = Error::Incompatible;
        for attempt in DB_OPEN_ATTEMPTS {
            let flags = if create { attempt | DbFlags::CREATE } else { attempt };
            match Database::open_with_flags(txn, name, flags) {
                Ok(db) => {
                    env.cache_db_flags(cache_key, db.flags);
                    return Ok(db);
                }
                Err(err @ Error::DbNotFound(_)) => return Err(err),
                Err(err) => {
                    debug!("keyspace {:?} rejected flags {:?}: {}", cache_key, attempt, err);
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Open a keyspace with an explicit flag set.
    ///
    /// The lower-level open that [`Database::open`] negotiates through, for
    /// callers that know how the keyspace was created. Pass
    /// [`DbFlags::CREATE`] to create it if absent.
    pub fn open_with_flags(
        txn: &Transaction<'_>,
        name: Option<&str>,
        flags: DbFlags,
    ) -> Result<Database> {
        if flags.contains(DbFlags::CREATE) && txn.is_readonly() {
            return Err(Error::TxnReadOnly);
        }

        // The empty string addresses the default keyspace, same as None.
        let name = match name {
            Some("") => None,
            other => other,
        };
        let name_c = match name {
            Some(n) => Some(CString::new(n).map_err(|_| Error::BadValSize)?),
            None => None,
        };
        let name_ptr = name_c.as_ref().map_or(ptr::null(), |n| n.as_ptr());

        let mut dbi: ffi::MDB_dbi = 0;
        let rc = unsafe { ffi::mdb_dbi_open(txn.txn_ptr(), name_ptr, flags.bits(), &mut dbi) };
        match rc {
            0 => Ok(Database {
                dbi,
                flags: flags.difference(DbFlags::CREATE),
                name: name.map(ToOwned::to_owned),
            }),
            ffi::MDB_NOTFOUND => Err(Error::DbNotFound(name.unwrap_or("").to_owned())),
            rc => Err(Error::from_err_code(rc)),
        }
    }

    /// Get statistics for this keyspace
    pub fn stat(&self, txn: &Transaction<'_>) -> Result<Stat> {
        let mut stat: ffi::MDB_stat = unsafe { mem::zeroed() };
        lmdb_result(unsafe { ffi::mdb_stat(txn.txn_ptr(), self.dbi, &mut stat) })?;
        Ok(Stat::from_ffi(&stat))
    }

    /// The flags this keyspace was opened under
    pub fn flags(&self) -> DbFlags {
        self.flags
    }

    /// The keyspace name; `None` is the default keyspace
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn dbi(&self) -> ffi::MDB_dbi {
        self.dbi
    }
}
