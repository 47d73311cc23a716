use lazy_static::lazy_static;
use lmdb_sys as ffi;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::fs;
use std::mem;
use std::os::raw::c_int;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Mutex;

use crate::constants::{
    DbFlags, EnvFlags, DEFAULT_MAP_SIZE, DEFAULT_MAX_DBS, DEFAULT_MAX_READERS, DEFAULT_MODE,
};
use crate::error::{lmdb_result, Error, Result};
use crate::transaction::Transaction;
use crate::types::{EnvInfo, Stat};

lazy_static! {
    /// Canonical paths of environments currently open in this process.
    /// The engine does not tolerate the same directory being mapped twice
    /// from one process, so `open` reserves the path here first.
    static ref OPEN_PATHS: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

/// Capacity and mode settings applied when opening an environment.
#[derive(Debug, Clone)]
pub struct EnvOptions {
    /// Size of the address-space reservation for the memory map
    pub map_size: usize,
    /// Maximum number of named keyspaces
    pub max_dbs: u32,
    /// Maximum number of concurrent reader slots
    pub max_readers: u32,
    /// Open the environment without write access
    pub read_only: bool,
    /// Additional engine flags (durability tuning and the like)
    pub flags: EnvFlags,
}

impl Default for EnvOptions {
    fn default() -> EnvOptions {
        EnvOptions {
            map_size: DEFAULT_MAP_SIZE,
            max_dbs: DEFAULT_MAX_DBS,
            max_readers: DEFAULT_MAX_READERS,
            read_only: false,
            flags: EnvFlags::empty(),
        }
    }
}

/// An open instance of the storage engine bound to a directory.
///
/// The environment is the unit of shared state: it may be used from several
/// threads, and all transactions, keyspaces, and cursors derive from it.
/// `close` is the primary teardown path and is idempotent; dropping an
/// environment that was never closed releases the mapping as a backstop.
#[derive(Debug)]
pub struct Environment {
    /// Raw engine handle; null once closed
    env: *mut ffi::MDB_env,
    /// Canonical path of the environment directory
    path: PathBuf,
    /// Environment was opened without write access
    read_only: bool,
    /// Serializes read-write transactions within this process.
    /// Held for the whole lifetime of a write transaction.
    write_lock: Mutex<()>,
    /// Flags negotiated per keyspace name, reused on re-open
    db_flags: Mutex<HashMap<String, DbFlags>>,
}

// The engine handle is free-threaded; per-transaction state lives in
// Transaction, which is neither Send nor Sync.
unsafe impl Send for Environment {}
unsafe impl Sync for Environment {}

impl Environment {
    /// Open the environment at `path`, creating the directory if absent.
    ///
    /// At most one environment per directory may be open in a process at a
    /// time; a second open fails with [`Error::EnvAlreadyOpen`] until the
    /// first is closed.
    pub fn open<P: AsRef<Path>>(path: P, options: &EnvOptions) -> Result<Environment> {
        let path = path.as_ref();
        if options.map_size == 0 {
            return Err(Error::EnvInvalidConfig("map_size must be non-zero".into()));
        }

        fs::create_dir_all(path)?;
        let canonical = path.canonicalize()?;

        // Reserve the path before touching the engine so a concurrent open
        // of the same directory cannot race past the check.
        {
            let mut open_paths = OPEN_PATHS.lock().unwrap_or_else(|e| e.into_inner());
            if !open_paths.insert(canonical.clone()) {
                return Err(Error::EnvAlreadyOpen(canonical));
            }
        }

        let read_only = options.read_only || options.flags.contains(EnvFlags::RDONLY);
        match Environment::open_engine(&canonical, options, read_only) {
            Ok(env) => {
                debug!("opened environment at {}", canonical.display());
                Ok(Environment {
                    env,
                    path: canonical,
                    read_only,
                    write_lock: Mutex::new(()),
                    db_flags: Mutex::new(HashMap::new()),
                })
            }
            Err(err) => {
                let mut open_paths = OPEN_PATHS.lock().unwrap_or_else(|e| e.into_inner());
                open_paths.remove(&canonical);
                Err(err)
            }
        }
    }

    /// Create and configure the raw engine handle.
    fn open_engine(
        path: &Path,
        options: &EnvOptions,
        read_only: bool,
    ) -> Result<*mut ffi::MDB_env> {
        let path_c = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| Error::EnvInvalidConfig("path contains a NUL byte".into()))?;

        let mut env: *mut ffi::MDB_env = ptr::null_mut();
        lmdb_result(unsafe { ffi::mdb_env_create(&mut env) })?;

        let configured = (|| {
            unsafe {
                lmdb_result(ffi::mdb_env_set_mapsize(env, options.map_size))?;
                lmdb_result(ffi::mdb_env_set_maxdbs(env, options.max_dbs))?;
                lmdb_result(ffi::mdb_env_set_maxreaders(env, options.max_readers))?;

                let mut flags = options.flags.bits();
                if read_only {
                    flags |= ffi::MDB_RDONLY;
                }
                lmdb_result(ffi::mdb_env_open(env, path_c.as_ptr(), flags, DEFAULT_MODE))?;
            }
            Ok(())
        })();

        match configured {
            Ok(()) => Ok(env),
            Err(err) => {
                unsafe { ffi::mdb_env_close(env) };
                Err(err)
            }
        }
    }

    /// Begin a read-write transaction.
    ///
    /// Blocks until any current writer against this environment finishes;
    /// writers are strictly serialized. Beginning a second write transaction
    /// from the thread that already holds one deadlocks, so serialize
    /// writers per execution context.
    pub fn begin_txn(&self) -> Result<Transaction<'_>> {
        if self.read_only {
            return Err(Error::EnvReadOnly);
        }
        let guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        Transaction::new(self, false, Some(guard))
    }

    /// Begin a read-only transaction against a consistent snapshot.
    ///
    /// Readers never block writers and are unaffected by them. The engine
    /// allots one reader slot per thread, so at most one read transaction
    /// may be live on a given thread at a time.
    pub fn begin_ro_txn(&self) -> Result<Transaction<'_>> {
        Transaction::new(self, true, None)
    }

    /// Get statistics for the environment's default keyspace
    pub fn stat(&self) -> Result<Stat> {
        let env = self.env_ptr()?;
        let mut stat: ffi::MDB_stat = unsafe { mem::zeroed() };
        lmdb_result(unsafe { ffi::mdb_env_stat(env, &mut stat) })?;
        Ok(Stat::from_ffi(&stat))
    }

    /// Get runtime information about the environment
    pub fn info(&self) -> Result<EnvInfo> {
        let env = self.env_ptr()?;
        let mut info: ffi::MDB_envinfo = unsafe { mem::zeroed() };
        lmdb_result(unsafe { ffi::mdb_env_info(env, &mut info) })?;
        Ok(EnvInfo::from_ffi(&info))
    }

    /// Flush the data buffers to disk.
    ///
    /// Committed data is always written to the file, but the operating
    /// system may keep it buffered. With `force` the flush is synchronous
    /// and durable; without it the flush honors the `NOSYNC`/`MAPASYNC`
    /// flags the environment was opened with.
    pub fn sync(&self, force: bool) -> Result<()> {
        if self.read_only {
            return Err(Error::EnvReadOnly);
        }
        let env = self.env_ptr()?;
        lmdb_result(unsafe { ffi::mdb_env_sync(env, force as c_int) })
    }

    /// Close the environment and release the memory map.
    ///
    /// Idempotent. All transactions and cursors derived from this
    /// environment must already be finished; the borrow checker enforces
    /// this. The directory becomes openable again afterwards.
    pub fn close(&mut self) {
        if self.env.is_null() {
            return;
        }
        debug!("closing environment at {}", self.path.display());
        unsafe { ffi::mdb_env_close(self.env) };
        self.env = ptr::null_mut();

        let mut open_paths = OPEN_PATHS.lock().unwrap_or_else(|e| e.into_inner());
        open_paths.remove(&self.path);
    }

    /// The canonical path the environment was opened at
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the environment was opened read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Engine library version
    pub fn version() -> (i32, i32, i32) {
        let mut major: c_int = 0;
        let mut minor: c_int = 0;
        let mut patch: c_int = 0;
        unsafe { ffi::mdb_version(&mut major, &mut minor, &mut patch) };
        (major, minor, patch)
    }

    /// Engine library version as a display string
    pub fn version_string() -> String {
        let ptr = unsafe { ffi::mdb_version(ptr::null_mut(), ptr::null_mut(), ptr::null_mut()) };
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    /// The raw engine handle, or `EnvClosed` after `close`
    pub(crate) fn env_ptr(&self) -> Result<*mut ffi::MDB_env> {
        if self.env.is_null() {
            Err(Error::EnvClosed)
        } else {
            Ok(self.env)
        }
    }

    /// Flags previously negotiated for a keyspace name this run
    pub(crate) fn cached_db_flags(&self, name: &str) -> Option<DbFlags> {
        let cache = self.db_flags.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(name).copied()
    }

    /// Remember the negotiated flags for a keyspace name
    pub(crate) fn cache_db_flags(&self, name: &str, flags: DbFlags) {
        let mut cache = self.db_flags.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(name.to_owned(), flags);
    }

    /// Forget a keyspace's negotiated flags after it is dropped
    pub(crate) fn forget_db_flags(&self, name: &str) {
        let mut cache = self.db_flags.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(name);
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        self.close();
    }
}
