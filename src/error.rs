use std::ffi::CStr;
use std::io;
use std::os::raw::c_int;
use std::path::PathBuf;
use std::result;

use lmdb_sys as ffi;
use thiserror::Error;

/// Custom result type for storage operations
pub type Result<T> = result::Result<T, Error>;

/// Errors surfaced by the binding layer.
///
/// Engine return codes are translated one-to-one; codes without a dedicated
/// variant keep the numeric code together with the engine's detail string.
/// Missing keys are never reported through this type; `get` and `del` model
/// absence as an ordinary outcome.
#[derive(Debug, Error)]
pub enum Error {
    /// Key/data pair already exists
    #[error("key/data pair already exists")]
    KeyExist,
    /// No matching key/data pair found
    #[error("no matching key/data pair found")]
    NotFound,
    /// Requested page not found
    #[error("requested page not found")]
    PageNotFound,
    /// Database file is corrupted
    #[error("database file is corrupted")]
    Corrupted,
    /// Update of meta page failed
    #[error("update of meta page failed")]
    Panic,
    /// Database version mismatch
    #[error("database version mismatch")]
    VersionMismatch,
    /// File is not a valid database file
    #[error("file is not a valid database file")]
    Invalid,
    /// Environment mapsize limit reached
    #[error("environment mapsize limit reached")]
    MapFull,
    /// Environment maxdbs limit reached
    #[error("environment maxdbs limit reached")]
    DbsFull,
    /// Environment maxreaders limit reached
    #[error("environment maxreaders limit reached")]
    ReadersFull,
    /// Thread-local storage keys full
    #[error("thread-local storage keys full")]
    TlsFull,
    /// Transaction has too many dirty pages
    #[error("transaction has too many dirty pages")]
    TxnFull,
    /// Too many open cursors
    #[error("too many open cursors")]
    CursorFull,
    /// Page has not enough space
    #[error("page has not enough space")]
    PageFull,
    /// Database contents grew beyond environment mapsize
    #[error("database contents grew beyond environment mapsize")]
    MapResized,
    /// Operation and keyspace incompatible
    #[error("operation and keyspace incompatible")]
    Incompatible,
    /// Invalid reuse of reader locktable slot
    #[error("invalid reuse of reader locktable slot")]
    BadRslot,
    /// Transaction must abort, has a child, or is invalid
    #[error("transaction must abort, has a child, or is invalid")]
    BadTxn,
    /// Unsupported size of key, keyspace name, or data
    #[error("unsupported size of key, keyspace name, or data")]
    BadValSize,
    /// The specified keyspace handle was changed unexpectedly
    #[error("the keyspace handle was changed unexpectedly")]
    BadDbi,
    /// Another environment is already open at this path in this process
    #[error("environment already open at {}", .0.display())]
    EnvAlreadyOpen(PathBuf),
    /// Environment has been closed
    #[error("environment is closed")]
    EnvClosed,
    /// Environment was opened read-only
    #[error("environment is read-only")]
    EnvReadOnly,
    /// Invalid environment configuration
    #[error("invalid environment configuration: {0}")]
    EnvInvalidConfig(String),
    /// Write operation issued on a read-only transaction
    #[error("write operation in a read-only transaction")]
    TxnReadOnly,
    /// Keyspace does not exist and create was not requested
    #[error("keyspace {0:?} does not exist")]
    DbNotFound(String),
    /// Cursor has been closed
    #[error("cursor is closed")]
    CursorClosed,
    /// Underlying I/O error
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Unrecognized engine error code
    #[error("engine error {0}: {1}")]
    Other(c_int, String),
}

impl Error {
    /// Translate an engine return code into an [`Error`].
    ///
    /// Positive codes are OS errno values passed through by the engine; they
    /// become [`Error::Io`] so the original errno stays observable.
    pub(crate) fn from_err_code(code: c_int) -> Error {
        match code {
            ffi::MDB_KEYEXIST => Error::KeyExist,
            ffi::MDB_NOTFOUND => Error::NotFound,
            ffi::MDB_PAGE_NOTFOUND => Error::PageNotFound,
            ffi::MDB_CORRUPTED => Error::Corrupted,
            ffi::MDB_PANIC => Error::Panic,
            ffi::MDB_VERSION_MISMATCH => Error::VersionMismatch,
            ffi::MDB_INVALID => Error::Invalid,
            ffi::MDB_MAP_FULL => Error::MapFull,
            ffi::MDB_DBS_FULL => Error::DbsFull,
            ffi::MDB_READERS_FULL => Error::ReadersFull,
            ffi::MDB_TLS_FULL => Error::TlsFull,
            ffi::MDB_TXN_FULL => Error::TxnFull,
            ffi::MDB_CURSOR_FULL => Error::CursorFull,
            ffi::MDB_PAGE_FULL => Error::PageFull,
            ffi::MDB_MAP_RESIZED => Error::MapResized,
            ffi::MDB_INCOMPATIBLE => Error::Incompatible,
            ffi::MDB_BAD_RSLOT => Error::BadRslot,
            ffi::MDB_BAD_TXN => Error::BadTxn,
            ffi::MDB_BAD_VALSIZE => Error::BadValSize,
            ffi::MDB_BAD_DBI => Error::BadDbi,
            code if code > 0 => Error::Io(io::Error::from_raw_os_error(code)),
            code => {
                let detail = unsafe { CStr::from_ptr(ffi::mdb_strerror(code)) }
                    .to_string_lossy()
                    .into_owned();
                Error::Other(code, detail)
            }
        }
    }
}

/// Convert an engine return code to a `Result`, translating failures.
pub(crate) fn lmdb_result(code: c_int) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(Error::from_err_code(code))
    }
}
