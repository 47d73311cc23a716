//! Safe, transactional key-value bindings over a memory-mapped B-tree
//! engine.
//!
//! The engine itself (page format, B-tree balancing, disk I/O) is an
//! external dependency; this crate is the binding and lifecycle layer on
//! top of it: environments bound to a directory, read-only and read-write
//! transactions, named keyspaces opened through flag negotiation, and
//! ordered cursors.
//!
//! Resource lifetimes are expressed through ownership: `commit`/`abort`
//! consume the transaction, cursors borrow their transaction, and
//! transactions borrow their environment, so use-after-end is a compile
//! error. Explicit `close` is the documented teardown path for environments
//! and cursors; `Drop` impls release anything left open as a backstop.
//!
//! Missing keys are ordinary outcomes (`Ok(None)` / `Ok(false)`), never
//! errors. Write transactions are serialized per environment; read
//! transactions run concurrently against stable snapshots.
//!
//! ```no_run
//! use lmstore::{EnvOptions, Environment, WriteFlags};
//!
//! fn main() -> lmstore::Result<()> {
//!     let mut env = Environment::open("./db", &EnvOptions::default())?;
//!
//!     let mut txn = env.begin_txn()?;
//!     let users = txn.open_db(Some("users"), true)?;
//!     txn.put(&users, b"alice", b"1", WriteFlags::empty())?;
//!     txn.commit()?;
//!
//!     let txn = env.begin_ro_txn()?;
//!     assert_eq!(txn.get(&users, b"alice")?, Some(&b"1"[..]));
//!     txn.abort();
//!
//!     env.close();
//!     Ok(())
//! }
//! ```

mod constants;
mod cursor;
mod database;
mod env;
mod error;
mod transaction;
mod types;
mod value;

pub use constants::{DbFlags, EnvFlags, WriteFlags};
pub use constants::{DEFAULT_MAP_SIZE, DEFAULT_MAX_DBS, DEFAULT_MAX_READERS};
pub use cursor::Cursor;
pub use database::Database;
pub use env::{EnvOptions, Environment};
pub use error::{Error, Result};
pub use types::{EnvInfo, Stat};
