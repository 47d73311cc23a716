use bitflags::bitflags;
use lmdb_sys as ffi;

// Environment flags
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EnvFlags: u32 {
        const FIXEDMAP = ffi::MDB_FIXEDMAP;
        const NOSUBDIR = ffi::MDB_NOSUBDIR;
        const NOSYNC = ffi::MDB_NOSYNC;
        const RDONLY = ffi::MDB_RDONLY;
        const NOMETASYNC = ffi::MDB_NOMETASYNC;
        const WRITEMAP = ffi::MDB_WRITEMAP;
        const MAPASYNC = ffi::MDB_MAPASYNC;
        const NOTLS = ffi::MDB_NOTLS;
        const NOLOCK = ffi::MDB_NOLOCK;
        const NORDAHEAD = ffi::MDB_NORDAHEAD;
        const NOMEMINIT = ffi::MDB_NOMEMINIT;
    }
}

// Keyspace flags
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DbFlags: u32 {
        const REVERSEKEY = ffi::MDB_REVERSEKEY;
        const DUPSORT = ffi::MDB_DUPSORT;
        const INTEGERKEY = ffi::MDB_INTEGERKEY;
        const DUPFIXED = ffi::MDB_DUPFIXED;
        const INTEGERDUP = ffi::MDB_INTEGERDUP;
        const REVERSEDUP = ffi::MDB_REVERSEDUP;
        const CREATE = ffi::MDB_CREATE;
    }
}

// Write operation flags
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WriteFlags: u32 {
        const NOOVERWRITE = ffi::MDB_NOOVERWRITE;
        const NODUPDATA = ffi::MDB_NODUPDATA;
        const CURRENT = ffi::MDB_CURRENT;
        const APPEND = ffi::MDB_APPEND;
        const APPENDDUP = ffi::MDB_APPENDDUP;
    }
}

/// Flag combinations tried, in order, when opening a keyspace whose creation
/// flags are not known in advance. The first combination the engine accepts
/// wins, so a keyspace created by another process opens without the caller
/// naming its layout.
pub(crate) const DB_OPEN_ATTEMPTS: [DbFlags; 5] = [
    DbFlags::empty(),
    DbFlags::DUPSORT,
    DbFlags::REVERSEKEY,
    DbFlags::DUPSORT.union(DbFlags::DUPFIXED),
    DbFlags::DUPSORT.union(DbFlags::REVERSEDUP),
];

/// Default address-space reservation for the memory map.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
/// Default maximum number of named keyspaces.
pub const DEFAULT_MAX_DBS: u32 = 16;
/// Default maximum number of concurrent reader slots.
pub const DEFAULT_MAX_READERS: u32 = 126;
/// File mode for the data and lock files.
pub(crate) const DEFAULT_MODE: libc::mode_t = 0o644;
