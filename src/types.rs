use lmdb_sys as ffi;

/// B-tree statistics for an environment or a single keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Size of a page in bytes
    pub page_size: u32,
    /// Depth of the B-tree
    pub depth: u32,
    /// Number of internal (non-leaf) pages
    pub branch_pages: usize,
    /// Number of leaf pages
    pub leaf_pages: usize,
    /// Number of overflow pages
    pub overflow_pages: usize,
    /// Number of entries
    pub entries: usize,
}

impl Stat {
    pub(crate) fn from_ffi(stat: &ffi::MDB_stat) -> Stat {
        Stat {
            page_size: stat.ms_psize,
            depth: stat.ms_depth,
            branch_pages: stat.ms_branch_pages,
            leaf_pages: stat.ms_leaf_pages,
            overflow_pages: stat.ms_overflow_pages,
            entries: stat.ms_entries,
        }
    }
}

/// Runtime information about an open environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvInfo {
    /// Size of the mapped address-space reservation
    pub map_size: usize,
    /// Number of the last used page
    pub last_pgno: usize,
    /// Identifier of the last committed transaction
    pub last_txnid: usize,
    /// Maximum number of reader slots
    pub max_readers: u32,
    /// Number of reader slots currently in use
    pub num_readers: u32,
}

impl EnvInfo {
    pub(crate) fn from_ffi(info: &ffi::MDB_envinfo) -> EnvInfo {
        EnvInfo {
            map_size: info.me_mapsize,
            last_pgno: info.me_last_pgno,
            last_txnid: info.me_last_txnid,
            max_readers: info.me_maxreaders,
            num_readers: info.me_numreaders,
        }
    }
}
