use std::os::raw::c_void;
use std::ptr;
use std::slice;

use lmdb_sys as ffi;

/// Borrow a byte slice as an engine value descriptor.
///
/// The descriptor only aliases the slice; the engine does not write through
/// it for any operation this crate issues.
pub(crate) fn slice_to_val(data: &[u8]) -> ffi::MDB_val {
    ffi::MDB_val {
        mv_size: data.len(),
        mv_data: data.as_ptr() as *mut c_void,
    }
}

/// An empty descriptor for out-parameters.
pub(crate) fn empty_val() -> ffi::MDB_val {
    ffi::MDB_val {
        mv_size: 0,
        mv_data: ptr::null_mut(),
    }
}

/// View an engine value descriptor as a byte slice.
///
/// The descriptor must come from a successful engine call inside a
/// transaction that is still alive; the caller bounds the returned lifetime
/// accordingly.
pub(crate) unsafe fn val_to_slice<'a>(val: &ffi::MDB_val) -> &'a [u8] {
    if val.mv_size == 0 {
        &[]
    } else {
        slice::from_raw_parts(val.mv_data as *const u8, val.mv_size)
    }
}
