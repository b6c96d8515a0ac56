//! hangprims-ffi: C-ABI exports for hangprims session stores.
//!
//! The surface mirrors a character device: open a session, then read,
//! write, seek and issue control codes against it. Every call returns an
//! [`HgResult`]; the message for the most recent failure on the calling
//! thread is available from [`hg_last_error`].

mod args;
mod error;
mod session;
mod store;
mod types;

use std::panic::AssertUnwindSafe;

pub use session::{hg_control, hg_handle_free, hg_read, hg_seek, hg_write};
pub use store::{hg_open, hg_store_free, hg_store_new};
pub use types::{
    HgResult, HgSessionHandle, HgStoreHandle, HG_ERR_CANCELLED, HG_ERR_FAULT, HG_ERR_INTERNAL,
    HG_ERR_INVALID_ARGUMENT, HG_ERR_NOT_FOUND, HG_IOCTL_RESET, HG_OK, HG_SEEK_CUR, HG_SEEK_END,
    HG_SEEK_SET,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn hg_init() -> HgResult {
    ffi_boundary(HgResult::Internal, || {
        error::clear_error_state();
        HgResult::Ok
    })
}

#[no_mangle]
pub extern "C" fn hg_cleanup() {
    ffi_boundary((), || {
        error::clear_error_state();
    });
}

#[no_mangle]
pub extern "C" fn hg_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn init_and_cleanup_are_ok() {
        assert_eq!(hg_init(), HgResult::Ok);
        hg_cleanup();
    }

    #[test]
    fn last_error_is_empty_after_cleanup() {
        hg_cleanup();
        let ptr = hg_last_error();
        assert!(!ptr.is_null());

        // SAFETY: hg_last_error returns a pointer to a thread-local CString.
        let text = unsafe { CStr::from_ptr(ptr).to_str().unwrap() };
        assert!(text.is_empty());
    }

    #[test]
    fn panics_do_not_cross_the_boundary() {
        let result = ffi_boundary(HgResult::Internal, || panic!("boom"));
        assert_eq!(result, HgResult::Internal);

        // SAFETY: hg_last_error returns a pointer to a thread-local CString.
        let text = unsafe { CStr::from_ptr(hg_last_error()) }.to_string_lossy();
        assert_eq!(text, "panic across FFI boundary");
    }
}
