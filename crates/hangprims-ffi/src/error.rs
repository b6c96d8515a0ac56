use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use hangprims_store::{ErrorKind, StoreError};

use crate::types::HgResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::new("").expect("empty CString should be valid"));
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new("").expect("empty CString should be valid");
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let sanitized = message.into().replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized)
            .unwrap_or_else(|_| CString::new("internal error").expect("literal is valid"));
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> HgResult {
    set_error_message(message);
    HgResult::InvalidArgument
}

pub(crate) fn set_fault(message: impl Into<String>) -> HgResult {
    set_error_message(message);
    HgResult::Fault
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_store_error(err: &StoreError) -> HgResult {
    set_error_message(err.to_string());
    match err.kind() {
        ErrorKind::InvalidArgument => HgResult::InvalidArgument,
        ErrorKind::NotFound => HgResult::NotFound,
        ErrorKind::Cancelled => HgResult::Cancelled,
        ErrorKind::Internal => HgResult::Internal,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
