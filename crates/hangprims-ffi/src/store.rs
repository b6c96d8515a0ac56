use hangprims_store::{SessionStore, StoreConfig};

use crate::error;
use crate::types::{HgSessionHandle, HgStoreHandle, SessionHandleBox, StoreHandle};

fn with_store<T>(
    handle: HgStoreHandle,
    on_error: T,
    f: impl FnOnce(&StoreHandle) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("store handle cannot be null");
        return on_error;
    }

    let store_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *const StoreHandle) }
    };

    f(store_handle)
}

/// Create a store holding `count` sessions, all in the choosing phase.
///
/// Returns null on failure; `hg_last_error` describes why.
#[no_mangle]
pub extern "C" fn hg_store_new(count: usize) -> HgStoreHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        match SessionStore::new(StoreConfig::default().with_session_count(count)) {
            Ok(store) => Box::into_raw(Box::new(StoreHandle { store })) as HgStoreHandle,
            Err(err) => {
                let _ = error::map_store_error(&err);
                std::ptr::null_mut()
            }
        }
    })
}

/// Free a store handle.
///
/// Every session is cleared first. Session handles opened from the store
/// stay valid until they are freed and see fresh sessions.
///
/// # Safety
/// `store` must be null or a handle previously returned by `hg_store_new`.
#[no_mangle]
pub unsafe extern "C" fn hg_store_free(store: HgStoreHandle) {
    crate::ffi_boundary((), || {
        if store.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by hg_store_new.
        let handle = unsafe { Box::from_raw(store as *mut StoreHandle) };
        handle.store.teardown();
    });
}

/// Open session `id` of `store`.
///
/// Returns null on failure; `hg_last_error` describes why.
///
/// # Safety
/// `store` must be a valid handle returned by `hg_store_new`.
#[no_mangle]
pub unsafe extern "C" fn hg_open(store: HgStoreHandle, id: usize) -> HgSessionHandle {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();

        with_store(store, std::ptr::null_mut(), |store_handle| {
            match store_handle.store.open(id) {
                Ok(session) => {
                    Box::into_raw(Box::new(SessionHandleBox { session })) as HgSessionHandle
                }
                Err(err) => {
                    let _ = error::map_store_error(&err);
                    std::ptr::null_mut()
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;
    use crate::session::hg_handle_free;

    fn last_error() -> String {
        // SAFETY: hg_last_error returns a pointer to a thread-local CString.
        unsafe { CStr::from_ptr(crate::hg_last_error()) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn zero_sessions_is_rejected() {
        let store = hg_store_new(0);
        assert!(store.is_null());
        assert!(last_error().contains("session_count"));
    }

    #[test]
    fn open_checks_range() {
        let store = hg_store_new(6);
        assert!(!store.is_null());

        // SAFETY: `store` came from hg_store_new and is freed once below.
        unsafe {
            let session = hg_open(store, 5);
            assert!(!session.is_null());
            hg_handle_free(session);

            assert!(hg_open(store, 6).is_null());
            assert!(last_error().contains("not found"));

            hg_store_free(store);
        }
    }

    #[test]
    fn null_store_is_invalid() {
        // SAFETY: Null is rejected before any dereference.
        let session = unsafe { hg_open(std::ptr::null_mut(), 0) };
        assert!(session.is_null());
        assert!(last_error().contains("store handle"));
    }
}
