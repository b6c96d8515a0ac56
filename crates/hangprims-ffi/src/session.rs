use hangprims_store::{ControlCommand, Whence};

use crate::args;
use crate::error;
use crate::types::{HgResult, HgSessionHandle, SessionHandleBox};

fn with_session<T>(
    handle: HgSessionHandle,
    on_error: T,
    f: impl FnOnce(&SessionHandleBox) -> T,
) -> T {
    if handle.is_null() {
        let _ = error::set_invalid_argument("session handle cannot be null");
        return on_error;
    }

    let session_handle = {
        // SAFETY: Pointer validity is guaranteed by the caller.
        unsafe { &*(handle as *const SessionHandleBox) }
    };

    f(session_handle)
}

/// Copy up to `len` bytes of the session buffer into `buf`.
///
/// `*out_read` receives the byte count; zero means end of buffer.
///
/// # Safety
/// `session` must be a valid session handle. If `len > 0`, `buf` must be
/// writable for `len` bytes. `out_read` must be a writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hg_read(
    session: HgSessionHandle,
    buf: *mut u8,
    len: usize,
    out_read: *mut usize,
) -> HgResult {
    crate::ffi_boundary(HgResult::Internal, || {
        error::clear_error_state();

        if let Err(result) = args::require_out(out_read, "out_read") {
            return result;
        }
        let dst = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_out_arg(buf, len, "buf") } {
                Ok(v) => v,
                Err(result) => return result,
            }
        };

        with_session(session, HgResult::InvalidArgument, |handle| {
            match handle.session.read_bytes(dst.len()) {
                Ok(chunk) => {
                    dst[..chunk.len()].copy_from_slice(&chunk);
                    // SAFETY: `out_read` was checked for null above.
                    unsafe { args::write_out(out_read, chunk.len(), "out_read") }
                }
                Err(err) => error::map_store_error(&err),
            }
        })
    })
}

/// Apply `len` bytes from `data` as one write call.
///
/// # Safety
/// `session` must be a valid session handle. If `len > 0`, `data` must be
/// readable for `len` bytes. `out_written` must be a writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hg_write(
    session: HgSessionHandle,
    data: *const u8,
    len: usize,
    out_written: *mut usize,
) -> HgResult {
    crate::ffi_boundary(HgResult::Internal, || {
        error::clear_error_state();

        if let Err(result) = args::require_out(out_written, "out_written") {
            return result;
        }
        let input = {
            // SAFETY: We validate pointer/length pairing in helper.
            match unsafe { args::bytes_arg(data, len, "data") } {
                Ok(v) => v,
                Err(result) => return result,
            }
        };

        with_session(session, HgResult::InvalidArgument, |handle| {
            match handle.session.write_bytes(input) {
                // SAFETY: `out_written` was checked for null above.
                Ok(consumed) => unsafe { args::write_out(out_written, consumed, "out_written") },
                Err(err) => error::map_store_error(&err),
            }
        })
    })
}

/// Run a raw control code such as `HG_IOCTL_RESET`.
///
/// # Safety
/// `session` must be a valid session handle.
#[no_mangle]
pub unsafe extern "C" fn hg_control(session: HgSessionHandle, code: u32) -> HgResult {
    crate::ffi_boundary(HgResult::Internal, || {
        error::clear_error_state();

        with_session(session, HgResult::InvalidArgument, |handle| {
            match ControlCommand::from_raw(code).and_then(|cmd| handle.session.control(cmd)) {
                Ok(()) => HgResult::Ok,
                Err(err) => error::map_store_error(&err),
            }
        })
    })
}

/// Move the session cursor. `whence` takes `HG_SEEK_SET`, `HG_SEEK_CUR` or
/// `HG_SEEK_END`.
///
/// # Safety
/// `session` must be a valid session handle and `out_pos` a writable pointer.
#[no_mangle]
pub unsafe extern "C" fn hg_seek(
    session: HgSessionHandle,
    offset: i64,
    whence: i32,
    out_pos: *mut u64,
) -> HgResult {
    crate::ffi_boundary(HgResult::Internal, || {
        error::clear_error_state();

        if let Err(result) = args::require_out(out_pos, "out_pos") {
            return result;
        }

        with_session(session, HgResult::InvalidArgument, |handle| {
            let whence = match Whence::from_raw(whence) {
                Ok(whence) => whence,
                Err(err) => return error::set_invalid_argument(err.to_string()),
            };
            match handle.session.seek_to(offset, whence) {
                // SAFETY: `out_pos` was checked for null above.
                Ok(pos) => unsafe { args::write_out(out_pos, pos, "out_pos") },
                Err(err) => error::map_store_error(&err),
            }
        })
    })
}

/// Free a session handle. The session itself keeps its state.
///
/// # Safety
/// `session` must be null or a handle previously returned by `hg_open`.
#[no_mangle]
pub unsafe extern "C" fn hg_handle_free(session: HgSessionHandle) {
    crate::ffi_boundary((), || {
        if session.is_null() {
            return;
        }

        // SAFETY: Caller guarantees this handle was allocated by hg_open.
        unsafe {
            drop(Box::from_raw(session as *mut SessionHandleBox));
        }
    });
}
