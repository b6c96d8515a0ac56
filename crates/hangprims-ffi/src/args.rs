use crate::error;
use crate::types::HgResult;

/// Borrow a caller buffer as input bytes.
///
/// A null pointer is only accepted together with `len == 0`; otherwise the
/// call fails with [`HgResult::Fault`].
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
pub(crate) unsafe fn bytes_arg<'a>(
    data: *const u8,
    len: usize,
    name: &str,
) -> Result<&'a [u8], HgResult> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(error::set_fault(format!("{name} cannot be null when len > 0")));
    }

    // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Borrow a caller buffer as writable output bytes.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and writable for `len` bytes.
pub(crate) unsafe fn bytes_out_arg<'a>(
    data: *mut u8,
    len: usize,
    name: &str,
) -> Result<&'a mut [u8], HgResult> {
    if len == 0 {
        return Ok(&mut []);
    }
    if data.is_null() {
        return Err(error::set_fault(format!("{name} cannot be null when len > 0")));
    }

    // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
    Ok(unsafe { std::slice::from_raw_parts_mut(data, len) })
}

/// Store `value` through an out-pointer.
///
/// # Safety
/// `out` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T, name: &str) -> HgResult {
    if out.is_null() {
        return error::set_invalid_argument(format!("{name} cannot be null"));
    }

    // SAFETY: Pointer was checked for null above.
    unsafe {
        *out = value;
    }
    HgResult::Ok
}

/// Reject a null out-pointer before doing any work.
pub(crate) fn require_out<T>(out: *mut T, name: &str) -> Result<(), HgResult> {
    if out.is_null() {
        return Err(error::set_invalid_argument(format!("{name} cannot be null")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_input_with_length_is_a_fault() {
        // SAFETY: Null with len > 0 is rejected before any dereference.
        let result = unsafe { bytes_arg(std::ptr::null(), 3, "data") };
        assert_eq!(result.unwrap_err(), HgResult::Fault);
    }

    #[test]
    fn null_input_without_length_is_empty() {
        // SAFETY: Zero length never dereferences the pointer.
        let result = unsafe { bytes_arg(std::ptr::null(), 0, "data") };
        assert_eq!(result.unwrap(), b"");
    }

    #[test]
    fn null_out_pointer_is_invalid() {
        assert_eq!(
            require_out(std::ptr::null_mut::<usize>(), "out_read"),
            Err(HgResult::InvalidArgument)
        );

        let mut value = 0usize;
        // SAFETY: `value` is a live local.
        let result = unsafe { write_out(&mut value as *mut usize, 7, "out_read") };
        assert_eq!(result, HgResult::Ok);
        assert_eq!(value, 7);
    }
}
