use std::ffi::c_void;

use hangprims_store::{SessionHandle, SessionStore};

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HgResult {
    Ok = 0,
    InvalidArgument = 1,
    NotFound = 2,
    Cancelled = 3,
    Fault = 4,
    Internal = 99,
}

#[allow(dead_code)]
pub const HG_OK: HgResult = HgResult::Ok;
#[allow(dead_code)]
pub const HG_ERR_INVALID_ARGUMENT: HgResult = HgResult::InvalidArgument;
#[allow(dead_code)]
pub const HG_ERR_NOT_FOUND: HgResult = HgResult::NotFound;
#[allow(dead_code)]
pub const HG_ERR_CANCELLED: HgResult = HgResult::Cancelled;
#[allow(dead_code)]
pub const HG_ERR_FAULT: HgResult = HgResult::Fault;
#[allow(dead_code)]
pub const HG_ERR_INTERNAL: HgResult = HgResult::Internal;

#[allow(dead_code)]
pub const HG_SEEK_SET: i32 = hangprims_store::Whence::SEEK_SET;
#[allow(dead_code)]
pub const HG_SEEK_CUR: i32 = hangprims_store::Whence::SEEK_CUR;
#[allow(dead_code)]
pub const HG_SEEK_END: i32 = hangprims_store::Whence::SEEK_END;

#[allow(dead_code)]
pub const HG_IOCTL_RESET: u32 = hangprims_store::IOCTL_RESET;

pub type HgStoreHandle = *mut c_void;
pub type HgSessionHandle = *mut c_void;

pub(crate) struct StoreHandle {
    pub(crate) store: SessionStore,
}

pub(crate) struct SessionHandleBox {
    pub(crate) session: SessionHandle,
}
