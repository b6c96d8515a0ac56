//! Fixed-size store of independently locked hangman sessions.
//!
//! This is the layer callers talk to. Open a session by id, then read,
//! write, seek and reset it through a [`SessionHandle`]. Each operation
//! holds that session's lock for its whole duration, so concurrent callers
//! see whole operations in a total order; different sessions never block
//! each other.

pub mod cancel;
pub mod config;
pub mod control;
pub mod error;
pub mod handle;
pub mod store;

pub use cancel::CancelFlag;
pub use config::{StoreConfig, DEFAULT_LOCK_POLL_INTERVAL, DEFAULT_SESSION_COUNT};
pub use control::{ControlCommand, HANGMAN_IOC_MAGIC, IOCTL_RESET};
pub use error::{ErrorKind, Result, StoreError};
pub use handle::SessionHandle;
pub use store::SessionStore;

pub use hangprims_game::{Outcome, Phase, SessionSnapshot, Whence};
