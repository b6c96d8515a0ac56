//! Multiplexed hangman sessions driven through a byte-stream protocol.
//!
//! hangprims keeps a fixed set of independent hangman games. Each one is
//! driven like a small character device: write to choose the word or guess
//! letters, read to get the prompt or the board, seek within the guess
//! mask, reset through a control code.
//!
//! # Crate Structure
//!
//! - [`game`]: Single-session state machine and read-buffer encoding
//! - [`store`]: Fixed-size store of independently locked sessions
//!
//! ```
//! use std::io::Read;
//!
//! use hangprims::{SessionStore, StoreConfig};
//!
//! let store = SessionStore::new(StoreConfig::default()).unwrap();
//! let mut session = store.open(0).unwrap();
//! session.write_bytes(b"apple").unwrap();
//! assert_eq!(session.write_bytes(b"aplez").unwrap(), 4);
//!
//! let mut board = Vec::new();
//! session.read_to_end(&mut board).unwrap();
//! assert!(board.starts_with(b"apple\n"));
//! ```

/// Re-export session engine types.
pub mod game {
    pub use hangprims_game::*;
}

/// Re-export store types.
pub mod store {
    pub use hangprims_store::*;
}

pub use hangprims_store::{
    CancelFlag, ControlCommand, ErrorKind, Outcome, Phase, SessionHandle, SessionSnapshot,
    SessionStore, StoreConfig, StoreError, Whence,
};
