//! Hangman session engine.
//!
//! This is the core layer of hangprims. A [`Session`] is a small state
//! machine driven through a byte-stream protocol:
//! - a write in the choosing phase sets the secret word
//! - writes in the guessing phase are applied one letter at a time
//! - reads render the prompt, or the guess mask followed by the gallows
//! - seeks move the read cursor within the mask length
//!
//! Nothing here locks or shares state; see `hangprims-store` for that.

pub mod encode;
pub mod error;
pub mod gallows;
pub mod letters;
pub mod seek;
pub mod session;
pub mod write;

pub use encode::{encoded_len, read_window, render, HIDDEN, PROMPT};
pub use error::{GameError, Result};
pub use gallows::{Gallows, GALLOWS_SIZE, GALLOWS_TEMPLATE, LIMBS, MAX_MISTAKES};
pub use letters::{is_letter, LetterSet};
pub use seek::{resolve_seek, Whence};
pub use session::{Guess, Outcome, Phase, Session, SessionSnapshot};
pub use write::{apply_write, WriteReport, WriteStop};
