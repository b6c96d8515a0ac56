/// Errors produced by the session engine.
///
/// Every variant except [`GameError::OutOfMemory`] is an invalid-argument
/// class error: it is raised before any session state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A secret word must contain at least one letter.
    #[error("secret word must not be empty")]
    EmptyWord,

    /// The candidate secret word contains a byte outside `a..=z`.
    #[error("secret word byte {byte:#04x} at index {index} is not a lowercase letter")]
    InvalidWordByte { byte: u8, index: usize },

    /// A guess byte is outside `a..=z`.
    #[error("guess byte {byte:#04x} is not a lowercase letter")]
    InvalidGuess { byte: u8 },

    /// The game already ended; only a reset is accepted.
    #[error("game is finished, reset to play again")]
    GameFinished,

    /// A guess was submitted before a secret word was chosen.
    #[error("no secret word has been chosen yet")]
    WordNotChosen,

    /// A secret word was submitted while one is already in play.
    #[error("a secret word is already in play")]
    WordAlreadyChosen,

    /// The seek target falls outside `0..=bound`.
    #[error("seek target {target} is outside 0..={bound}")]
    SeekOutOfRange { target: i128, bound: u64 },

    /// `SEEK_END` only accepts non-positive offsets.
    #[error("seek offset {offset} from end must not be positive")]
    SeekPastEnd { offset: i64 },

    /// The raw whence value is not one of `SEEK_SET`, `SEEK_CUR`, `SEEK_END`.
    #[error("unknown seek whence {0}")]
    InvalidWhence(i32),

    /// Storage for the secret word or guess mask could not be reserved.
    #[error("failed to allocate {requested} bytes of session storage")]
    OutOfMemory { requested: usize },
}

impl GameError {
    /// True for every error caused by caller input rather than resource exhaustion.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, GameError::OutOfMemory { .. })
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_allocation_failures_are_internal() {
        assert!(GameError::EmptyWord.is_invalid_argument());
        assert!(GameError::InvalidGuess { byte: b'1' }.is_invalid_argument());
        assert!(GameError::SeekPastEnd { offset: 1 }.is_invalid_argument());
        assert!(!GameError::OutOfMemory { requested: 8 }.is_invalid_argument());
    }

    #[test]
    fn messages_show_offending_byte_in_hex() {
        let err = GameError::InvalidWordByte {
            byte: b'1',
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "secret word byte 0x31 at index 3 is not a lowercase letter"
        );
    }
}
