use crate::error::{GameError, Result};
use crate::session::Session;

/// Reference point for a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// `SEEK_SET`: from position 0.
    Start,
    /// `SEEK_CUR`: from the current cursor.
    Current,
    /// `SEEK_END`: from the end of the secret word.
    End,
}

impl Whence {
    pub const SEEK_SET: i32 = 0;
    pub const SEEK_CUR: i32 = 1;
    pub const SEEK_END: i32 = 2;

    /// Decode a POSIX whence value.
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            Self::SEEK_SET => Ok(Self::Start),
            Self::SEEK_CUR => Ok(Self::Current),
            Self::SEEK_END => Ok(Self::End),
            other => Err(GameError::InvalidWhence(other)),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Start => Self::SEEK_SET,
            Self::Current => Self::SEEK_CUR,
            Self::End => Self::SEEK_END,
        }
    }
}

/// Compute a seek target within `0..=bound`.
///
/// The arithmetic is done in `i128`, so no combination of inputs can wrap.
pub fn resolve_seek(cursor: u64, bound: u64, offset: i64, whence: Whence) -> Result<u64> {
    let target = match whence {
        Whence::Start => i128::from(offset),
        Whence::Current => i128::from(cursor) + i128::from(offset),
        Whence::End => {
            if offset > 0 {
                return Err(GameError::SeekPastEnd { offset });
            }
            i128::from(bound) + i128::from(offset)
        }
    };

    if target < 0 || target > i128::from(bound) {
        return Err(GameError::SeekOutOfRange { target, bound });
    }
    u64::try_from(target).map_err(|_| GameError::SeekOutOfRange { target, bound })
}

impl Session {
    /// Move the cursor. The bound is the secret word length, not the length
    /// of the rendered buffer, so the gallows part can only be reached by
    /// reading.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let bound = self.word_len() as u64;
        let target = resolve_seek(self.cursor, bound, offset, whence)?;
        self.cursor = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_whence_round_trips() {
        for whence in [Whence::Start, Whence::Current, Whence::End] {
            assert_eq!(Whence::from_raw(whence.as_raw()), Ok(whence));
        }
        assert_eq!(Whence::from_raw(3), Err(GameError::InvalidWhence(3)));
        assert_eq!(Whence::from_raw(-1), Err(GameError::InvalidWhence(-1)));
    }

    #[test]
    fn seek_set_is_bounded_by_word_length() {
        assert_eq!(resolve_seek(0, 5, 5, Whence::Start), Ok(5));
        assert_eq!(resolve_seek(0, 5, 0, Whence::Start), Ok(0));
        assert!(resolve_seek(0, 5, 6, Whence::Start).is_err());
        assert!(resolve_seek(0, 5, -1, Whence::Start).is_err());
    }

    #[test]
    fn seek_cur_is_relative() {
        assert_eq!(resolve_seek(3, 5, -3, Whence::Current), Ok(0));
        assert_eq!(resolve_seek(3, 5, 2, Whence::Current), Ok(5));
        assert!(resolve_seek(3, 5, 3, Whence::Current).is_err());
        assert!(resolve_seek(3, 5, -4, Whence::Current).is_err());
    }

    #[test]
    fn seek_end_requires_non_positive_offset() {
        assert_eq!(resolve_seek(0, 5, 0, Whence::End), Ok(5));
        assert_eq!(resolve_seek(0, 5, -5, Whence::End), Ok(0));
        assert_eq!(
            resolve_seek(0, 5, 1, Whence::End),
            Err(GameError::SeekPastEnd { offset: 1 })
        );
        assert!(resolve_seek(0, 5, -6, Whence::End).is_err());
    }

    #[test]
    fn extreme_offsets_do_not_wrap() {
        assert!(resolve_seek(u64::MAX, 5, i64::MAX, Whence::Current).is_err());
        assert!(resolve_seek(0, 5, i64::MIN, Whence::End).is_err());
        assert!(resolve_seek(0, u64::MAX, i64::MIN, Whence::Current).is_err());
    }

    #[test]
    fn choosing_session_only_seeks_to_zero() {
        let mut session = Session::new();
        assert_eq!(session.seek(0, Whence::Start), Ok(0));
        assert!(session.seek(1, Whence::Start).is_err());
        assert_eq!(session.seek(0, Whence::End), Ok(0));
    }

    #[test]
    fn failed_seek_leaves_cursor() {
        let mut session = Session::new();
        session.set_word(b"apple").unwrap();
        session.seek(2, Whence::Start).unwrap();

        assert!(session.seek(10, Whence::Current).is_err());
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.read(3).as_ref(), b"***");
    }

    #[test]
    fn seek_into_prompt_then_read() {
        let mut session = Session::new();
        session.read(20);
        assert_eq!(session.seek(0, Whence::Start), Ok(0));
        assert_eq!(session.read(6).as_ref(), b"Please");
    }
}
