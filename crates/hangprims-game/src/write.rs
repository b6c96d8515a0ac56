use std::ops::ControlFlow;

use tracing::debug;

use crate::error::{GameError, Result};
use crate::session::{Outcome, Phase, Session};

/// Why a write stopped consuming input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStop {
    /// Every byte was consumed.
    Exhausted,
    /// A guess ended the game; the remaining bytes were dropped.
    Finished(Outcome),
    /// The byte at `index` is not a letter and was not consumed.
    Rejected { byte: u8, index: usize },
}

/// Result of applying one write call: how many bytes were consumed and why
/// consumption stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub consumed: usize,
    pub stop: WriteStop,
}

impl WriteReport {
    /// True unless the very first byte was rejected.
    pub fn is_accepted(&self) -> bool {
        !matches!(self.stop, WriteStop::Rejected { .. }) || self.consumed > 0
    }

    /// Collapse into the caller-facing count.
    ///
    /// A rejection only surfaces as an error when nothing was consumed;
    /// otherwise the consumed count is the whole answer.
    pub fn into_result(self) -> Result<usize> {
        match self.stop {
            WriteStop::Rejected { byte, .. } if self.consumed == 0 => {
                Err(GameError::InvalidGuess { byte })
            }
            _ => Ok(self.consumed),
        }
    }
}

/// Apply a write to `session` according to its phase.
///
/// - choosing: `input` is the secret word, all or nothing
/// - guessing: each byte is one guess, applied left to right
/// - finished: rejected
pub fn apply_write(session: &mut Session, input: &[u8]) -> Result<WriteReport> {
    match session.phase() {
        Phase::Choosing => {
            session.set_word(input)?;
            Ok(WriteReport {
                consumed: input.len(),
                stop: WriteStop::Exhausted,
            })
        }
        Phase::Guessing => Ok(apply_guesses(session, input)),
        Phase::Finished => Err(GameError::GameFinished),
    }
}

fn apply_guesses(session: &mut Session, input: &[u8]) -> WriteReport {
    let folded = input
        .iter()
        .enumerate()
        .try_fold(0usize, |consumed, (index, &byte)| {
            if let Err(err) = session.guess(byte) {
                debug!(index, error = %err, "guess rejected");
                return ControlFlow::Break(WriteReport {
                    consumed,
                    stop: WriteStop::Rejected { byte, index },
                });
            }
            match session.outcome() {
                Some(outcome) => ControlFlow::Break(WriteReport {
                    consumed: consumed + 1,
                    stop: WriteStop::Finished(outcome),
                }),
                None => ControlFlow::Continue(consumed + 1),
            }
        });

    match folded {
        ControlFlow::Continue(consumed) => WriteReport {
            consumed,
            stop: WriteStop::Exhausted,
        },
        ControlFlow::Break(report) => report,
    }
}

impl Session {
    /// Apply a write and report how it went.
    ///
    /// An accepted write moves the cursor back to the start so the next
    /// read sees the whole updated buffer.
    pub fn write_report(&mut self, input: &[u8]) -> Result<WriteReport> {
        let report = apply_write(self, input)?;
        if report.is_accepted() {
            self.cursor = 0;
        }
        Ok(report)
    }

    /// Apply a write and return the number of bytes consumed.
    pub fn write(&mut self, input: &[u8]) -> Result<usize> {
        self.write_report(input)?.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guessing(word: &str) -> Session {
        let mut session = Session::new();
        assert_eq!(session.write(word.as_bytes()), Ok(word.len()));
        session
    }

    #[test]
    fn choosing_write_sets_whole_word() {
        let mut session = Session::new();
        let report = session.write_report(b"apple").unwrap();

        assert_eq!(
            report,
            WriteReport {
                consumed: 5,
                stop: WriteStop::Exhausted
            }
        );
        assert_eq!(session.phase(), Phase::Guessing);
    }

    #[test]
    fn choosing_write_is_atomic() {
        let mut session = Session::new();
        assert!(matches!(
            session.write(b"abc1abc1abc"),
            Err(GameError::InvalidWordByte { index: 3, .. })
        ));
        assert_eq!(session.write(b""), Err(GameError::EmptyWord));
        assert_eq!(session.phase(), Phase::Choosing);
        assert_eq!(session.word_len(), 0);
    }

    #[test]
    fn guessing_own_word_consumes_duplicates() {
        let mut session = guessing("apple");
        let report = session.write_report(b"apple").unwrap();

        // The final 'e' completes the word, so nothing is dropped.
        assert_eq!(
            report,
            WriteReport {
                consumed: 5,
                stop: WriteStop::Finished(Outcome::Won)
            }
        );
    }

    #[test]
    fn finishing_drops_remaining_bytes() {
        let mut session = guessing("apple");
        assert_eq!(session.write(b"aplez"), Ok(4));
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn repeated_miss_consumes_without_losing() {
        let mut session = guessing("apple");
        assert_eq!(session.write(b"zzzzzzzz"), Ok(8));
        assert_eq!(session.mistakes(), 1);
        assert_eq!(session.phase(), Phase::Guessing);
    }

    #[test]
    fn sixth_miss_stops_the_write() {
        let mut session = guessing("apple");
        let report = session.write_report(b"bcdfghij").unwrap();

        assert_eq!(
            report,
            WriteReport {
                consumed: 6,
                stop: WriteStop::Finished(Outcome::Lost)
            }
        );
        assert_eq!(session.mistakes(), 6);
    }

    #[test]
    fn writing_the_word_itself_stops_at_the_win() {
        for (word, expected) in [
            ("anakin", 5),
            ("palpatin", 8),
            ("kdlp", 4),
            ("linuxkernel", 8),
            ("kernellinux", 11),
        ] {
            let mut session = guessing(word);
            assert_eq!(session.write(word.as_bytes()), Ok(expected), "{word}");
            assert_eq!(session.outcome(), Some(Outcome::Won));
        }
    }

    #[test]
    fn leading_invalid_byte_is_an_error() {
        let mut session = guessing("apple");
        assert_eq!(
            session.write(b"1"),
            Err(GameError::InvalidGuess { byte: b'1' })
        );
        assert_eq!(session.mask(), b"*****");
    }

    #[test]
    fn invalid_byte_after_progress_keeps_the_progress() {
        let mut session = guessing("apple");
        let report = session.write_report(b"az1p").unwrap();

        assert_eq!(
            report,
            WriteReport {
                consumed: 2,
                stop: WriteStop::Rejected {
                    byte: b'1',
                    index: 2
                }
            }
        );
        assert_eq!(report.into_result(), Ok(2));
        assert_eq!(session.mask(), b"a****");
        assert_eq!(session.mistakes(), 1);
    }

    #[test]
    fn zero_length_write_depends_on_phase() {
        let mut session = Session::new();
        assert_eq!(session.write(b""), Err(GameError::EmptyWord));

        let mut session = guessing("apple");
        assert_eq!(session.write(b""), Ok(0));
        assert_eq!(session.mask(), b"*****");

        session.write(b"aple").unwrap();
        assert_eq!(session.write(b""), Err(GameError::GameFinished));
    }

    #[test]
    fn finished_rejects_any_write() {
        let mut session = guessing("a");
        session.write(b"a").unwrap();
        assert_eq!(session.write(b"b"), Err(GameError::GameFinished));
        assert_eq!(session.write(b"1"), Err(GameError::GameFinished));
    }

    #[test]
    fn accepted_write_rewinds_cursor() {
        let mut session = guessing("apple");
        session.read(100);
        assert_eq!(session.cursor(), 68);

        assert_eq!(session.write(b""), Ok(0));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.read(100).len(), 68);
    }

    #[test]
    fn rejected_write_keeps_cursor() {
        let mut session = guessing("apple");
        session.read(4);
        assert!(session.write(b"!").is_err());
        assert_eq!(session.cursor(), 4);
    }
}
