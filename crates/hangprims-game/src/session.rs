use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encode::HIDDEN;
use crate::error::{GameError, Result};
use crate::gallows::{Gallows, MAX_MISTAKES};
use crate::letters::{is_letter, LetterSet};

/// Where a session is in its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No secret word yet; the next write chooses one.
    Choosing,
    /// Writes are letter guesses.
    Guessing,
    /// Won or lost; only a reset is accepted.
    Finished,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
}

/// Effect of a single accepted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    /// A new correct letter; every occurrence was revealed.
    Revealed { letter: u8, positions: usize },
    /// A new wrong letter; one more limb was drawn.
    Missed { letter: u8, mistakes: u8 },
    /// The letter had already been guessed; nothing changed.
    Repeated { letter: u8 },
}

/// One hangman game.
///
/// A session starts in [`Phase::Choosing`]. The secret word and guess mask
/// always have the same length, and a mask cell is revealed exactly when
/// its letter is in the correct-guess set.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    outcome: Option<Outcome>,
    secret: Vec<u8>,
    mask: Vec<u8>,
    present: LetterSet,
    correct: LetterSet,
    incorrect: LetterSet,
    mistakes: u8,
    gallows: Gallows,
    pub(crate) cursor: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Choosing,
            outcome: None,
            secret: Vec::new(),
            mask: Vec::new(),
            present: LetterSet::EMPTY,
            correct: LetterSet::EMPTY,
            incorrect: LetterSet::EMPTY,
            mistakes: 0,
            gallows: Gallows::new(),
            cursor: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Set once the session reaches [`Phase::Finished`].
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Guess mask: revealed letters and `*` for the rest. Empty while choosing.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn word_len(&self) -> usize {
        self.secret.len()
    }

    pub fn mistakes(&self) -> u8 {
        self.mistakes
    }

    pub fn gallows(&self) -> &Gallows {
        &self.gallows
    }

    /// Current read position.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn correct_guesses(&self) -> LetterSet {
        self.correct
    }

    pub fn incorrect_guesses(&self) -> LetterSet {
        self.incorrect
    }

    /// Choose the secret word.
    ///
    /// The word is validated in full before anything is stored; on error
    /// the session is left exactly as it was.
    pub fn set_word(&mut self, word: &[u8]) -> Result<()> {
        if self.phase != Phase::Choosing {
            return Err(GameError::WordAlreadyChosen);
        }
        if word.is_empty() {
            return Err(GameError::EmptyWord);
        }
        if let Some(index) = word.iter().position(|&byte| !is_letter(byte)) {
            return Err(GameError::InvalidWordByte {
                byte: word[index],
                index,
            });
        }

        let secret = owned_copy(word)?;
        let mut mask = owned_copy(word)?;
        mask.fill(HIDDEN);

        self.present = LetterSet::from_word(&secret);
        self.secret = secret;
        self.mask = mask;
        self.correct.clear();
        self.incorrect.clear();
        self.mistakes = 0;
        self.gallows.clear();
        self.phase = Phase::Guessing;

        debug!(
            len = self.secret.len(),
            distinct = self.present.len(),
            "secret word chosen"
        );
        Ok(())
    }

    /// Apply one letter guess.
    ///
    /// Invalid bytes are rejected without changing anything. A guess that
    /// completes the word or draws the last limb moves the session to
    /// [`Phase::Finished`].
    pub fn guess(&mut self, letter: u8) -> Result<Guess> {
        match self.phase {
            Phase::Choosing => return Err(GameError::WordNotChosen),
            Phase::Finished => return Err(GameError::GameFinished),
            Phase::Guessing => {}
        }
        if !is_letter(letter) {
            return Err(GameError::InvalidGuess { byte: letter });
        }

        if self.present.contains(letter) {
            if !self.correct.insert(letter) {
                return Ok(Guess::Repeated { letter });
            }

            let mut positions = 0;
            for (cell, &secret) in self.mask.iter_mut().zip(&self.secret) {
                if secret == letter {
                    *cell = secret;
                    positions += 1;
                }
            }
            if self.correct == self.present {
                self.finish(Outcome::Won);
            }
            return Ok(Guess::Revealed { letter, positions });
        }

        if !self.incorrect.insert(letter) {
            return Ok(Guess::Repeated { letter });
        }
        self.mistakes += 1;
        self.gallows.draw_next();
        if self.mistakes >= MAX_MISTAKES {
            self.finish(Outcome::Lost);
        }
        Ok(Guess::Missed {
            letter,
            mistakes: self.mistakes,
        })
    }

    /// Return to [`Phase::Choosing`], releasing the word storage.
    ///
    /// Safe to call from any phase, any number of times.
    pub fn reset(&mut self) {
        self.secret = Vec::new();
        self.mask = Vec::new();
        self.present.clear();
        self.correct.clear();
        self.incorrect.clear();
        self.mistakes = 0;
        self.gallows.clear();
        self.cursor = 0;
        self.outcome = None;
        self.phase = Phase::Choosing;
    }

    /// Read-only view that never exposes an unsolved secret word.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            outcome: self.outcome,
            mask: String::from_utf8_lossy(&self.mask).into_owned(),
            word_len: self.secret.len(),
            mistakes: self.mistakes,
            cursor: self.cursor,
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Finished;
        self.outcome = Some(outcome);
        info!(?outcome, mistakes = self.mistakes, "game finished");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn owned_copy(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut owned = Vec::new();
    owned
        .try_reserve_exact(bytes.len())
        .map_err(|_| GameError::OutOfMemory {
            requested: bytes.len(),
        })?;
    owned.extend_from_slice(bytes);
    Ok(owned)
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    pub mask: String,
    pub word_len: usize,
    pub mistakes: u8,
    pub cursor: u64,
}
