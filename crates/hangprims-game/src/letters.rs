//! Letter histograms.
//!
//! The engine only deals in the 26 lowercase ASCII letters, so every
//! per-letter set fits in the low 26 bits of a `u32`.

/// True if `byte` is one of `a..=z`.
pub fn is_letter(byte: u8) -> bool {
    byte.is_ascii_lowercase()
}

fn bit(letter: u8) -> Option<u32> {
    is_letter(letter).then(|| 1u32 << (letter - b'a'))
}

/// A set over the 26 lowercase letters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const EMPTY: Self = Self(0);

    /// Collect every letter occurring in `word`. Non-letters are ignored.
    pub fn from_word(word: &[u8]) -> Self {
        word.iter().fold(Self::EMPTY, |mut set, &byte| {
            set.insert(byte);
            set
        })
    }

    pub fn contains(self, letter: u8) -> bool {
        bit(letter).is_some_and(|mask| self.0 & mask != 0)
    }

    /// Add `letter`; returns true if it was not already present.
    ///
    /// Non-letters are never inserted.
    pub fn insert(&mut self, letter: u8) -> bool {
        match bit(letter) {
            Some(mask) if self.0 & mask == 0 => {
                self.0 |= mask;
                true
            }
            _ => false,
        }
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Letters in alphabetical order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (b'a'..=b'z').filter(move |&letter| self.contains(letter))
    }
}
