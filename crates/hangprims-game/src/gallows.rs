//! The gallows drawing.
//!
//! The layout is part of the wire contract: existing clients compare the
//! rendered bytes verbatim.
//!
//! ```text
//!   _______     0-9
//!   |     |     10-19
//!   |     O     20-29
//!   |    /|\    30-40
//!   |    / \    41-51
//!   |           52-55
//! __|__         56-61
//! ```

use std::fmt;

/// Size of the drawing in bytes.
pub const GALLOWS_SIZE: usize = 62;

/// Mistakes allowed before the game is lost.
pub const MAX_MISTAKES: u8 = 6;

/// The empty drawing.
pub const GALLOWS_TEMPLATE: &[u8; GALLOWS_SIZE] =
    b"  _______\n  |     |\n  |      \n  |       \n  |       \n  |\n__|__\n";

/// `(offset, glyph)` for each limb, in the order mistakes draw them.
pub const LIMBS: [(usize, u8); MAX_MISTAKES as usize] = [
    (28, b'O'),
    (38, b'|'),
    (37, b'/'),
    (39, b'\\'),
    (48, b'/'),
    (50, b'\\'),
];

/// The drawing with however many limbs have been drawn so far.
#[derive(Clone, PartialEq, Eq)]
pub struct Gallows {
    cells: [u8; GALLOWS_SIZE],
    drawn: u8,
}

impl Gallows {
    pub fn new() -> Self {
        Self {
            cells: *GALLOWS_TEMPLATE,
            drawn: 0,
        }
    }

    /// Overlay the next limb. Returns its glyph, or `None` once all six are drawn.
    pub fn draw_next(&mut self) -> Option<u8> {
        let (offset, glyph) = *LIMBS.get(usize::from(self.drawn))?;
        self.cells[offset] = glyph;
        self.drawn += 1;
        Some(glyph)
    }

    pub fn limbs_drawn(&self) -> u8 {
        self.drawn
    }

    pub fn is_complete(&self) -> bool {
        self.drawn >= MAX_MISTAKES
    }

    /// Restore the unmodified template.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Gallows {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gallows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallows")
            .field("drawn", &self.drawn)
            .field("cells", &String::from_utf8_lossy(&self.cells))
            .finish()
    }
}
