use bytes::{BufMut, Bytes, BytesMut};

use crate::gallows::GALLOWS_SIZE;
use crate::session::{Phase, Session};

/// Read buffer of a session that has no secret word yet.
pub const PROMPT: &[u8] = b"Please enter the word to be guessed\n";

/// Mask cell for a letter that has not been guessed.
pub const HIDDEN: u8 = b'*';

/// Length of the buffer [`render`] would produce.
pub fn encoded_len(session: &Session) -> usize {
    match session.phase() {
        Phase::Choosing => PROMPT.len(),
        Phase::Guessing | Phase::Finished => session.word_len() + 1 + GALLOWS_SIZE,
    }
}

/// Encode the read buffer for the session's current state into `dst`.
///
/// Layout:
/// ```text
/// choosing:           "Please enter the word to be guessed\n"
/// guessing/finished:  <mask> '\n' <62-byte gallows>
/// ```
/// The gallows drawing ends with `'\n'`, which terminates the buffer.
pub fn encode_board(session: &Session, dst: &mut BytesMut) {
    dst.reserve(encoded_len(session));
    match session.phase() {
        Phase::Choosing => dst.put_slice(PROMPT),
        Phase::Guessing | Phase::Finished => {
            dst.put_slice(session.mask());
            dst.put_u8(b'\n');
            dst.put_slice(session.gallows().as_bytes());
        }
    }
}

/// The full read buffer for the session's current state.
pub fn render(session: &Session) -> Bytes {
    let mut buf = BytesMut::new();
    encode_board(session, &mut buf);
    buf.freeze()
}

/// Bytes `[pos, pos + max_len)` of the read buffer, clipped to its end.
///
/// Empty at or past the end.
pub fn read_window(session: &Session, pos: u64, max_len: usize) -> Bytes {
    let board = render(session);
    let Ok(start) = usize::try_from(pos) else {
        return Bytes::new();
    };
    if start >= board.len() {
        return Bytes::new();
    }
    let end = start + max_len.min(board.len() - start);
    board.slice(start..end)
}

impl Session {
    /// Read up to `max_len` bytes at the cursor and advance it past them.
    pub fn read(&mut self, max_len: usize) -> Bytes {
        let chunk = read_window(self, self.cursor, max_len);
        self.cursor += chunk.len() as u64;
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallows::GALLOWS_TEMPLATE;

    fn board_with_mask(mask: &[u8], gallows: &[u8]) -> Vec<u8> {
        let mut expected = mask.to_vec();
        expected.push(b'\n');
        expected.extend_from_slice(gallows);
        expected
    }

    #[test]
    fn choosing_renders_prompt() {
        let session = Session::new();
        assert_eq!(render(&session).as_ref(), PROMPT);
        assert_eq!(encoded_len(&session), 36);
    }

    #[test]
    fn guessing_renders_mask_newline_gallows() {
        let mut session = Session::new();
        session.set_word(b"apple").unwrap();

        let board = render(&session);
        assert_eq!(board.len(), 5 + 1 + GALLOWS_SIZE);
        assert_eq!(board.as_ref(), board_with_mask(b"*****", GALLOWS_TEMPLATE));
        assert_eq!(encoded_len(&session), board.len());
    }

    #[test]
    fn missed_letter_places_head_after_mask() {
        let mut session = Session::new();
        session.set_word(b"apple").unwrap();
        session.guess(b'z').unwrap();

        let mut gallows = *GALLOWS_TEMPLATE;
        gallows[28] = b'O';
        let board = render(&session);
        assert_eq!(board.as_ref(), board_with_mask(b"*****", &gallows));
        assert_eq!(board[6 + 28], b'O');
    }

    #[test]
    fn finished_game_still_renders_board() {
        let mut session = Session::new();
        session.set_word(b"ab").unwrap();
        session.guess(b'a').unwrap();
        session.guess(b'b').unwrap();

        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(&render(&session)[..3], b"ab\n");
    }

    #[test]
    fn read_advances_cursor_and_hits_eof() {
        let mut session = Session::new();

        assert_eq!(session.read(10).as_ref(), &PROMPT[..10]);
        assert_eq!(session.cursor(), 10);
        assert_eq!(session.read(100).as_ref(), &PROMPT[10..]);
        assert_eq!(session.cursor(), PROMPT.len() as u64);
        assert!(session.read(100).is_empty());
        assert_eq!(session.cursor(), PROMPT.len() as u64);
    }

    #[test]
    fn window_is_clipped_to_buffer() {
        let session = Session::new();
        assert!(read_window(&session, 36, 1).is_empty());
        assert!(read_window(&session, u64::MAX, 1).is_empty());
        assert!(read_window(&session, 0, 0).is_empty());
        assert_eq!(read_window(&session, 30, 500).as_ref(), &PROMPT[30..]);
    }
}
