use crate::error::{ErrorKind, Failure, Result};

/// Read position over a borrowed input buffer.
///
/// `position() + remaining()` always equals the input length, and the
/// unread bytes are always a suffix of the input.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread part of the input.
    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.src[self.pos..]
    }

    /// Byte `offset` positions ahead. Past the end this is `UnexpectedEnd`
    /// carrying `expected`, so truncated input still says what was missing.
    pub(crate) fn peek(&self, offset: usize, expected: &'static str) -> Result<u8> {
        self.rest()
            .get(offset)
            .copied()
            .ok_or_else(|| Failure::new(ErrorKind::UnexpectedEnd, expected, self.src.len()))
    }

    /// Current byte, `None` at end of input.
    pub(crate) fn current(&self) -> Option<u8> {
        self.rest().first().copied()
    }

    /// Moves forward `n` bytes. Moving zero bytes always succeeds, even at
    /// end of input.
    pub(crate) fn advance(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        if n > self.remaining() {
            return Err(self.end_of_input());
        }
        self.pos += n;
        Ok(())
    }

    /// Skips space, tab, line feed and carriage return. Nothing else counts
    /// as whitespace between tokens.
    pub(crate) fn skip_whitespace(&mut self) {
        let skipped = self
            .rest()
            .iter()
            .take_while(|&&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
            .count();
        self.pos += skipped;
    }

    pub(crate) fn fail(&self, kind: ErrorKind, expected: &'static str) -> Failure {
        Failure::new(kind, expected, self.pos)
    }

    pub(crate) fn syntax(&self, expected: &'static str) -> Failure {
        self.fail(ErrorKind::InvalidSyntax, expected)
    }

    fn end_of_input(&self) -> Failure {
        Failure::new(ErrorKind::UnexpectedEnd, "expected more input", self.src.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_reads_ahead_without_moving() {
        let cursor = Cursor::new(b"abc");
        assert_eq!(cursor.peek(0, "expected `a`"), Ok(b'a'));
        assert_eq!(cursor.peek(2, "expected `c`"), Ok(b'c'));
        assert_eq!(cursor.position(), 0);
        let err = cursor.peek(3, "expected `d`").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd);
        assert_eq!(err.expected, "expected `d`");
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn advance_keeps_position_and_remaining_in_sync() {
        let mut cursor = Cursor::new(b"abcd");
        cursor.advance(3).unwrap();
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(cursor.rest(), b"d");
    }

    #[test]
    fn advance_past_end_fails_and_stays_put() {
        let mut cursor = Cursor::new(b"ab");
        let err = cursor.advance(3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn advance_zero_is_a_no_op_at_end() {
        let mut cursor = Cursor::new(b"");
        assert_eq!(cursor.advance(0), Ok(()));
        let mut cursor = Cursor::new(b"x");
        cursor.advance(1).unwrap();
        assert_eq!(cursor.advance(0), Ok(()));
        assert!(cursor.is_empty());
    }

    #[test]
    fn whitespace_is_the_four_grammar_bytes() {
        let mut cursor = Cursor::new(b" \t\r\n x");
        cursor.skip_whitespace();
        assert_eq!(cursor.current(), Some(b'x'));

        // form feed and vertical tab are not json whitespace
        let mut cursor = Cursor::new(b"\x0c\x0bx");
        cursor.skip_whitespace();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn whitespace_only_input_is_consumed() {
        let mut cursor = Cursor::new(b"  \n\t");
        cursor.skip_whitespace();
        assert!(cursor.is_empty());
        assert_eq!(cursor.current(), None);
    }
}
