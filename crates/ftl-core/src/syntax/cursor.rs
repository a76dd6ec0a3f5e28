//! Immutable scanning cursor over FTL source text
//!
//! A [`Cursor`] is a `(source, position)` pair. Every movement returns a new
//! cursor; nothing is mutated in place. End of input is a derived property
//! ([`Cursor::is_eof`]) and reading the current character past it is a typed
//! failure ([`EndOfInput`]) rather than a sentinel value.
//!
//! Positions are byte offsets into the source and always sit on a UTF-8
//! character boundary.

use thiserror::Error;

/// Attempted to read the current character at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of input at offset {offset}")]
pub struct EndOfInput {
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Byte offset of the cursor.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Unconsumed remainder of the source.
    pub fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    /// Character at the cursor.
    pub fn current(&self) -> Result<char, EndOfInput> {
        self.rest()
            .chars()
            .next()
            .ok_or(EndOfInput { offset: self.pos })
    }

    /// Look ahead `offset` characters (`peek(0)` is the current character).
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    pub fn is_current(&self, ch: char) -> bool {
        self.rest().starts_with(ch)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Advance by `n` characters, clamped to the end of the source.
    pub fn advance(self, n: usize) -> Self {
        let rest = self.rest();
        let delta = rest
            .char_indices()
            .nth(n)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        Self {
            source: self.source,
            pos: self.pos + delta,
        }
    }

    /// Skip U+0020 spaces only. Tabs are not blank in FTL.
    pub fn skip_spaces(self) -> Self {
        let skipped = self.rest().bytes().take_while(|b| *b == b' ').count();
        Self {
            source: self.source,
            pos: self.pos + skipped,
        }
    }

    /// Skip spaces and line ends.
    pub fn skip_whitespace(self) -> Self {
        let skipped = self
            .rest()
            .bytes()
            .take_while(|b| matches!(b, b' ' | b'\n' | b'\r'))
            .count();
        Self {
            source: self.source,
            pos: self.pos + skipped,
        }
    }

    /// True at LF or CR (CRLF and bare CR are both line ends).
    pub fn at_line_end(&self) -> bool {
        matches!(self.rest().as_bytes().first(), Some(b'\n' | b'\r'))
    }

    /// Consume one line end if present; otherwise return the cursor unchanged.
    pub fn skip_line_end(self) -> Self {
        let rest = self.rest();
        let step = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            1
        } else {
            0
        };
        Self {
            source: self.source,
            pos: self.pos + step,
        }
    }

    /// Skip lines that hold nothing but spaces. A trailing run of spaces
    /// before end of input counts as blank too.
    pub fn skip_blank_block(self) -> Self {
        let mut cursor = self;
        loop {
            let after_spaces = cursor.skip_spaces();
            if after_spaces.at_line_end() {
                cursor = after_spaces.skip_line_end();
            } else if after_spaces.is_eof() {
                return after_spaces;
            } else {
                return cursor;
            }
        }
    }

    /// Move to the start of the next line (or end of input).
    pub fn skip_to_next_line(self) -> Self {
        let rest = self.rest();
        match rest.find(['\n', '\r']) {
            Some(offset) => Self {
                source: self.source,
                pos: self.pos + offset,
            }
            .skip_line_end(),
            None => Self {
                source: self.source,
                pos: self.source.len(),
            },
        }
    }

    /// Consume characters while `predicate` holds, returning the slice taken.
    pub fn take_while(self, mut predicate: impl FnMut(char) -> bool) -> (&'s str, Self) {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, ch)| !predicate(*ch))
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        (
            &rest[..len],
            Self {
                source: self.source,
                pos: self.pos + len,
            },
        )
    }

    /// Source text between this cursor and a later one.
    pub fn slice_to(&self, end: &Cursor<'s>) -> &'s str {
        let end = end.pos.clamp(self.pos, self.source.len());
        &self.source[self.pos..end]
    }

    /// The next `n` characters (fewer at end of input).
    pub fn slice_ahead(&self, n: usize) -> &'s str {
        let end = self.advance(n);
        self.slice_to(&end)
    }

    /// 1-based line and column of the cursor.
    ///
    /// Linear in the position; meant for error paths. Use
    /// [`LineIndex`](super::line_index::LineIndex) for repeated lookups.
    pub fn compute_line_col(&self) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        let mut chars = self.source[..self.pos].chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    line += 1;
                    column = 1;
                }
                '\r' => {
                    if chars.peek() != Some(&'\n') {
                        line += 1;
                        column = 1;
                    }
                }
                _ => column += 1,
            }
        }
        (line, column)
    }
}
