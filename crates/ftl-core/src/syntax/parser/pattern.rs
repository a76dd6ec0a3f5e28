//! Patterns and multiline indentation
//!
//! A pattern is scanned into raw pieces first (text runs, line breaks,
//! indents and placeables) and assembled afterwards, because the indent to
//! strip is only known once the first continuation line has been seen.
//!
//! A line continues the pattern when it is indented and does not start with
//! `[`, `*`, `.` or `}`, or when it starts with `{` at any indent. Blank
//! lines in between are kept as line breaks. The first continuation line
//! fixes the common indent; every continuation line loses up to that many
//! leading spaces.

use super::{PResult, Parser, ParserError, ParserErrorKind};
use crate::syntax::ast::{Expression, Pattern, PatternElement};
use crate::syntax::cursor::Cursor;
use crate::syntax::depth::DepthGuard;

#[derive(Debug)]
enum Piece<'s> {
    Text(&'s str),
    Newlines(usize),
    Indent(usize),
    Placeable(Expression),
}

impl Parser {
    /// Pattern after `=` or a variant key. `None` when there is nothing but
    /// blank space before the entry ends.
    pub(super) fn pattern<'s>(
        &self,
        start: Cursor<'s>,
        guard: DepthGuard,
    ) -> PResult<'s, Option<Pattern>> {
        let mut pieces = Vec::new();
        let mut cursor = start.skip_spaces();

        while !cursor.is_eof() {
            if cursor.at_line_end() {
                match continuation(cursor) {
                    Some((newlines, indent, next)) => {
                        pieces.push(Piece::Newlines(newlines));
                        pieces.push(Piece::Indent(indent));
                        cursor = next;
                        continue;
                    }
                    None => break,
                }
            }

            match cursor.current()? {
                '{' => {
                    let (expression, next) = self.placeable(cursor, guard)?;
                    pieces.push(Piece::Placeable(expression));
                    cursor = next;
                }
                '}' => {
                    return Err(ParserError::at(
                        ParserErrorKind::UnbalancedClosingBrace,
                        &cursor,
                    ));
                }
                _ => {
                    let (text, next) =
                        cursor.take_while(|ch| !matches!(ch, '{' | '}' | '\n' | '\r'));
                    pieces.push(Piece::Text(text));
                    cursor = next;
                }
            }
        }

        Ok((assemble(pieces), cursor))
    }
}

/// At a line end: if the pattern goes on, return the number of line breaks
/// crossed, the indent of the continuation line, and the cursor after that
/// indent.
fn continuation(start: Cursor<'_>) -> Option<(usize, usize, Cursor<'_>)> {
    let mut cursor = start;
    let mut newlines = 0;
    loop {
        cursor = cursor.skip_line_end();
        newlines += 1;
        let (indent, after) = cursor.take_while(|ch| ch == ' ');
        if after.at_line_end() {
            cursor = after;
            continue;
        }
        let first = after.current().ok()?;
        let continues = match first {
            '{' => true,
            '[' | '*' | '.' | '}' => false,
            _ => !indent.is_empty(),
        };
        return continues.then_some((newlines, indent.len(), after));
    }
}

fn assemble(pieces: Vec<Piece<'_>>) -> Option<Pattern> {
    let common = pieces
        .iter()
        .find_map(|piece| match piece {
            Piece::Indent(indent) => Some(*indent),
            _ => None,
        })
        .unwrap_or(0);

    let mut elements = Vec::new();
    let mut buffer = String::new();
    let mut started = false;

    for piece in pieces {
        match piece {
            Piece::Newlines(count) => {
                if started {
                    buffer.extend(std::iter::repeat_n('\n', count));
                }
            }
            Piece::Indent(indent) => {
                let kept = indent - indent.min(common);
                buffer.extend(std::iter::repeat_n(' ', kept));
            }
            Piece::Text(text) => {
                started = true;
                buffer.push_str(text);
            }
            Piece::Placeable(expression) => {
                started = true;
                if !buffer.is_empty() {
                    elements.push(PatternElement::TextElement {
                        value: std::mem::take(&mut buffer),
                    });
                }
                elements.push(PatternElement::Placeable { expression });
            }
        }
    }

    let trimmed = buffer.trim_end_matches(' ');
    if !trimmed.is_empty() {
        elements.push(PatternElement::TextElement {
            value: trimmed.to_string(),
        });
    }

    (!elements.is_empty()).then(|| Pattern::new(elements))
}
