//! Messages, terms, attributes and identifiers

use super::{PResult, Parser, ParserError, ParserErrorKind};
use crate::syntax::ast::{Attribute, Identifier, Message, Span, Term};
use crate::syntax::cursor::Cursor;
use crate::syntax::depth::DepthGuard;

impl Parser {
    pub(super) fn message<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, Message> {
        let (id, cursor) = self.identifier(start)?;
        let cursor = expect(cursor.skip_spaces(), '=')?;
        let (value, cursor) = self.pattern(cursor, guard)?;
        let (attributes, cursor) = self.attributes(cursor, guard)?;

        if value.is_none() && attributes.is_empty() {
            return Err(ParserError::new(
                ParserErrorKind::ExpectedMessageField { entry_id: id.name },
                Span::new(start.pos(), cursor.pos()),
            ));
        }

        let message = Message {
            id,
            value,
            attributes,
            comment: None,
        };
        Ok((message, cursor.skip_line_end()))
    }

    pub(super) fn term<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, Term> {
        let (id, cursor) = self.identifier(expect(start, '-')?)?;
        let cursor = expect(cursor.skip_spaces(), '=')?;
        let (value, cursor) = self.pattern(cursor, guard)?;
        let Some(value) = value else {
            return Err(ParserError::new(
                ParserErrorKind::ExpectedTermField { entry_id: id.name },
                Span::new(start.pos(), cursor.pos()),
            ));
        };
        let (attributes, cursor) = self.attributes(cursor, guard)?;

        let term = Term {
            id,
            value,
            attributes,
            comment: None,
        };
        Ok((term, cursor.skip_line_end()))
    }

    /// Zero or more `.name = pattern` lines following an entry's value.
    fn attributes<'s>(
        &self,
        mut cursor: Cursor<'s>,
        guard: DepthGuard,
    ) -> PResult<'s, Vec<Attribute>> {
        let mut attributes = Vec::new();
        loop {
            let look = cursor.skip_whitespace();
            if !cursor.at_line_end() || !look.is_current('.') {
                break;
            }
            let (attribute, next) = self.attribute(look, guard)?;
            attributes.push(attribute);
            cursor = next;
        }
        Ok((attributes, cursor))
    }

    fn attribute<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, Attribute> {
        let (id, cursor) = self.identifier(expect(start, '.')?)?;
        let cursor = expect(cursor.skip_spaces(), '=')?;
        let (value, cursor) = self.pattern(cursor, guard)?;
        let value = value.ok_or_else(|| ParserError::at(ParserErrorKind::MissingValue, &cursor))?;
        Ok((Attribute { id, value }, cursor))
    }

    /// `[a-zA-Z][a-zA-Z0-9_-]*`, at most `max_identifier_length` long.
    pub(super) fn identifier<'s>(&self, start: Cursor<'s>) -> PResult<'s, Identifier> {
        match start.current() {
            Ok(ch) if ch.is_ascii_alphabetic() => {}
            _ => {
                return Err(ParserError::at(
                    ParserErrorKind::ExpectedCharRange {
                        range: "a-zA-Z".to_string(),
                    },
                    &start,
                ));
            }
        }

        let max = self.config().max_identifier_length;
        let mut taken = 0;
        let (name, cursor) = start.take_while(|ch| {
            taken += 1;
            taken <= max.saturating_add(1) && (ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        });
        if name.len() > max {
            return Err(ParserError::new(
                ParserErrorKind::IdentifierTooLong { max },
                Span::new(start.pos(), cursor.pos()),
            ));
        }
        Ok((Identifier::new(name), cursor))
    }
}

pub(super) fn expect(cursor: Cursor<'_>, token: char) -> Result<Cursor<'_>, ParserError> {
    if cursor.is_current(token) {
        Ok(cursor.advance(1))
    } else {
        Err(ParserError::expected(token, &cursor))
    }
}
