//! Syntax error kinds raised by the parser
//!
//! Parser errors never escape [`parse`](super::parse): each one is folded
//! into the [`Junk`](crate::syntax::ast::Junk) entry that replaces the failed
//! entry, as an [`Annotation`](crate::syntax::ast::Annotation).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::syntax::ast::Span;
use crate::syntax::cursor::{Cursor, EndOfInput};
use crate::syntax::depth::DepthExceeded;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParserErrorKind {
    #[error("expected an entry start (message, term or comment)")]
    ExpectedEntry,
    #[error("expected token `{token}`")]
    ExpectedToken { token: char },
    #[error("expected a character from range {range}")]
    ExpectedCharRange { range: String },
    #[error("expected message `{entry_id}` to have a value or attributes")]
    ExpectedMessageField { entry_id: String },
    #[error("expected term `-{entry_id}` to have a value")]
    ExpectedTermField { entry_id: String },
    #[error("the callee has to be an identifier without attribute accessor")]
    ForbiddenCallee,
    #[error("named argument names must be identifiers")]
    ForbiddenKey,
    #[error("expected one of the variants to be marked as default (*)")]
    MissingDefaultVariant,
    #[error("only one variant can be marked as default (*)")]
    MultipleDefaultVariants,
    #[error("expected at least one variant after `->`")]
    MissingVariants,
    #[error("expected a value")]
    MissingValue,
    #[error("expected a string or number literal")]
    MissingLiteral,
    #[error("message references cannot be used as selectors")]
    MessageReferenceAsSelector,
    #[error("terms cannot be used as selectors")]
    TermReferenceAsSelector,
    #[error("message attributes cannot be used as selectors")]
    MessageAttributeAsSelector,
    #[error("term attributes cannot be used as placeables")]
    TermAttributeAsPlaceable,
    #[error("expected a simple expression as selector")]
    ExpectedSimpleExpressionAsSelector,
    #[error("unterminated string literal")]
    UnterminatedStringLiteral,
    #[error("positional arguments must not follow named arguments")]
    PositionalArgumentFollowsNamed,
    #[error("the `{name}` argument appears twice")]
    DuplicatedNamedArgument { name: String },
    #[error("term calls accept named arguments only")]
    PositionalArgumentInTermCall,
    #[error("unknown escape sequence: \\{sequence}")]
    UnknownEscapeSequence { sequence: String },
    #[error("invalid unicode escape sequence: \\{sequence}")]
    InvalidUnicodeEscapeSequence { sequence: String },
    #[error("unbalanced closing brace in text")]
    UnbalancedClosingBrace,
    #[error("expected an inline expression")]
    ExpectedInlineExpression,
    #[error("identifier is longer than {max} characters")]
    IdentifierTooLong { max: usize },
    #[error("source of {size} bytes exceeds the limit of {max} bytes")]
    SourceTooLarge { size: usize, max: usize },
    #[error("placeables nested deeper than {max_depth} levels")]
    DepthExceeded { max_depth: usize },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
}

/// A syntax failure located in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at {}..{})", span.start, span.end)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Error pointing at the character under `cursor`.
    pub fn at(kind: ParserErrorKind, cursor: &Cursor<'_>) -> Self {
        let start = cursor.pos();
        let end = cursor.advance(1).pos().max(start);
        Self::new(kind, Span::new(start, end))
    }

    pub fn expected(token: char, cursor: &Cursor<'_>) -> Self {
        Self::at(ParserErrorKind::ExpectedToken { token }, cursor)
    }
}

impl From<EndOfInput> for ParserError {
    fn from(err: EndOfInput) -> Self {
        Self::new(
            ParserErrorKind::UnexpectedEndOfInput,
            Span::new(err.offset, err.offset),
        )
    }
}

impl ParserError {
    pub(crate) fn depth(err: DepthExceeded, cursor: &Cursor<'_>) -> Self {
        Self::at(
            ParserErrorKind::DepthExceeded {
                max_depth: err.max_depth,
            },
            cursor,
        )
    }
}
