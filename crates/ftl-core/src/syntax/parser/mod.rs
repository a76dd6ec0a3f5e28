//! Recursive-descent FTL parser
//!
//! Every grammar rule is a method taking a [`Cursor`] and returning the
//! parsed node with the advanced cursor ([`PResult`]). Rules never recover on
//! their own: an error travels up to the entry loop in [`Parser::parse`],
//! which turns the failed region into [`Junk`] and carries on with the next
//! entry. `parse` itself cannot fail.
//!
//! Input size, identifier length and placeable nesting are bounded by
//! [`ParserConfig`].

mod entry;
pub mod errors;
mod expression;
mod pattern;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

pub use errors::{ParserError, ParserErrorKind};

use super::ast::{Annotation, Comment, CommentKind, Entry, Junk, Resource, Span};
use super::cursor::Cursor;
use super::depth::{DEFAULT_MAX_DEPTH, DepthGuard};
use super::line_index::LineIndex;

/// Parsed value plus the cursor after it.
pub type PResult<'s, T> = Result<(T, Cursor<'s>), ParserError>;

pub const DEFAULT_MAX_IDENTIFIER_LENGTH: usize = 256;
pub const DEFAULT_MAX_SOURCE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub max_depth: usize,
    pub max_identifier_length: usize,
    /// In bytes.
    pub max_source_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_identifier_length: DEFAULT_MAX_IDENTIFIER_LENGTH,
            max_source_size: DEFAULT_MAX_SOURCE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

/// Parse with the default limits.
pub fn parse(source: &str) -> Resource {
    Parser::default().parse(source)
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&self, source: &str) -> Resource {
        if source.len() > self.config.max_source_size {
            warn!(
                "Source of {} bytes exceeds the {} byte limit, not parsing",
                source.len(),
                self.config.max_source_size
            );
            return Resource::new(vec![Entry::Junk(oversized(
                source,
                self.config.max_source_size,
            ))]);
        }

        let index = LineIndex::new(source);
        let mut body = Vec::new();
        let mut pending: Option<Comment> = None;
        let mut cursor = Cursor::new(source).skip_blank_block();

        while !cursor.is_eof() {
            let (entry, next) = match self.entry(cursor) {
                Ok(parsed) => parsed,
                Err(err) => {
                    let (junk, next) = recover(cursor, err, source, &index);
                    (Entry::Junk(junk), next)
                }
            };

            let entry = match (pending.take(), entry) {
                (Some(comment), Entry::Message(message)) => {
                    Entry::Message(message.with_comment(Some(comment)))
                }
                (Some(comment), Entry::Term(term)) => Entry::Term(term.with_comment(Some(comment))),
                (Some(comment), other) => {
                    body.push(Entry::Comment(comment));
                    other
                }
                (None, other) => other,
            };

            let after = next.skip_blank_block();
            match entry {
                // A `#` comment directly above a message or term belongs to it.
                Entry::Comment(comment)
                    if comment.kind == CommentKind::Comment
                        && after.pos() == next.pos()
                        && !after.is_eof() =>
                {
                    pending = Some(comment);
                }
                other => {
                    trace!("Parsed entry ending at offset {}", next.pos());
                    body.push(other);
                }
            }
            cursor = after;
        }

        if let Some(comment) = pending {
            body.push(Entry::Comment(comment));
        }
        Resource::new(body)
    }

    fn entry<'s>(&self, cursor: Cursor<'s>) -> PResult<'s, Entry> {
        let guard = DepthGuard::new(self.config.max_depth);
        match cursor.current()? {
            '#' => {
                let (comment, next) = self.comment(cursor)?;
                Ok((Entry::Comment(comment), next))
            }
            '-' => {
                let (term, next) = self.term(cursor, guard)?;
                Ok((Entry::Term(term), next))
            }
            ch if ch.is_ascii_alphabetic() => {
                let (message, next) = self.message(cursor, guard)?;
                Ok((Entry::Message(message), next))
            }
            _ => Err(ParserError::at(ParserErrorKind::ExpectedEntry, &cursor)),
        }
    }

    /// `#`, `##` or `###` lines; consecutive lines of one level merge.
    fn comment<'s>(&self, start: Cursor<'s>) -> PResult<'s, Comment> {
        let mut level = None;
        let mut lines: Vec<&'s str> = Vec::new();
        let mut cursor = start;

        loop {
            let (hashes, after) = cursor.take_while(|ch| ch == '#');
            let count = hashes.len();
            if count == 0 || level.is_some_and(|level| level != count) {
                break;
            }
            if count > 3 {
                if lines.is_empty() {
                    return Err(ParserError::expected(' ', &cursor.advance(3)));
                }
                break;
            }

            let content_start = if after.is_current(' ') {
                after.advance(1)
            } else if after.at_line_end() || after.is_eof() {
                after
            } else if lines.is_empty() {
                return Err(ParserError::expected(' ', &after));
            } else {
                break;
            };

            let (content, line_end) = content_start.take_while(|ch| ch != '\n' && ch != '\r');
            lines.push(content);
            level = Some(count);
            cursor = line_end.skip_line_end();
            if cursor.pos() == line_end.pos() {
                break;
            }
        }

        let kind = level
            .and_then(CommentKind::from_level)
            .ok_or_else(|| ParserError::at(ParserErrorKind::ExpectedEntry, &start))?;
        Ok((Comment::new(kind, lines.join("\n")), cursor))
    }
}

/// Skip from a failed entry to the next line that can start an entry, no
/// earlier than the line holding the error.
fn recover<'s>(
    start: Cursor<'s>,
    err: ParserError,
    source: &str,
    index: &LineIndex,
) -> (Junk, Cursor<'s>) {
    let location = index.line_col(source, err.span.start);
    let error_line_start = index.line_start(location.line).unwrap_or(0);

    let mut end = start.skip_to_next_line();
    while !end.is_eof() && (end.pos() < error_line_start || !starts_entry(&end)) {
        end = end.skip_to_next_line();
    }

    debug!(
        "Recovered from {} at offset {}, skipped {} bytes",
        err.kind,
        err.span.start,
        end.pos() - start.pos()
    );

    let annotation = Annotation {
        message: err.kind.to_string(),
        kind: err.kind,
        span: err.span,
        line: location.line,
        column: location.column,
    };
    let junk = Junk {
        content: start.slice_to(&end).to_string(),
        annotations: vec![annotation],
        span: Span::new(start.pos(), end.pos()),
    };
    (junk, end)
}

fn starts_entry(cursor: &Cursor<'_>) -> bool {
    matches!(cursor.current(), Ok(ch) if ch == '#' || ch == '-' || ch.is_ascii_alphabetic())
}

fn oversized(source: &str, max: usize) -> Junk {
    let kind = ParserErrorKind::SourceTooLarge {
        size: source.len(),
        max,
    };
    let span = Span::new(0, source.len());
    Junk {
        content: source.to_string(),
        annotations: vec![Annotation {
            message: kind.to_string(),
            kind,
            span,
            line: 1,
            column: 1,
        }],
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::{Pattern, PatternElement};

    fn text(value: &str) -> Option<Pattern> {
        Some(Pattern::text(value))
    }

    #[test]
    fn test_parse_simple_messages() {
        let resource = parse("hello = Hello\nbye = Bye\n");
        assert_eq!(resource.body.len(), 2);
        assert_eq!(resource.get_message("hello").unwrap().value, text("Hello"));
        assert_eq!(resource.get_message("bye").unwrap().value, text("Bye"));
    }

    #[test]
    fn test_comment_levels() {
        let resource = parse("### Resource\n\n## Group\n\n# Standalone\n\nkey = v\n");
        let kinds: Vec<_> = resource
            .body
            .iter()
            .filter_map(|entry| match entry {
                Entry::Comment(comment) => Some(comment.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                CommentKind::ResourceComment,
                CommentKind::GroupComment,
                CommentKind::Comment
            ]
        );
        assert_eq!(resource.get_message("key").unwrap().comment, None);
    }

    #[test]
    fn test_comment_attaches_without_blank_line() {
        let resource = parse("# Line one\n# Line two\nkey = v\n");
        assert_eq!(resource.body.len(), 1);
        let comment = resource.get_message("key").unwrap().comment.clone().unwrap();
        assert_eq!(comment.content, "Line one\nLine two");
    }

    #[test]
    fn test_group_comment_never_attaches() {
        let resource = parse("## Group\nkey = v\n");
        assert_eq!(resource.body.len(), 2);
    }

    #[test]
    fn test_comment_requires_space() {
        let resource = parse("#bad\nkey = v\n");
        assert_eq!(resource.junk().count(), 1);
        assert!(resource.get_message("key").is_some());
    }

    #[test]
    fn test_junk_recovery_resumes_at_next_entry() {
        let resource = parse("good = Good\nbad = {\n  more\nlater = Later\n");
        assert!(resource.get_message("good").is_some());
        assert!(resource.get_message("later").is_some());
        let junk: Vec<_> = resource.junk().collect();
        assert_eq!(junk.len(), 1);
        assert_eq!(junk[0].content, "bad = {\n  more\n");
        assert_eq!(junk[0].annotations[0].line, 4);
    }

    #[test]
    fn test_oversized_source_is_junk() {
        let parser = Parser::new(ParserConfig {
            max_source_size: 8,
            ..ParserConfig::default()
        });
        let resource = parser.parse("key = a long value\n");
        assert_eq!(resource.body.len(), 1);
        let junk = resource.junk().next().unwrap();
        assert_eq!(
            junk.annotations[0].kind,
            ParserErrorKind::SourceTooLarge { size: 19, max: 8 }
        );
    }

    #[test]
    fn test_crlf_and_bare_cr() {
        let resource = parse("a = A\r\nb = B\rc = C");
        assert_eq!(resource.messages().count(), 3);
        assert!(!resource.has_junk());
    }

    #[test]
    fn test_placeable_element() {
        let resource = parse("key = { $x }");
        let value = resource.get_message("key").unwrap().value.clone().unwrap();
        assert!(matches!(value.elements[0], PatternElement::Placeable { .. }));
    }
}
