//! AST to FTL text
//!
//! The serializer is the inverse of the parser: for any resource the parser
//! produced, `parse(serialize(r))` gives back `r` (Junk aside). Text that the
//! parser would read differently is escaped into string-literal placeables:
//!
//! - `{` and `}` in text become `{"{"}` and `{"}"}`
//! - `[`, `*` and `.` starting a continuation line are escaped
//! - leading spaces that would be taken for indentation, whitespace-only
//!   lines and trailing spaces at the end of a pattern are kept in
//!   `{"   "}` placeables
//!
//! Before any text is produced the tree is validated (see [`SerializeError`]);
//! an invalid tree has no textual form, so this is the one failure that
//! aborts the call.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::ast::*;
use super::depth::{DEFAULT_MAX_DEPTH, DepthExceeded, DepthGuard};
use super::validate::validate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("select expression has no default variant")]
    MissingDefaultVariant,
    #[error("select expression has {count} default variants")]
    MultipleDefaultVariants { count: usize },
    #[error("select expression has no variants")]
    MissingVariants,
    #[error("`{name}` is not a valid identifier")]
    InvalidIdentifier { name: String },
    #[error("`{raw}` is not a valid number literal")]
    InvalidNumberLiteral { raw: String },
    #[error("term `-{id}` is called with positional arguments")]
    PositionalArgumentInTermCall { id: String },
    #[error("named argument `{name}` must be a string or number literal")]
    InvalidNamedArgument { name: String },
    #[error("named argument `{name}` appears twice")]
    DuplicatedNamedArgument { name: String },
    #[error("{reason} cannot be used as a selector")]
    InvalidSelector { reason: &'static str },
    #[error("term attribute `-{id}.{attribute}` can only be used as a selector")]
    TermAttributeAsPlaceable { id: String, attribute: String },
    #[error("message `{id}` has neither a value nor attributes")]
    EmptyMessage { id: String },
    #[error("{context} has an empty pattern")]
    EmptyPattern { context: String },
    #[error(transparent)]
    DepthExceeded(#[from] DepthExceeded),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Check the tree before writing anything.
    pub validate: bool,
    /// Emit Junk entries verbatim instead of dropping them.
    pub with_junk: bool,
    pub max_depth: usize,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            validate: true,
            with_junk: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Serialize with the default options.
pub fn serialize(resource: &Resource) -> Result<String, SerializeError> {
    Serializer::default().serialize(resource)
}

#[derive(Debug, Clone, Default)]
pub struct Serializer {
    options: SerializerOptions,
}

impl Serializer {
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    pub fn serialize(&self, resource: &Resource) -> Result<String, SerializeError> {
        if self.options.validate {
            validate(resource, self.options.max_depth).inspect_err(|err| {
                debug!("Refusing to serialize invalid resource: {}", err);
            })?;
        }

        let guard = DepthGuard::new(self.options.max_depth);
        let mut out = String::new();
        let mut has_entries = false;
        let mut after_comment = false;

        for entry in &resource.body {
            match entry {
                Entry::Message(message) => {
                    if after_comment {
                        out.push('\n');
                    }
                    self.message(&mut out, message, guard)?;
                }
                Entry::Term(term) => {
                    if after_comment {
                        out.push('\n');
                    }
                    self.term(&mut out, term, guard)?;
                }
                Entry::Comment(comment) => {
                    if has_entries {
                        out.push('\n');
                    }
                    write_comment(&mut out, comment, comment.kind.sigil());
                }
                Entry::Junk(junk) => {
                    if !self.options.with_junk {
                        continue;
                    }
                    out.push_str(&junk.content);
                    if !junk.content.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
            after_comment = matches!(entry, Entry::Comment(_));
            has_entries = true;
        }
        Ok(out)
    }

    fn message(&self, out: &mut String, message: &Message, guard: DepthGuard) -> Result<(), SerializeError> {
        if let Some(comment) = &message.comment {
            write_comment(out, comment, "#");
        }
        out.push_str(&message.id.name);
        out.push_str(" =");
        if let Some(value) = message.value.as_ref().filter(|value| !value.is_empty()) {
            out.push_str(&self.pattern(value, guard)?);
        }
        for attribute in &message.attributes {
            self.attribute(out, attribute, guard)?;
        }
        out.push('\n');
        Ok(())
    }

    fn term(&self, out: &mut String, term: &Term, guard: DepthGuard) -> Result<(), SerializeError> {
        if let Some(comment) = &term.comment {
            write_comment(out, comment, "#");
        }
        out.push('-');
        out.push_str(&term.id.name);
        out.push_str(" =");
        out.push_str(&self.pattern(&term.value, guard)?);
        for attribute in &term.attributes {
            self.attribute(out, attribute, guard)?;
        }
        out.push('\n');
        Ok(())
    }

    fn attribute(&self, out: &mut String, attribute: &Attribute, guard: DepthGuard) -> Result<(), SerializeError> {
        out.push_str("\n    .");
        out.push_str(&attribute.id.name);
        out.push_str(" =");
        out.push_str(&indent(&self.pattern(&attribute.value, guard)?));
        Ok(())
    }

    /// Pattern as written after `=` or `]`, leading separator included.
    fn pattern(&self, pattern: &Pattern, guard: DepthGuard) -> Result<String, SerializeError> {
        let block = starts_on_new_line(pattern);
        let mut state = LineState {
            line: 0,
            at_line_start: true,
            inline_start: !block,
            indent_set: false,
        };
        let mut content = String::new();
        let last = pattern.elements.len().saturating_sub(1);

        for (idx, element) in pattern.elements.iter().enumerate() {
            match element {
                PatternElement::TextElement { value } => {
                    write_text(&mut content, value, &mut state, idx == last);
                }
                PatternElement::Placeable { expression } => {
                    content.push_str(&self.placeable(expression, guard)?);
                    state.mark_content();
                }
            }
        }

        let separator = if block { "\n    " } else { " " };
        Ok(format!("{separator}{}", indent(&content)))
    }

    fn placeable(&self, expression: &Expression, guard: DepthGuard) -> Result<String, SerializeError> {
        let guard = guard.enter()?;
        match expression {
            Expression::Inline(inline) => Ok(format!("{{ {} }}", self.inline(inline, guard)?)),
            Expression::Select(select) => {
                let mut out = format!("{{ {} ->", self.inline(&select.selector, guard)?);
                for variant in &select.variants {
                    out.push_str(if variant.default { "\n   *[" } else { "\n    [" });
                    out.push_str(variant.key.as_str());
                    out.push(']');
                    out.push_str(&indent(&self.pattern(&variant.value, guard)?));
                }
                out.push_str("\n}");
                Ok(out)
            }
        }
    }

    fn inline(&self, inline: &InlineExpression, guard: DepthGuard) -> Result<String, SerializeError> {
        Ok(match inline {
            InlineExpression::StringLiteral { value } => quote(value),
            InlineExpression::NumberLiteral(number) => match NumberLiteral::parse(&number.raw) {
                Some(_) => number.raw.clone(),
                None => number.value.to_string(),
            },
            InlineExpression::FunctionReference { id, arguments } => {
                format!("{}{}", id.name, self.arguments(arguments, guard)?)
            }
            InlineExpression::MessageReference { id, attribute } => match attribute {
                Some(attribute) => format!("{}.{}", id.name, attribute.name),
                None => id.name.clone(),
            },
            InlineExpression::TermReference {
                id,
                attribute,
                arguments,
            } => {
                let mut out = format!("-{}", id.name);
                if let Some(attribute) = attribute {
                    out.push('.');
                    out.push_str(&attribute.name);
                }
                if let Some(arguments) = arguments {
                    out.push_str(&self.arguments(arguments, guard)?);
                }
                out
            }
            InlineExpression::VariableReference { id } => format!("${}", id.name),
            InlineExpression::Placeable { expression } => self.placeable(expression, guard)?,
        })
    }

    fn arguments(&self, arguments: &CallArguments, guard: DepthGuard) -> Result<String, SerializeError> {
        let guard = guard.enter()?;
        let mut parts = Vec::with_capacity(arguments.positional.len() + arguments.named.len());
        for argument in &arguments.positional {
            parts.push(self.inline(argument, guard)?);
        }
        for argument in &arguments.named {
            parts.push(format!(
                "{}: {}",
                argument.name.name,
                self.inline(&argument.value, guard)?
            ));
        }
        Ok(format!("({})", parts.join(", ")))
    }
}

struct LineState {
    /// Line within the pattern, counting only line breaks in text.
    line: usize,
    at_line_start: bool,
    inline_start: bool,
    /// Some continuation line already carries content, so the parser has
    /// fixed the common indent.
    indent_set: bool,
}

impl LineState {
    fn is_continuation(&self) -> bool {
        self.line > 0 || !self.inline_start
    }

    fn mark_content(&mut self) {
        if self.is_continuation() {
            self.indent_set = true;
        }
        self.at_line_start = false;
    }
}

fn write_text(out: &mut String, value: &str, state: &mut LineState, ends_pattern: bool) {
    let segments: Vec<&str> = value.split('\n').collect();
    let last = segments.len() - 1;

    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
            state.line += 1;
            state.at_line_start = true;
        }
        let closes_line = idx < last || ends_pattern;
        let mut rest = *segment;

        if state.at_line_start {
            let trimmed = rest.trim_start_matches(' ');
            let lead = &rest[..rest.len() - trimmed.len()];
            if !lead.is_empty() {
                // The first continuation line with content sets the common indent.
                let sets_indent = state.line == 0 || !state.indent_set;
                if sets_indent || (trimmed.is_empty() && closes_line) {
                    out.push_str(&string_placeable(lead));
                } else {
                    out.push_str(lead);
                }
                rest = trimmed;
            }
            if state.is_continuation() && rest.starts_with(['[', '*', '.']) {
                out.push_str(&string_placeable(&rest[..1]));
                rest = &rest[1..];
            }
        }

        if idx == last && ends_pattern {
            let body = rest.trim_end_matches(' ');
            write_escaped(out, body);
            if body.len() < rest.len() {
                out.push_str(&string_placeable(&rest[body.len()..]));
            }
        } else {
            write_escaped(out, rest);
        }

        if !segment.is_empty() {
            state.mark_content();
        }
    }
}

fn write_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '{' | '}' | '\r' => out.push_str(&string_placeable(&ch.to_string())),
            _ => out.push(ch),
        }
    }
}

fn string_placeable(text: &str) -> String {
    format!("{{{}}}", quote(text))
}

/// String literal with `\\`, `\"` and control characters escaped.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            ch if ch.is_control() => out.push_str(&format!("\\u{:04X}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Indent every non-empty line but the first by four spaces.
fn indent(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (idx, line) in content.split('\n').enumerate() {
        if idx > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str("    ");
            }
        }
        out.push_str(line);
    }
    out
}

fn write_comment(out: &mut String, comment: &Comment, sigil: &str) {
    for line in comment.content.split('\n') {
        out.push_str(sigil);
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Multiline patterns go on their own line, unless the first character
/// would then end the pattern.
fn starts_on_new_line(pattern: &Pattern) -> bool {
    let multiline = pattern.elements.iter().any(|element| match element {
        PatternElement::TextElement { value } => value.contains('\n'),
        PatternElement::Placeable { expression } => contains_select(expression),
    });
    if !multiline {
        return false;
    }
    match pattern.elements.first() {
        Some(PatternElement::TextElement { value }) => !value.starts_with(['[', '*', '.']),
        _ => true,
    }
}

fn contains_select(expression: &Expression) -> bool {
    let mut current = expression;
    loop {
        match current {
            Expression::Select(_) => return true,
            Expression::Inline(InlineExpression::Placeable { expression }) => current = expression,
            Expression::Inline(_) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::parse;

    fn message(pattern: Pattern) -> Resource {
        Resource::new(vec![Entry::Message(Message::new("key", Some(pattern)))])
    }

    #[test]
    fn test_simple_message() {
        let out = serialize(&parse("greet = Hello, { $name }!")).unwrap();
        assert_eq!(out, "greet = Hello, { $name }!\n");
    }

    #[test]
    fn test_braces_in_text_are_escaped() {
        let out = serialize(&message(Pattern::text("a {b} c"))).unwrap();
        assert_eq!(out, "key = a {\"{\"}b{\"}\"} c\n");
    }

    #[test]
    fn test_leading_and_trailing_spaces_are_kept() {
        let out = serialize(&message(Pattern::text("  padded  "))).unwrap();
        assert_eq!(out, "key = {\"  \"}padded{\"  \"}\n");
    }

    #[test]
    fn test_special_line_start_is_escaped() {
        let out = serialize(&message(Pattern::text("first\n[second"))).unwrap();
        assert_eq!(out, "key =\n    first\n    {\"[\"}second\n");
    }

    #[test]
    fn test_special_first_char_keeps_pattern_inline() {
        let out = serialize(&message(Pattern::text("[first\nsecond"))).unwrap();
        assert_eq!(out, "key = [first\n    second\n");
    }

    #[test]
    fn test_whitespace_only_line() {
        let out = serialize(&message(Pattern::text("a\n   \nb"))).unwrap();
        assert_eq!(out, "key =\n    a\n    {\"   \"}\n    b\n");
    }

    #[test]
    fn test_indent_after_blank_continuation_line() {
        let out = serialize(&message(Pattern::text("[a\n\n  b"))).unwrap();
        assert_eq!(out, "key = [a\n\n    {\"  \"}b\n");

        let out = serialize(&message(Pattern::text("a\n\n  b\n    c"))).unwrap();
        assert_eq!(out, "key =\n    a\n\n      b\n        c\n");
    }

    #[test]
    fn test_control_characters_in_literals() {
        let pattern = Pattern::new(vec![PatternElement::placeable(InlineExpression::string(
            "tab\there \"q\" \\",
        ))]);
        let out = serialize(&message(pattern)).unwrap();
        assert_eq!(out, "key = { \"tab\\u0009here \\\"q\\\" \\\\\" }\n");
    }

    #[test]
    fn test_comments_get_separated() {
        let resource = Resource::new(vec![
            Entry::Comment(Comment::new(CommentKind::Comment, "one")),
            Entry::Comment(Comment::new(CommentKind::Comment, "two")),
            Entry::Message(Message::new("key", Some(Pattern::text("v")))),
        ]);
        assert_eq!(serialize(&resource).unwrap(), "# one\n\n# two\n\nkey = v\n");
    }

    #[test]
    fn test_junk_only_with_option() {
        let resource = parse("good = ok\n!!bad\n");
        assert_eq!(serialize(&resource).unwrap(), "good = ok\n");
        let with_junk = Serializer::new(SerializerOptions {
            with_junk: true,
            ..SerializerOptions::default()
        });
        assert_eq!(with_junk.serialize(&resource).unwrap(), "good = ok\n!!bad\n");
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let resource = Resource::new(vec![Entry::Message(Message::new("bad id", Some(Pattern::text("v"))))]);
        assert!(serialize(&resource).is_err());
        let lenient = Serializer::new(SerializerOptions {
            validate: false,
            ..SerializerOptions::default()
        });
        assert_eq!(lenient.serialize(&resource).unwrap(), "bad id = v\n");
    }

    #[test]
    fn test_depth_limit() {
        let mut expression = Expression::Inline(InlineExpression::variable("x"));
        for _ in 0..5 {
            expression = Expression::Inline(InlineExpression::Placeable {
                expression: Box::new(expression),
            });
        }
        let resource = message(Pattern::new(vec![PatternElement::Placeable { expression }]));
        for validate in [true, false] {
            let serializer = Serializer::new(SerializerOptions {
                validate,
                with_junk: false,
                max_depth: 5,
            });
            assert_eq!(
                serializer.serialize(&resource),
                Err(SerializeError::DepthExceeded(DepthExceeded { max_depth: 5 }))
            );
        }
    }
}
