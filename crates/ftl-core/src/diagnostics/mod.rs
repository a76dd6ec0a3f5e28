//! Structured diagnostics
//!
//! Parser, serializer and resolver errors are typed values; this module
//! turns them into [`Diagnostic`]s with a stable code, a hint and a link to
//! the Fluent syntax guide, ready for [`DiagnosticRenderer`].
//!
//! | codes   | source                                   |
//! |---------|------------------------------------------|
//! | `E00xx` | syntax errors (Junk annotations)         |
//! | `E01xx` | resolution errors                        |
//! | `E02xx` | serializer validation                    |
//! | `E03xx` | configuration                            |

mod renderer;

use serde::{Deserialize, Serialize};

pub use renderer::{DiagnosticRenderer, OutputFormat};

use crate::config::ConfigError;
use crate::runtime::ResolverError;
use crate::syntax::ast::{Annotation, Resource, Span};
use crate::syntax::line_index::LineIndex;
use crate::syntax::parser::{ParserError, ParserErrorKind};
use crate::syntax::serializer::SerializeError;

const GUIDE: &str = "https://projectfluent.org/fluent/guide";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// 1-based position plus the byte range it covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub length: usize,
}

impl Location {
    pub fn from_span(source: &str, index: &LineIndex, span: Span) -> Self {
        let position = index.line_col(source, span.start);
        Self {
            line: position.line,
            column: position.column,
            offset: span.start,
            length: span.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub hint: Option<String>,
    pub doc_url: Option<String>,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            hint: None,
            doc_url: None,
            location: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_doc(mut self, page: &str) -> Self {
        self.doc_url = Some(format!("{GUIDE}/{page}"));
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

/// Code, hint and guide page for a syntax error kind.
fn syntax_details(kind: &ParserErrorKind) -> (&'static str, &'static str, &'static str) {
    use ParserErrorKind::*;
    match kind {
        ExpectedEntry | ExpectedToken { .. } | ExpectedCharRange { .. } | ExpectedInlineExpression
        | UnexpectedEndOfInput | MissingValue | MissingLiteral | ExpectedMessageField { .. }
        | ExpectedTermField { .. } => (
            "E0001",
            "entries look like `id = value`, `-term = value` or `# comment`",
            "hello.html",
        ),
        MissingDefaultVariant | MultipleDefaultVariants | MissingVariants
        | MessageReferenceAsSelector | TermReferenceAsSelector | MessageAttributeAsSelector
        | TermAttributeAsPlaceable | ExpectedSimpleExpressionAsSelector => (
            "E0002",
            "select on a variable, a literal, a function call or a term attribute, and mark exactly one variant with `*`",
            "selectors.html",
        ),
        ForbiddenCallee | ForbiddenKey | PositionalArgumentFollowsNamed
        | DuplicatedNamedArgument { .. } | PositionalArgumentInTermCall => (
            "E0003",
            "write positional arguments first, then `name: value` pairs with unique names",
            "functions.html",
        ),
        UnterminatedStringLiteral | UnknownEscapeSequence { .. }
        | InvalidUnicodeEscapeSequence { .. } | UnbalancedClosingBrace => (
            "E0004",
            "use `{\"{\"}` and `{\"}\"}` for literal braces; string literals support `\\\\`, `\\\"`, `\\uXXXX` and `\\UXXXXXX`",
            "special.html",
        ),
        IdentifierTooLong { .. } | SourceTooLarge { .. } | DepthExceeded { .. } => (
            "E0005",
            "the input exceeds a configured limit; raise it in the `limits` section if this is intended",
            "placeables.html",
        ),
    }
}

impl ToDiagnostic for ParserError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, hint, page) = syntax_details(&self.kind);
        Diagnostic::new(code, Severity::Error, self.kind.to_string())
            .with_hint(hint)
            .with_doc(page)
            .with_location(Location {
                offset: self.span.start,
                length: self.span.len(),
                ..Location::default()
            })
    }
}

impl ToDiagnostic for Annotation {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, hint, page) = syntax_details(&self.kind);
        Diagnostic::new(code, Severity::Error, self.message.clone())
            .with_hint(hint)
            .with_doc(page)
            .with_location(Location {
                line: self.line,
                column: self.column,
                offset: self.span.start,
                length: self.span.len(),
            })
    }
}

impl ToDiagnostic for ResolverError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, hint, page) = match self {
            ResolverError::UnknownVariable { .. } => (
                "E0101",
                "pass the variable in the message arguments",
                "variables.html",
            ),
            ResolverError::UnknownMessage { .. }
            | ResolverError::UnknownAttribute { .. }
            | ResolverError::NoValue { .. } => (
                "E0102",
                "check the identifier, and that the resource defining it was added",
                "references.html",
            ),
            ResolverError::UnknownTerm { .. } => (
                "E0103",
                "terms are referenced with a leading `-`",
                "terms.html",
            ),
            ResolverError::Cyclic { .. } => (
                "E0104",
                "a message cannot reference itself, directly or through others",
                "references.html",
            ),
            ResolverError::DepthExceeded { .. } => (
                "E0105",
                "shorten the chain of references or raise `limits.maxDepth`",
                "references.html",
            ),
            ResolverError::Function(_) => (
                "E0106",
                "check the function name and its arguments",
                "functions.html",
            ),
        };
        Diagnostic::new(code, Severity::Warning, self.to_string())
            .with_hint(hint)
            .with_doc(page)
    }
}

impl ToDiagnostic for SerializeError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, hint) = match self {
            SerializeError::DepthExceeded(_) => (
                "E0202",
                "the tree is nested deeper than `limits.maxDepth`",
            ),
            _ => (
                "E0201",
                "the tree has no valid FTL form; fix it or disable validation",
            ),
        };
        Diagnostic::new(code, Severity::Error, self.to_string())
            .with_hint(hint)
            .with_doc("selectors.html")
    }
}

impl ToDiagnostic for ConfigError {
    fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new("E0301", Severity::Error, self.to_string())
            .with_hint("see the `limits`, `resolver` and `serializer` sections")
    }
}

/// One diagnostic per Junk annotation in `resource`.
pub fn resource_diagnostics(resource: &Resource) -> Vec<Diagnostic> {
    resource
        .junk()
        .flat_map(|junk| junk.annotations.iter())
        .map(ToDiagnostic::to_diagnostic)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::parse;

    #[test]
    fn test_junk_annotations_become_diagnostics() {
        let diagnostics = resource_diagnostics(&parse("ok = fine\nbad = { $x ]\n"));
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.location.unwrap().line, 2);
        assert!(diagnostic.doc_url.as_deref().unwrap().starts_with(GUIDE));
    }

    #[test]
    fn test_resolver_codes() {
        let diagnostic = ResolverError::Cyclic {
            key: "a".into(),
            chain: vec!["a".into(), "a".into()],
        }
        .to_diagnostic();
        assert_eq!(diagnostic.code, "E0104");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert!(diagnostic.message.contains("a -> a"));
    }

    #[test]
    fn test_location_from_span() {
        let source = "a = 1\nbb = 2\n";
        let index = LineIndex::new(source);
        let location = Location::from_span(source, &index, Span::new(9, 10));
        assert_eq!((location.line, location.column, location.length), (2, 4, 1));
    }
}
