//! Round-trip validation for FTL
//!
//! Checks that a source survives parse → serialize → parse → serialize:
//!
//! 1. the re-parsed resource is structurally equal to the first parse
//!    (Junk compared without its source positions, and left out entirely
//!    when the serializer drops it)
//! 2. the second serialization is byte-identical to the first
//!
//! # Example
//!
//! ```rust
//! use ftl_core::syntax::round_trip::RoundTripValidator;
//!
//! let validator = RoundTripValidator::new();
//! let result = validator.validate("greet = Hello, { $name }!\n").unwrap();
//! assert!(result.is_valid());
//! ```

use std::collections::HashMap;

use super::ast::{Entry, Junk, Resource, Span};
use super::parser::{Parser, ParserConfig};
use super::serializer::{Serializer, SerializerOptions};
use super::transformer::{Transform, Transformer, transform_resource};
use crate::Result;

/// Result of round-trip validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the round trip converged
    pub is_valid: bool,
    pub original: String,
    /// First serialization
    pub serialized: String,
    /// Serialization of the re-parsed resource (should equal `serialized`)
    pub reserialized: String,
    pub differences: Vec<SemanticDifference>,
    /// Junk annotations in the original source
    pub original_errors: Vec<String>,
    /// Junk annotations after re-parsing the serialized text
    pub reparsed_errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Human-readable list of everything that went wrong.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.differences.is_empty() {
            issues.push(format!(
                "Found {} semantic differences",
                self.differences.len()
            ));
        }
        if !self.original_errors.is_empty() {
            issues.push(format!(
                "Original parsing had {} errors",
                self.original_errors.len()
            ));
        }
        if !self.reparsed_errors.is_empty() {
            issues.push(format!(
                "Re-parsing had {} errors",
                self.reparsed_errors.len()
            ));
        }
        if self.serialized != self.reserialized {
            issues.push("Serialization is not idempotent".to_string());
        }

        issues
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticDifference {
    pub kind: DifferenceKind,
    pub location: Option<String>,
    pub description: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Entry missing after re-parsing
    MissingEntry,
    /// Entry that only exists after re-parsing
    ExtraEntry,
    /// Same entry, different content
    EntryDifference,
    /// Second serialization differs from the first
    NotIdempotent,
}

#[derive(Debug, Clone, Default)]
pub struct RoundTripValidator {
    parser: Parser,
    options: SerializerOptions,
}

impl RoundTripValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SerializerOptions) -> Self {
        Self {
            parser: Parser::new(ParserConfig {
                max_depth: options.max_depth,
                ..ParserConfig::default()
            }),
            options,
        }
    }

    pub fn validate(&self, source: &str) -> Result<ValidationResult> {
        let resource = self.parser.parse(source);
        self.validate_resource(source, &resource)
    }

    /// Validate an already parsed `resource` of `source`.
    pub fn validate_resource(&self, source: &str, resource: &Resource) -> Result<ValidationResult> {
        let serializer = Serializer::new(self.options);

        let serialized = serializer.serialize(resource)?;
        let reparsed = self.parser.parse(&serialized);
        let reserialized = serializer.serialize(&reparsed)?;

        let expected = self.normalize(resource)?;
        let actual = self.normalize(&reparsed)?;

        let mut differences = compare_entries(&expected.body, &actual.body);
        if serialized != reserialized {
            differences.push(idempotency_difference(&serialized, &reserialized));
        }

        let reparsed_errors = junk_errors(&reparsed);
        Ok(ValidationResult {
            is_valid: differences.is_empty() && reparsed_errors.is_empty(),
            original: source.to_string(),
            serialized,
            reserialized,
            differences,
            original_errors: junk_errors(resource),
            reparsed_errors,
        })
    }

    fn normalize(&self, resource: &Resource) -> Result<Resource> {
        let mut eraser = JunkNormalizer {
            keep: self.options.with_junk,
        };
        Ok(transform_resource(
            &mut eraser,
            resource,
            self.options.max_depth,
        )?)
    }
}

/// Drops Junk, or strips its source positions when Junk is serialized.
struct JunkNormalizer {
    keep: bool,
}

impl Transformer for JunkNormalizer {
    fn transform_entry(&mut self, entry: &Entry) -> Transform<Entry> {
        match entry {
            Entry::Junk(_) if !self.keep => Transform::Remove,
            Entry::Junk(junk) => Transform::Replace(Entry::Junk(Junk {
                content: junk.content.clone(),
                annotations: junk
                    .annotations
                    .iter()
                    .cloned()
                    .map(|mut annotation| {
                        annotation.span = Span::default();
                        annotation.line = 0;
                        annotation.column = 0;
                        annotation
                    })
                    .collect(),
                span: Span::default(),
            })),
            _ => Transform::Keep,
        }
    }
}

fn junk_errors(resource: &Resource) -> Vec<String> {
    resource
        .junk()
        .flat_map(|junk| junk.annotations.iter())
        .map(|annotation| {
            format!(
                "{}:{}: {}",
                annotation.line, annotation.column, annotation.message
            )
        })
        .collect()
}

/// Stable name for an entry: `id`, `-id`, or kind plus ordinal.
fn entry_keys(entries: &[Entry]) -> Vec<String> {
    let mut seen: HashMap<&'static str, usize> = HashMap::new();
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Message(message) => message.id.name.clone(),
            Entry::Term(term) => format!("-{}", term.id.name),
            Entry::Comment(_) | Entry::Junk(_) => {
                let kind = if matches!(entry, Entry::Comment(_)) {
                    "comment"
                } else {
                    "junk"
                };
                let ordinal = seen.entry(kind).or_insert(0);
                *ordinal += 1;
                format!("{kind} #{ordinal}")
            }
        })
        .collect()
}

fn describe(entry: &Entry) -> String {
    serde_json::to_string(entry).unwrap_or_else(|_| format!("{entry:?}"))
}

fn compare_entries(original: &[Entry], reparsed: &[Entry]) -> Vec<SemanticDifference> {
    let original_keys = entry_keys(original);
    let reparsed_keys = entry_keys(reparsed);
    let original_map: HashMap<&str, &Entry> = original_keys
        .iter()
        .map(String::as_str)
        .zip(original)
        .collect();
    let reparsed_map: HashMap<&str, &Entry> = reparsed_keys
        .iter()
        .map(String::as_str)
        .zip(reparsed)
        .collect();

    let mut differences = Vec::new();
    for key in &original_keys {
        let Some(expected) = original_map.get(key.as_str()) else {
            continue;
        };
        match reparsed_map.get(key.as_str()) {
            None => differences.push(SemanticDifference {
                kind: DifferenceKind::MissingEntry,
                location: Some(key.clone()),
                description: format!("'{key}' missing after re-parsing"),
                expected: Some(describe(expected)),
                actual: None,
            }),
            Some(actual) if actual != expected => differences.push(SemanticDifference {
                kind: DifferenceKind::EntryDifference,
                location: Some(key.clone()),
                description: format!("'{key}' changed after re-parsing"),
                expected: Some(describe(expected)),
                actual: Some(describe(actual)),
            }),
            Some(_) => {}
        }
    }
    for key in &reparsed_keys {
        if !original_map.contains_key(key.as_str()) {
            let actual = reparsed_map.get(key.as_str()).map(|entry| describe(entry));
            differences.push(SemanticDifference {
                kind: DifferenceKind::ExtraEntry,
                location: Some(key.clone()),
                description: format!("'{key}' only exists after re-parsing"),
                expected: None,
                actual,
            });
        }
    }
    differences
}

fn idempotency_difference(first: &str, second: &str) -> SemanticDifference {
    let line = first
        .lines()
        .zip(second.lines())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| first.lines().count().min(second.lines().count()));
    SemanticDifference {
        kind: DifferenceKind::NotIdempotent,
        location: Some(format!("line {}", line + 1)),
        description: "second serialization differs from the first".to_string(),
        expected: first.lines().nth(line).map(str::to_string),
        actual: second.lines().nth(line).map(str::to_string),
    }
}
