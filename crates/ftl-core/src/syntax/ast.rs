//! Abstract syntax tree for FTL resources
//!
//! Nodes are plain immutable values with structural equality. Nothing in the
//! engine mutates a node after construction: the `with_*` helpers and the
//! [`Transformer`](super::transformer::Transformer) always build new nodes.
//!
//! ```text
//! Resource
//! └── Entry (Message | Term | Comment | Junk)
//!     ├── Identifier
//!     ├── Pattern
//!     │   └── PatternElement (TextElement | Placeable)
//!     │       └── Expression (Select | Inline)
//!     └── Attribute*
//! ```

use serde::{Deserialize, Serialize};

use super::parser::errors::ParserErrorKind;

/// Half-open byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    pub body: Vec<Entry>,
}

impl Resource {
    pub fn new(body: Vec<Entry>) -> Self {
        Self { body }
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.body.iter().filter_map(|entry| match entry {
            Entry::Message(message) => Some(message),
            _ => None,
        })
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.body.iter().filter_map(|entry| match entry {
            Entry::Term(term) => Some(term),
            _ => None,
        })
    }

    pub fn junk(&self) -> impl Iterator<Item = &Junk> {
        self.body.iter().filter_map(|entry| match entry {
            Entry::Junk(junk) => Some(junk),
            _ => None,
        })
    }

    /// First message with the given identifier.
    pub fn get_message(&self, id: &str) -> Option<&Message> {
        self.messages().find(|message| message.id.name == id)
    }

    /// First term with the given identifier (without the leading `-`).
    pub fn get_term(&self, id: &str) -> Option<&Term> {
        self.terms().find(|term| term.id.name == id)
    }

    pub fn has_junk(&self) -> bool {
        self.junk().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entry {
    Message(Message),
    Term(Term),
    Comment(Comment),
    Junk(Junk),
}

impl Entry {
    /// Identifier of a message or term entry.
    pub fn id(&self) -> Option<&str> {
        match self {
            Entry::Message(message) => Some(&message.id.name),
            Entry::Term(term) => Some(&term.id.name),
            Entry::Comment(_) | Entry::Junk(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Identifier,
    pub value: Option<Pattern>,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
}

impl Message {
    pub fn new(id: impl Into<String>, value: Option<Pattern>) -> Self {
        Self {
            id: Identifier::new(id),
            value,
            attributes: Vec::new(),
            comment: None,
        }
    }

    pub fn with_value(self, value: Option<Pattern>) -> Self {
        Self { value, ..self }
    }

    pub fn with_attributes(self, attributes: Vec<Attribute>) -> Self {
        Self { attributes, ..self }
    }

    pub fn with_comment(self, comment: Option<Comment>) -> Self {
        Self { comment, ..self }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.id.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: Identifier,
    pub value: Pattern,
    pub attributes: Vec<Attribute>,
    pub comment: Option<Comment>,
}

impl Term {
    pub fn new(id: impl Into<String>, value: Pattern) -> Self {
        Self {
            id: Identifier::new(id),
            value,
            attributes: Vec::new(),
            comment: None,
        }
    }

    pub fn with_value(self, value: Pattern) -> Self {
        Self { value, ..self }
    }

    pub fn with_attributes(self, attributes: Vec<Attribute>) -> Self {
        Self { attributes, ..self }
    }

    pub fn with_comment(self, comment: Option<Comment>) -> Self {
        Self { comment, ..self }
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.id.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Identifier,
    pub value: Pattern,
}

impl Attribute {
    pub fn new(id: impl Into<String>, value: Pattern) -> Self {
        Self {
            id: Identifier::new(id),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `[a-zA-Z][a-zA-Z0-9_-]*`
    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        matches!(chars.next(), Some(first) if first.is_ascii_alphabetic())
            && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
}

impl Pattern {
    pub fn new(elements: Vec<PatternElement>) -> Self {
        Self { elements }
    }

    /// Pattern holding a single text element.
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(vec![PatternElement::TextElement {
            value: value.into(),
        }])
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatternElement {
    TextElement { value: String },
    Placeable { expression: Expression },
}

impl PatternElement {
    pub fn placeable(expression: impl Into<Expression>) -> Self {
        Self::Placeable {
            expression: expression.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "expression")]
pub enum Expression {
    Select(SelectExpression),
    Inline(InlineExpression),
}

impl From<InlineExpression> for Expression {
    fn from(inline: InlineExpression) -> Self {
        Expression::Inline(inline)
    }
}

impl From<SelectExpression> for Expression {
    fn from(select: SelectExpression) -> Self {
        Expression::Select(select)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InlineExpression {
    /// Holds the unescaped value.
    StringLiteral {
        value: String,
    },
    NumberLiteral(NumberLiteral),
    FunctionReference {
        id: Identifier,
        arguments: CallArguments,
    },
    MessageReference {
        id: Identifier,
        attribute: Option<Identifier>,
    },
    TermReference {
        id: Identifier,
        attribute: Option<Identifier>,
        arguments: Option<CallArguments>,
    },
    VariableReference {
        id: Identifier,
    },
    Placeable {
        expression: Box<Expression>,
    },
}

impl InlineExpression {
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::VariableReference {
            id: Identifier::new(name),
        }
    }

    pub fn message(name: impl Into<String>, attribute: Option<&str>) -> Self {
        Self::MessageReference {
            id: Identifier::new(name),
            attribute: attribute.map(Identifier::new),
        }
    }

    pub fn term(name: impl Into<String>, attribute: Option<&str>) -> Self {
        Self::TermReference {
            id: Identifier::new(name),
            attribute: attribute.map(Identifier::new),
            arguments: None,
        }
    }
}

/// Numeric literal. The authored text is kept beside the parsed value so
/// display preserves formatting such as trailing zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: f64,
    pub raw: String,
}

impl NumberLiteral {
    /// Parse `-?[0-9]+(\.[0-9]+)?`.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        let (int, frac) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits, None),
        };
        let valid = !int.is_empty()
            && int.bytes().all(|b| b.is_ascii_digit())
            && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
        if !valid {
            return None;
        }
        raw.parse().ok().map(|value| Self {
            value,
            raw: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallArguments {
    pub positional: Vec<InlineExpression>,
    pub named: Vec<NamedArgument>,
}

impl CallArguments {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArgument {
    pub name: Identifier,
    pub value: InlineExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpression {
    pub selector: InlineExpression,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub key: VariantKey,
    pub value: Pattern,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VariantKey {
    Identifier { name: String },
    NumberLiteral(NumberLiteral),
}

impl VariantKey {
    /// Key as written between the brackets.
    pub fn as_str(&self) -> &str {
        match self {
            VariantKey::Identifier { name } => name,
            VariantKey::NumberLiteral(number) => &number.raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentKind {
    /// `#`
    Comment,
    /// `##`
    GroupComment,
    /// `###`
    ResourceComment,
}

impl CommentKind {
    pub fn sigil(&self) -> &'static str {
        match self {
            CommentKind::Comment => "#",
            CommentKind::GroupComment => "##",
            CommentKind::ResourceComment => "###",
        }
    }

    pub(crate) fn from_level(level: usize) -> Option<Self> {
        match level {
            1 => Some(CommentKind::Comment),
            2 => Some(CommentKind::GroupComment),
            3 => Some(CommentKind::ResourceComment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    /// Lines joined with `\n`, sigils stripped.
    pub content: String,
}

impl Comment {
    pub fn new(kind: CommentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Source that failed to parse, kept verbatim with the reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junk {
    pub content: String,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: ParserErrorKind,
    pub message: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validity() {
        assert!(Identifier::is_valid("brand-name_2"));
        assert!(!Identifier::is_valid("2fast"));
        assert!(!Identifier::is_valid(""));
        assert!(!Identifier::is_valid("with space"));
    }

    #[test]
    fn test_number_literal_keeps_raw_text() {
        let number = NumberLiteral::parse("1.50").unwrap();
        assert_eq!(number.value, 1.5);
        assert_eq!(number.raw, "1.50");
        assert!(NumberLiteral::parse("-3").is_some());
        assert!(NumberLiteral::parse("1.").is_none());
        assert!(NumberLiteral::parse(".5").is_none());
        assert!(NumberLiteral::parse("1e5").is_none());
    }

    #[test]
    fn test_with_helpers_build_new_nodes() {
        let original = Message::new("hello", Some(Pattern::text("Hi")));
        let changed = original
            .clone()
            .with_attributes(vec![Attribute::new("title", Pattern::text("T"))]);
        assert!(original.attributes.is_empty());
        assert_eq!(changed.get_attribute("title").unwrap().id.name, "title");
        assert_eq!(changed.value, original.value);
    }

    #[test]
    fn test_resource_lookups() {
        let resource = Resource::new(vec![
            Entry::Message(Message::new("a", Some(Pattern::text("A")))),
            Entry::Term(Term::new("brand", Pattern::text("Firefox"))),
            Entry::Comment(Comment::new(CommentKind::GroupComment, "group")),
        ]);
        assert!(resource.get_message("a").is_some());
        assert!(resource.get_message("brand").is_none());
        assert!(resource.get_term("brand").is_some());
        assert!(!resource.has_junk());
    }

    #[test]
    fn test_json_dump_is_tagged() {
        let entry = Entry::Message(Message::new("a", Some(Pattern::text("A"))));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "Message");
        assert_eq!(json["value"]["elements"][0]["type"], "TextElement");
        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
