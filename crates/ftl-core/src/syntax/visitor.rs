//! Read-only AST traversal
//!
//! [`walk`] dispatches every node to the matching `visit_*` hook of a
//! [`Visitor`] and then descends into [`Node::children`]. Hooks that are not
//! overridden fall back to visiting every child.
//!
//! Nesting is bounded in [`walk`]'s single dispatch point: a fresh
//! [`DepthGuard`] level is entered for every placeable and every call
//! argument list. Hooks cannot recurse on their own (they only return
//! [`Visit`]), so no override can sidestep the limit.

use super::ast::*;
use super::depth::{DepthExceeded, DepthGuard};

/// What the traversal should do after a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this node's children.
    Skip,
}

/// A borrowed view of any AST node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Resource(&'a Resource),
    Message(&'a Message),
    Term(&'a Term),
    Attribute(&'a Attribute),
    Comment(&'a Comment),
    Junk(&'a Junk),
    Identifier(&'a Identifier),
    Pattern(&'a Pattern),
    TextElement(&'a str),
    Placeable(&'a Expression),
    SelectExpression(&'a SelectExpression),
    InlineExpression(&'a InlineExpression),
    Variant(&'a Variant),
    VariantKey(&'a VariantKey),
    CallArguments(&'a CallArguments),
    NamedArgument(&'a NamedArgument),
}

impl<'a> From<&'a Entry> for Node<'a> {
    fn from(entry: &'a Entry) -> Self {
        match entry {
            Entry::Message(message) => Node::Message(message),
            Entry::Term(term) => Node::Term(term),
            Entry::Comment(comment) => Node::Comment(comment),
            Entry::Junk(junk) => Node::Junk(junk),
        }
    }
}

impl<'a> From<&'a PatternElement> for Node<'a> {
    fn from(element: &'a PatternElement) -> Self {
        match element {
            PatternElement::TextElement { value } => Node::TextElement(value),
            PatternElement::Placeable { expression } => Node::Placeable(expression),
        }
    }
}

impl<'a> Node<'a> {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::Resource(resource) => out.extend(resource.body.iter().map(Node::from)),
            Node::Message(message) => {
                if let Some(comment) = &message.comment {
                    out.push(Node::Comment(comment));
                }
                out.push(Node::Identifier(&message.id));
                if let Some(value) = &message.value {
                    out.push(Node::Pattern(value));
                }
                out.extend(message.attributes.iter().map(Node::Attribute));
            }
            Node::Term(term) => {
                if let Some(comment) = &term.comment {
                    out.push(Node::Comment(comment));
                }
                out.push(Node::Identifier(&term.id));
                out.push(Node::Pattern(&term.value));
                out.extend(term.attributes.iter().map(Node::Attribute));
            }
            Node::Attribute(attribute) => {
                out.push(Node::Identifier(&attribute.id));
                out.push(Node::Pattern(&attribute.value));
            }
            Node::Pattern(pattern) => out.extend(pattern.elements.iter().map(Node::from)),
            Node::Placeable(expression) => match expression {
                Expression::Select(select) => out.push(Node::SelectExpression(select)),
                Expression::Inline(inline) => out.push(Node::InlineExpression(inline)),
            },
            Node::SelectExpression(select) => {
                out.push(Node::InlineExpression(&select.selector));
                out.extend(select.variants.iter().map(Node::Variant));
            }
            Node::InlineExpression(inline) => match inline {
                InlineExpression::StringLiteral { .. } | InlineExpression::NumberLiteral(_) => {}
                InlineExpression::FunctionReference { id, arguments } => {
                    out.push(Node::Identifier(id));
                    out.push(Node::CallArguments(arguments));
                }
                InlineExpression::MessageReference { id, attribute } => {
                    out.push(Node::Identifier(id));
                    out.extend(attribute.iter().map(Node::Identifier));
                }
                InlineExpression::TermReference {
                    id,
                    attribute,
                    arguments,
                } => {
                    out.push(Node::Identifier(id));
                    out.extend(attribute.iter().map(Node::Identifier));
                    out.extend(arguments.iter().map(Node::CallArguments));
                }
                InlineExpression::VariableReference { id } => out.push(Node::Identifier(id)),
                InlineExpression::Placeable { expression } => out.push(Node::Placeable(expression)),
            },
            Node::Variant(variant) => {
                out.push(Node::VariantKey(&variant.key));
                out.push(Node::Pattern(&variant.value));
            }
            Node::CallArguments(arguments) => {
                out.extend(arguments.positional.iter().map(Node::InlineExpression));
                out.extend(arguments.named.iter().map(Node::NamedArgument));
            }
            Node::NamedArgument(argument) => {
                out.push(Node::Identifier(&argument.name));
                out.push(Node::InlineExpression(&argument.value));
            }
            Node::Comment(_)
            | Node::Junk(_)
            | Node::Identifier(_)
            | Node::TextElement(_)
            | Node::VariantKey(_) => {}
        }
        out
    }

    /// Placeables and argument lists each open one nesting level.
    pub fn is_nesting(&self) -> bool {
        matches!(self, Node::Placeable(_) | Node::CallArguments(_))
    }

    /// Call the hook matching this node's kind.
    pub fn accept<V: Visitor<'a> + ?Sized>(self, visitor: &mut V) -> Visit {
        match self {
            Node::Resource(node) => visitor.visit_resource(node),
            Node::Message(node) => visitor.visit_message(node),
            Node::Term(node) => visitor.visit_term(node),
            Node::Attribute(node) => visitor.visit_attribute(node),
            Node::Comment(node) => visitor.visit_comment(node),
            Node::Junk(node) => visitor.visit_junk(node),
            Node::Identifier(node) => visitor.visit_identifier(node),
            Node::Pattern(node) => visitor.visit_pattern(node),
            Node::TextElement(node) => visitor.visit_text(node),
            Node::Placeable(node) => visitor.visit_placeable(node),
            Node::SelectExpression(node) => visitor.visit_select(node),
            Node::InlineExpression(node) => visitor.visit_inline(node),
            Node::Variant(node) => visitor.visit_variant(node),
            Node::VariantKey(node) => visitor.visit_variant_key(node),
            Node::CallArguments(node) => visitor.visit_call_arguments(node),
            Node::NamedArgument(node) => visitor.visit_named_argument(node),
        }
    }
}

/// Per-kind hooks. Every default returns [`Visit::Continue`].
pub trait Visitor<'a> {
    fn visit_resource(&mut self, _resource: &'a Resource) -> Visit {
        Visit::Continue
    }
    fn visit_message(&mut self, _message: &'a Message) -> Visit {
        Visit::Continue
    }
    fn visit_term(&mut self, _term: &'a Term) -> Visit {
        Visit::Continue
    }
    fn visit_attribute(&mut self, _attribute: &'a Attribute) -> Visit {
        Visit::Continue
    }
    fn visit_comment(&mut self, _comment: &'a Comment) -> Visit {
        Visit::Continue
    }
    fn visit_junk(&mut self, _junk: &'a Junk) -> Visit {
        Visit::Continue
    }
    fn visit_identifier(&mut self, _identifier: &'a Identifier) -> Visit {
        Visit::Continue
    }
    fn visit_pattern(&mut self, _pattern: &'a Pattern) -> Visit {
        Visit::Continue
    }
    fn visit_text(&mut self, _text: &'a str) -> Visit {
        Visit::Continue
    }
    fn visit_placeable(&mut self, _expression: &'a Expression) -> Visit {
        Visit::Continue
    }
    fn visit_select(&mut self, _select: &'a SelectExpression) -> Visit {
        Visit::Continue
    }
    fn visit_inline(&mut self, _inline: &'a InlineExpression) -> Visit {
        Visit::Continue
    }
    fn visit_variant(&mut self, _variant: &'a Variant) -> Visit {
        Visit::Continue
    }
    fn visit_variant_key(&mut self, _key: &'a VariantKey) -> Visit {
        Visit::Continue
    }
    fn visit_call_arguments(&mut self, _arguments: &'a CallArguments) -> Visit {
        Visit::Continue
    }
    fn visit_named_argument(&mut self, _argument: &'a NamedArgument) -> Visit {
        Visit::Continue
    }

    /// Called after a node and its children were visited.
    fn leave(&mut self, _node: Node<'a>) {}
}

/// Walk `node` and everything below it.
pub fn walk<'a, V>(visitor: &mut V, node: Node<'a>, max_depth: usize) -> Result<(), DepthExceeded>
where
    V: Visitor<'a> + ?Sized,
{
    dispatch(visitor, node, DepthGuard::new(max_depth))
}

fn dispatch<'a, V>(visitor: &mut V, node: Node<'a>, guard: DepthGuard) -> Result<(), DepthExceeded>
where
    V: Visitor<'a> + ?Sized,
{
    let guard = if node.is_nesting() { guard.enter()? } else { guard };
    if node.accept(visitor) == Visit::Continue {
        for child in node.children() {
            dispatch(visitor, child, guard)?;
        }
    }
    visitor.leave(node);
    Ok(())
}
