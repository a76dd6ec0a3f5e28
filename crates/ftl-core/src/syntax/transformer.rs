//! Rebuilding AST traversal
//!
//! A [`Transformer`] hook looks at a node and answers with a [`Transform`]:
//! keep it (and descend), replace it, remove it, or expand it into several
//! nodes. The fold checks every answer against the field it came from:
//! removal needs a collection or optional field, and expansion into
//! anything but exactly one node needs a collection.
//!
//! The input tree is never modified; [`transform_resource`] returns a new one.

use thiserror::Error;

use super::ast::*;
use super::depth::{DepthExceeded, DepthGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum Transform<T> {
    /// Keep the node and transform its children.
    Keep,
    /// Use this node instead; its children are not visited.
    Replace(T),
    Remove,
    Expand(Vec<T>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("cannot remove the required `{field}` field")]
    InvalidRemoval { field: &'static str },
    #[error("`{field}` holds a single node, got an expansion of {count}")]
    InvalidExpansion { field: &'static str, count: usize },
    #[error(transparent)]
    Depth(#[from] DepthExceeded),
}

/// Hooks default to [`Transform::Keep`].
///
/// `transform_comment` sees comments attached to messages and terms;
/// standalone comments reach `transform_entry` as [`Entry::Comment`].
pub trait Transformer {
    fn transform_entry(&mut self, _entry: &Entry) -> Transform<Entry> {
        Transform::Keep
    }
    fn transform_comment(&mut self, _comment: &Comment) -> Transform<Comment> {
        Transform::Keep
    }
    fn transform_attribute(&mut self, _attribute: &Attribute) -> Transform<Attribute> {
        Transform::Keep
    }
    fn transform_pattern(&mut self, _pattern: &Pattern) -> Transform<Pattern> {
        Transform::Keep
    }
    fn transform_element(&mut self, _element: &PatternElement) -> Transform<PatternElement> {
        Transform::Keep
    }
    fn transform_expression(&mut self, _expression: &Expression) -> Transform<Expression> {
        Transform::Keep
    }
    fn transform_inline(&mut self, _inline: &InlineExpression) -> Transform<InlineExpression> {
        Transform::Keep
    }
    fn transform_variant(&mut self, _variant: &Variant) -> Transform<Variant> {
        Transform::Keep
    }
}

pub fn transform_resource<T>(
    transformer: &mut T,
    resource: &Resource,
    max_depth: usize,
) -> Result<Resource, TransformError>
where
    T: Transformer + ?Sized,
{
    let mut fold = Fold { transformer };
    let body = fold.many(
        &resource.body,
        DepthGuard::new(max_depth),
        T::transform_entry,
        Fold::entry,
    )?;
    Ok(Resource::new(body))
}

type Hook<T, N> = fn(&mut T, &N) -> Transform<N>;
type Rebuild<'t, T, N> = fn(&mut Fold<'t, T>, &N, DepthGuard) -> Result<N, TransformError>;

struct Fold<'t, T: ?Sized> {
    transformer: &'t mut T,
}

impl<'t, T: Transformer + ?Sized> Fold<'t, T> {
    fn many<N>(
        &mut self,
        nodes: &[N],
        guard: DepthGuard,
        hook: Hook<T, N>,
        rebuild: Rebuild<'t, T, N>,
    ) -> Result<Vec<N>, TransformError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match hook(&mut *self.transformer, node) {
                Transform::Keep => out.push(rebuild(self, node, guard)?),
                Transform::Replace(new) => out.push(new),
                Transform::Remove => {}
                Transform::Expand(nodes) => out.extend(nodes),
            }
        }
        Ok(out)
    }

    fn one<N>(
        &mut self,
        node: &N,
        field: &'static str,
        guard: DepthGuard,
        hook: Hook<T, N>,
        rebuild: Rebuild<'t, T, N>,
    ) -> Result<N, TransformError> {
        match hook(&mut *self.transformer, node) {
            Transform::Keep => rebuild(self, node, guard),
            Transform::Replace(new) => Ok(new),
            Transform::Remove => Err(TransformError::InvalidRemoval { field }),
            Transform::Expand(mut nodes) if nodes.len() == 1 => {
                nodes.pop().ok_or(TransformError::InvalidRemoval { field })
            }
            Transform::Expand(nodes) => Err(TransformError::InvalidExpansion {
                field,
                count: nodes.len(),
            }),
        }
    }

    fn optional<N>(
        &mut self,
        node: Option<&N>,
        field: &'static str,
        guard: DepthGuard,
        hook: Hook<T, N>,
        rebuild: Rebuild<'t, T, N>,
    ) -> Result<Option<N>, TransformError> {
        let Some(node) = node else {
            return Ok(None);
        };
        match hook(&mut *self.transformer, node) {
            Transform::Keep => rebuild(self, node, guard).map(Some),
            Transform::Replace(new) => Ok(Some(new)),
            Transform::Remove => Ok(None),
            Transform::Expand(mut nodes) if nodes.len() <= 1 => Ok(nodes.pop()),
            Transform::Expand(nodes) => Err(TransformError::InvalidExpansion {
                field,
                count: nodes.len(),
            }),
        }
    }

    fn entry(&mut self, entry: &Entry, guard: DepthGuard) -> Result<Entry, TransformError> {
        Ok(match entry {
            Entry::Message(message) => Entry::Message(Message {
                id: message.id.clone(),
                value: self.optional(
                    message.value.as_ref(),
                    "value",
                    guard,
                    T::transform_pattern,
                    Fold::pattern,
                )?,
                attributes: self.many(
                    &message.attributes,
                    guard,
                    T::transform_attribute,
                    Fold::attribute,
                )?,
                comment: self.optional(
                    message.comment.as_ref(),
                    "comment",
                    guard,
                    T::transform_comment,
                    Fold::comment,
                )?,
            }),
            Entry::Term(term) => Entry::Term(Term {
                id: term.id.clone(),
                value: self.one(&term.value, "value", guard, T::transform_pattern, Fold::pattern)?,
                attributes: self.many(
                    &term.attributes,
                    guard,
                    T::transform_attribute,
                    Fold::attribute,
                )?,
                comment: self.optional(
                    term.comment.as_ref(),
                    "comment",
                    guard,
                    T::transform_comment,
                    Fold::comment,
                )?,
            }),
            Entry::Comment(_) | Entry::Junk(_) => entry.clone(),
        })
    }

    fn comment(&mut self, comment: &Comment, _guard: DepthGuard) -> Result<Comment, TransformError> {
        Ok(comment.clone())
    }

    fn attribute(
        &mut self,
        attribute: &Attribute,
        guard: DepthGuard,
    ) -> Result<Attribute, TransformError> {
        Ok(Attribute {
            id: attribute.id.clone(),
            value: self.one(
                &attribute.value,
                "value",
                guard,
                T::transform_pattern,
                Fold::pattern,
            )?,
        })
    }

    fn pattern(&mut self, pattern: &Pattern, guard: DepthGuard) -> Result<Pattern, TransformError> {
        Ok(Pattern::new(self.many(
            &pattern.elements,
            guard,
            T::transform_element,
            Fold::element,
        )?))
    }

    fn element(
        &mut self,
        element: &PatternElement,
        guard: DepthGuard,
    ) -> Result<PatternElement, TransformError> {
        Ok(match element {
            PatternElement::TextElement { .. } => element.clone(),
            PatternElement::Placeable { expression } => PatternElement::Placeable {
                expression: self.one(
                    expression,
                    "expression",
                    guard,
                    T::transform_expression,
                    Fold::expression,
                )?,
            },
        })
    }

    /// Every expression is the body of a placeable: one nesting level.
    fn expression(
        &mut self,
        expression: &Expression,
        guard: DepthGuard,
    ) -> Result<Expression, TransformError> {
        let guard = guard.enter()?;
        Ok(match expression {
            Expression::Select(select) => Expression::Select(SelectExpression {
                selector: self.one(
                    &select.selector,
                    "selector",
                    guard,
                    T::transform_inline,
                    Fold::inline,
                )?,
                variants: self.many(&select.variants, guard, T::transform_variant, Fold::variant)?,
            }),
            Expression::Inline(inline) => Expression::Inline(self.one(
                inline,
                "expression",
                guard,
                T::transform_inline,
                Fold::inline,
            )?),
        })
    }

    fn inline(
        &mut self,
        inline: &InlineExpression,
        guard: DepthGuard,
    ) -> Result<InlineExpression, TransformError> {
        Ok(match inline {
            InlineExpression::FunctionReference { id, arguments } => {
                InlineExpression::FunctionReference {
                    id: id.clone(),
                    arguments: self.arguments(arguments, guard)?,
                }
            }
            InlineExpression::TermReference {
                id,
                attribute,
                arguments,
            } => InlineExpression::TermReference {
                id: id.clone(),
                attribute: attribute.clone(),
                arguments: match arguments {
                    Some(arguments) => Some(self.arguments(arguments, guard)?),
                    None => None,
                },
            },
            InlineExpression::Placeable { expression } => InlineExpression::Placeable {
                expression: Box::new(self.one(
                    expression.as_ref(),
                    "expression",
                    guard,
                    T::transform_expression,
                    Fold::expression,
                )?),
            },
            InlineExpression::StringLiteral { .. }
            | InlineExpression::NumberLiteral(_)
            | InlineExpression::MessageReference { .. }
            | InlineExpression::VariableReference { .. } => inline.clone(),
        })
    }

    fn arguments(
        &mut self,
        arguments: &CallArguments,
        guard: DepthGuard,
    ) -> Result<CallArguments, TransformError> {
        let guard = guard.enter()?;
        let positional = self.many(&arguments.positional, guard, T::transform_inline, Fold::inline)?;
        let mut named = Vec::with_capacity(arguments.named.len());
        for argument in &arguments.named {
            named.push(NamedArgument {
                name: argument.name.clone(),
                value: self.one(
                    &argument.value,
                    "value",
                    guard,
                    T::transform_inline,
                    Fold::inline,
                )?,
            });
        }
        Ok(CallArguments { positional, named })
    }

    fn variant(&mut self, variant: &Variant, guard: DepthGuard) -> Result<Variant, TransformError> {
        Ok(Variant {
            key: variant.key.clone(),
            value: self.one(&variant.value, "value", guard, T::transform_pattern, Fold::pattern)?,
            default: variant.default,
        })
    }
}
