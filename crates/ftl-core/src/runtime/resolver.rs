//! Tree-walking evaluation of messages
//!
//! [`Resolver::resolve`] turns a message (or one of its attributes) into a
//! string and the list of errors met on the way. It never fails: a missing
//! variable, an unknown reference, a cycle, a depth overflow or a failing
//! function each add an error and leave a placeholder in the output:
//!
//! | expression      | placeholder    |
//! |-----------------|----------------|
//! | `$name`         | `{$name}`      |
//! | `id`, `id.attr` | `{id}`, `{id.attr}` |
//! | `-term`         | `{-term}`      |
//! | `FUNC(...)`     | `{FUNC()}`     |
//!
//! Nesting is bounded by one [`DepthGuard`] threaded through the whole
//! call: message and term references, select expressions, nested
//! placeables and call arguments each take a level.

use serde::{Deserialize, Serialize};
use tracing::trace;
use unic_langid::LanguageIdentifier;

use super::context::ResolutionContext;
use super::errors::ResolverError;
use super::functions::FunctionRegistry;
use super::plural::PluralRules;
use super::value::{Arguments, NumberValue, Value};
use crate::syntax::ast::*;
use crate::syntax::depth::{DEFAULT_MAX_DEPTH, DepthGuard};

/// First strong isolate.
pub const FSI: char = '\u{2068}';
/// Pop directional isolate.
pub const PDI: char = '\u{2069}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub max_depth: usize,
    /// Wrap interpolated values in FSI/PDI.
    pub use_isolating: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            use_isolating: false,
        }
    }
}

/// Message and term tables the resolver reads from.
pub trait EntryLookup {
    fn message(&self, id: &str) -> Option<&Message>;
    fn term(&self, id: &str) -> Option<&Term>;
}

impl EntryLookup for Resource {
    fn message(&self, id: &str) -> Option<&Message> {
        self.get_message(id)
    }

    fn term(&self, id: &str) -> Option<&Term> {
        self.get_term(id)
    }
}

pub struct Resolver<'r> {
    entries: &'r dyn EntryLookup,
    functions: &'r FunctionRegistry,
    plurals: &'r dyn PluralRules,
    locale: &'r LanguageIdentifier,
    options: ResolverOptions,
}

impl<'r> Resolver<'r> {
    pub fn new(
        entries: &'r dyn EntryLookup,
        functions: &'r FunctionRegistry,
        plurals: &'r dyn PluralRules,
        locale: &'r LanguageIdentifier,
        options: ResolverOptions,
    ) -> Self {
        Self {
            entries,
            functions,
            plurals,
            locale,
            options,
        }
    }

    /// Resolve the value of `message`, or its `attribute`.
    pub fn resolve(
        &self,
        message: &Message,
        args: Option<&Arguments>,
        attribute: Option<&str>,
    ) -> (String, Vec<ResolverError>) {
        let mut ctx = ResolutionContext::new();
        let id = &message.id.name;

        let (key, pattern) = match attribute {
            Some(name) => match message.get_attribute(name) {
                Some(attribute) => (format!("{id}.{name}"), &attribute.value),
                None => {
                    ctx.report(ResolverError::UnknownAttribute {
                        id: id.clone(),
                        attribute: name.to_string(),
                    });
                    return (format!("{{{id}.{name}}}"), ctx.into_errors());
                }
            },
            None => match &message.value {
                Some(value) => (id.clone(), value),
                None => {
                    ctx.report(ResolverError::NoValue { id: id.clone() });
                    return (format!("{{{id}}}"), ctx.into_errors());
                }
            },
        };

        trace!("Resolving `{}`", key);
        let guard = DepthGuard::new(self.options.max_depth);
        let output = ctx.with_frame(key.clone(), guard, |ctx, guard| {
            self.pattern(pattern, args, ctx, guard)
        });

        let output = match output {
            Some(text) if !(text.is_empty() && ctx.has_errors() && !pattern.is_empty()) => text,
            _ => format!("{{{key}}}"),
        };
        (output, ctx.into_errors())
    }

    /// Resolve a standalone pattern, e.g. one built programmatically.
    pub fn resolve_pattern(
        &self,
        pattern: &Pattern,
        args: Option<&Arguments>,
    ) -> (String, Vec<ResolverError>) {
        let mut ctx = ResolutionContext::new();
        let output = self.pattern(pattern, args, &mut ctx, DepthGuard::new(self.options.max_depth));
        (output, ctx.into_errors())
    }

    fn pattern(
        &self,
        pattern: &Pattern,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> String {
        let isolate = self.options.use_isolating && pattern.elements.len() > 1;
        let mut out = String::new();

        for element in &pattern.elements {
            match element {
                PatternElement::TextElement { value } => out.push_str(value),
                PatternElement::Placeable { expression } => {
                    let value = self.expression(expression, args, ctx, guard);
                    if isolate {
                        out.push(FSI);
                        out.push_str(&value.to_string());
                        out.push(PDI);
                    } else {
                        out.push_str(&value.to_string());
                    }
                }
            }
        }
        out
    }

    fn enter(&self, ctx: &mut ResolutionContext, guard: DepthGuard) -> Option<DepthGuard> {
        match guard.enter() {
            Ok(guard) => Some(guard),
            Err(err) => {
                let key = ctx.current_key().to_string();
                ctx.report(ResolverError::DepthExceeded {
                    key,
                    max_depth: err.max_depth,
                });
                None
            }
        }
    }

    fn expression(
        &self,
        expression: &Expression,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> Value {
        match expression {
            Expression::Inline(inline) => self.inline(inline, args, ctx, guard),
            Expression::Select(select) => {
                let Some(guard) = self.enter(ctx, guard) else {
                    return Value::String(fallback(&select.selector));
                };
                let selector = self.inline(&select.selector, args, ctx, guard);
                match self.select_variant(&selector, &select.variants) {
                    Some(variant) => Value::String(self.pattern(&variant.value, args, ctx, guard)),
                    None => Value::String(fallback(&select.selector)),
                }
            }
        }
    }

    /// Exact key match first, then the plural category of a numeric
    /// selector, then the default variant. An absent selector matches as
    /// the empty string, which no key equals.
    fn select_variant<'v>(&self, selector: &Value, variants: &'v [Variant]) -> Option<&'v Variant> {
        let exact = variants.iter().find(|variant| match (&variant.key, selector) {
            (VariantKey::Identifier { name }, Value::String(text)) => name == text,
            (VariantKey::Identifier { name }, Value::None) => name.is_empty(),
            (VariantKey::NumberLiteral(key), Value::Number(number)) => key.value == number.value,
            _ => false,
        });

        exact
            .or_else(|| {
                let number = selector.as_number()?;
                let category = self.plurals.category_for(number, self.locale);
                variants.iter().find(|variant| {
                    matches!(&variant.key, VariantKey::Identifier { name } if name == category.as_str())
                })
            })
            .or_else(|| variants.iter().find(|variant| variant.default))
            // Only reachable for unvalidated trees without a default.
            .or_else(|| variants.first())
    }

    fn inline(
        &self,
        inline: &InlineExpression,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> Value {
        match inline {
            InlineExpression::StringLiteral { value } => Value::String(value.clone()),
            InlineExpression::NumberLiteral(number) => Value::Number(NumberValue::from_literal(number)),
            InlineExpression::VariableReference { id } => {
                match args.and_then(|args| args.get(&id.name)) {
                    Some(value) => value.clone(),
                    None => {
                        ctx.report(ResolverError::UnknownVariable {
                            name: id.name.clone(),
                        });
                        Value::String(fallback(inline))
                    }
                }
            }
            InlineExpression::MessageReference { id, attribute } => {
                Value::String(self.message_reference(id, attribute.as_ref(), args, ctx, guard))
            }
            InlineExpression::TermReference {
                id,
                attribute,
                arguments,
            } => Value::String(self.term_reference(
                id,
                attribute.as_ref(),
                arguments.as_ref(),
                args,
                ctx,
                guard,
            )),
            InlineExpression::FunctionReference { id, arguments } => {
                self.function_call(id, arguments, args, ctx, guard)
            }
            InlineExpression::Placeable { expression } => match self.enter(ctx, guard) {
                Some(guard) => self.expression(expression, args, ctx, guard),
                None => Value::String(fallback(inline)),
            },
        }
    }

    fn message_reference(
        &self,
        id: &Identifier,
        attribute: Option<&Identifier>,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> String {
        let key = match attribute {
            Some(attribute) => format!("{}.{}", id.name, attribute.name),
            None => id.name.clone(),
        };
        let placeholder = format!("{{{key}}}");

        let Some(message) = self.entries.message(&id.name) else {
            ctx.report(ResolverError::UnknownMessage { id: id.name.clone() });
            return placeholder;
        };
        let pattern = match attribute {
            Some(attribute) => message.get_attribute(&attribute.name).map(|attr| &attr.value),
            None => message.value.as_ref(),
        };
        let Some(pattern) = pattern else {
            ctx.report(match attribute {
                Some(attribute) => ResolverError::UnknownAttribute {
                    id: id.name.clone(),
                    attribute: attribute.name.clone(),
                },
                None => ResolverError::NoValue { id: id.name.clone() },
            });
            return placeholder;
        };

        ctx.with_frame(key, guard, |ctx, guard| self.pattern(pattern, args, ctx, guard))
            .unwrap_or(placeholder)
    }

    /// Terms see only the named arguments of their own call.
    fn term_reference(
        &self,
        id: &Identifier,
        attribute: Option<&Identifier>,
        arguments: Option<&CallArguments>,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> String {
        let key = match attribute {
            Some(attribute) => format!("-{}.{}", id.name, attribute.name),
            None => format!("-{}", id.name),
        };
        let placeholder = format!("{{{key}}}");

        let Some(term) = self.entries.term(&id.name) else {
            ctx.report(ResolverError::UnknownTerm { id: id.name.clone() });
            return placeholder;
        };
        let pattern = match attribute {
            Some(attribute) => match term.get_attribute(&attribute.name) {
                Some(attr) => &attr.value,
                None => {
                    ctx.report(ResolverError::UnknownAttribute {
                        id: format!("-{}", id.name),
                        attribute: attribute.name.clone(),
                    });
                    return placeholder;
                }
            },
            None => &term.value,
        };

        let mut local = Arguments::new();
        if let Some(arguments) = arguments {
            let Some(inner) = self.enter(ctx, guard) else {
                return placeholder;
            };
            for argument in &arguments.named {
                let value = self.inline(&argument.value, args, ctx, inner);
                local.insert(argument.name.name.clone(), value);
            }
        }

        ctx.with_frame(key, guard, |ctx, guard| {
            self.pattern(pattern, Some(&local), ctx, guard)
        })
        .unwrap_or(placeholder)
    }

    fn function_call(
        &self,
        id: &Identifier,
        arguments: &CallArguments,
        args: Option<&Arguments>,
        ctx: &mut ResolutionContext,
        guard: DepthGuard,
    ) -> Value {
        let placeholder = || Value::String(format!("{{{}()}}", id.name));
        let Some(guard) = self.enter(ctx, guard) else {
            return placeholder();
        };

        let positional = arguments
            .positional
            .iter()
            .map(|argument| self.inline(argument, args, ctx, guard))
            .collect();
        let named = arguments
            .named
            .iter()
            .map(|argument| {
                (
                    argument.name.name.clone(),
                    self.inline(&argument.value, args, ctx, guard),
                )
            })
            .collect();

        match self.functions.call(&id.name, positional, named, self.locale) {
            Ok(value) => value,
            Err(err) => {
                ctx.report(err.into());
                placeholder()
            }
        }
    }
}

/// Placeholder text for an expression that could not be evaluated.
fn fallback(inline: &InlineExpression) -> String {
    match inline {
        InlineExpression::StringLiteral { value } => value.clone(),
        InlineExpression::NumberLiteral(number) => number.raw.clone(),
        InlineExpression::VariableReference { id } => format!("{{${}}}", id.name),
        InlineExpression::MessageReference { id, attribute } => match attribute {
            Some(attribute) => format!("{{{}.{}}}", id.name, attribute.name),
            None => format!("{{{}}}", id.name),
        },
        InlineExpression::TermReference { id, attribute, .. } => match attribute {
            Some(attribute) => format!("{{-{}.{}}}", id.name, attribute.name),
            None => format!("{{-{}}}", id.name),
        },
        InlineExpression::FunctionReference { id, .. } => format!("{{{}()}}", id.name),
        InlineExpression::Placeable { .. } => "{???}".to_string(),
    }
}
