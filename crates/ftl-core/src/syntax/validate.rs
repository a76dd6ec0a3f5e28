//! Structural checks run before serialization

use super::ast::*;
use super::serializer::SerializeError;
use super::visitor::{Node, Visit, Visitor, walk};

/// First structural problem in `resource`, if any.
pub(crate) fn validate(resource: &Resource, max_depth: usize) -> Result<(), SerializeError> {
    let mut validator = Validator::default();
    walk(&mut validator, Node::Resource(resource), max_depth)?;
    match validator.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[derive(Default)]
struct Validator {
    error: Option<SerializeError>,
}

impl Validator {
    fn check(&mut self, result: Result<(), SerializeError>) -> Visit {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
        if self.error.is_some() {
            Visit::Skip
        } else {
            Visit::Continue
        }
    }
}

fn non_empty(pattern: &Pattern, context: impl FnOnce() -> String) -> Result<(), SerializeError> {
    if pattern.is_empty() {
        return Err(SerializeError::EmptyPattern { context: context() });
    }
    Ok(())
}

impl<'a> Visitor<'a> for Validator {
    fn visit_message(&mut self, message: &'a Message) -> Visit {
        let has_value = message.value.as_ref().is_some_and(|value| !value.is_empty());
        let result = if !has_value && message.attributes.is_empty() {
            Err(SerializeError::EmptyMessage {
                id: message.id.name.clone(),
            })
        } else {
            Ok(())
        };
        self.check(result)
    }

    fn visit_term(&mut self, term: &'a Term) -> Visit {
        self.check(non_empty(&term.value, || format!("term `-{}`", term.id.name)))
    }

    fn visit_attribute(&mut self, attribute: &'a Attribute) -> Visit {
        self.check(non_empty(&attribute.value, || {
            format!("attribute `.{}`", attribute.id.name)
        }))
    }

    fn visit_identifier(&mut self, identifier: &'a Identifier) -> Visit {
        let result = if Identifier::is_valid(&identifier.name) {
            Ok(())
        } else {
            Err(SerializeError::InvalidIdentifier {
                name: identifier.name.clone(),
            })
        };
        self.check(result)
    }

    fn visit_placeable(&mut self, expression: &'a Expression) -> Visit {
        let result = match expression {
            Expression::Inline(InlineExpression::TermReference {
                id,
                attribute: Some(attribute),
                ..
            }) => Err(SerializeError::TermAttributeAsPlaceable {
                id: id.name.clone(),
                attribute: attribute.name.clone(),
            }),
            _ => Ok(()),
        };
        self.check(result)
    }

    fn visit_select(&mut self, select: &'a SelectExpression) -> Visit {
        let defaults = select.variants.iter().filter(|variant| variant.default).count();
        let reason = match &select.selector {
            InlineExpression::MessageReference { attribute: None, .. } => Some("a message reference"),
            InlineExpression::MessageReference { .. } => Some("a message attribute"),
            InlineExpression::TermReference { attribute: None, .. } => Some("a term reference"),
            InlineExpression::Placeable { .. } => Some("a placeable"),
            _ => None,
        };
        let result = if select.variants.is_empty() {
            Err(SerializeError::MissingVariants)
        } else if defaults == 0 {
            Err(SerializeError::MissingDefaultVariant)
        } else if defaults > 1 {
            Err(SerializeError::MultipleDefaultVariants { count: defaults })
        } else if let Some(reason) = reason {
            Err(SerializeError::InvalidSelector { reason })
        } else {
            Ok(())
        };
        self.check(result)
    }

    fn visit_variant(&mut self, variant: &'a Variant) -> Visit {
        self.check(non_empty(&variant.value, || {
            format!("variant `[{}]`", variant.key.as_str())
        }))
    }

    fn visit_variant_key(&mut self, key: &'a VariantKey) -> Visit {
        let result = match key {
            VariantKey::Identifier { name } if !Identifier::is_valid(name) => {
                Err(SerializeError::InvalidIdentifier { name: name.clone() })
            }
            VariantKey::NumberLiteral(number) if NumberLiteral::parse(&number.raw).is_none() => {
                Err(SerializeError::InvalidNumberLiteral {
                    raw: number.raw.clone(),
                })
            }
            _ => Ok(()),
        };
        self.check(result)
    }

    fn visit_inline(&mut self, inline: &'a InlineExpression) -> Visit {
        let result = match inline {
            InlineExpression::NumberLiteral(number) if NumberLiteral::parse(&number.raw).is_none() => {
                Err(SerializeError::InvalidNumberLiteral {
                    raw: number.raw.clone(),
                })
            }
            InlineExpression::TermReference {
                id,
                arguments: Some(arguments),
                ..
            } if !arguments.positional.is_empty() => Err(SerializeError::PositionalArgumentInTermCall {
                id: id.name.clone(),
            }),
            _ => Ok(()),
        };
        self.check(result)
    }

    fn visit_call_arguments(&mut self, arguments: &'a CallArguments) -> Visit {
        let duplicate = arguments.named.iter().enumerate().find(|(idx, argument)| {
            arguments.named[..*idx]
                .iter()
                .any(|earlier| earlier.name == argument.name)
        });
        let result = match duplicate {
            Some((_, argument)) => Err(SerializeError::DuplicatedNamedArgument {
                name: argument.name.name.clone(),
            }),
            None => Ok(()),
        };
        self.check(result)
    }

    fn visit_named_argument(&mut self, argument: &'a NamedArgument) -> Visit {
        let result = match argument.value {
            InlineExpression::StringLiteral { .. } | InlineExpression::NumberLiteral(_) => Ok(()),
            _ => Err(SerializeError::InvalidNamedArgument {
                name: argument.name.name.clone(),
            }),
        };
        self.check(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::depth::DEFAULT_MAX_DEPTH;

    fn select(variants: Vec<Variant>) -> Resource {
        Resource::new(vec![Entry::Message(Message::new(
            "key",
            Some(Pattern::new(vec![PatternElement::placeable(SelectExpression {
                selector: InlineExpression::variable("n"),
                variants,
            })])),
        ))])
    }

    fn variant(name: &str, default: bool) -> Variant {
        Variant {
            key: VariantKey::Identifier { name: name.into() },
            value: Pattern::text(name),
            default,
        }
    }

    #[test]
    fn test_default_variant_count() {
        assert_eq!(
            validate(&select(vec![variant("a", false)]), DEFAULT_MAX_DEPTH),
            Err(SerializeError::MissingDefaultVariant)
        );
        assert_eq!(
            validate(
                &select(vec![variant("a", true), variant("b", true)]),
                DEFAULT_MAX_DEPTH
            ),
            Err(SerializeError::MultipleDefaultVariants { count: 2 })
        );
        assert_eq!(validate(&select(vec![]), DEFAULT_MAX_DEPTH), Err(SerializeError::MissingVariants));
        assert!(validate(&select(vec![variant("a", false), variant("b", true)]), DEFAULT_MAX_DEPTH).is_ok());
    }

    #[test]
    fn test_invalid_identifier() {
        let resource = Resource::new(vec![Entry::Message(Message::new(
            "not valid",
            Some(Pattern::text("x")),
        ))]);
        assert_eq!(
            validate(&resource, DEFAULT_MAX_DEPTH),
            Err(SerializeError::InvalidIdentifier {
                name: "not valid".into()
            })
        );
    }

    #[test]
    fn test_term_call_with_positional_arguments() {
        let call = InlineExpression::TermReference {
            id: Identifier::new("brand"),
            attribute: None,
            arguments: Some(CallArguments {
                positional: vec![InlineExpression::string("x")],
                named: vec![],
            }),
        };
        let resource = Resource::new(vec![Entry::Message(Message::new(
            "key",
            Some(Pattern::new(vec![PatternElement::placeable(call)])),
        ))]);
        assert_eq!(
            validate(&resource, DEFAULT_MAX_DEPTH),
            Err(SerializeError::PositionalArgumentInTermCall { id: "brand".into() })
        );
    }

    #[test]
    fn test_empty_message() {
        let resource = Resource::new(vec![Entry::Message(Message::new("key", None))]);
        assert_eq!(
            validate(&resource, DEFAULT_MAX_DEPTH),
            Err(SerializeError::EmptyMessage { id: "key".into() })
        );
    }
}
