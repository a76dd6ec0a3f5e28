//! Placeables, inline expressions, select expressions and call arguments

use super::entry::expect;
use super::{PResult, Parser, ParserError, ParserErrorKind};
use crate::syntax::ast::{
    CallArguments, Expression, Identifier, InlineExpression, NamedArgument, NumberLiteral,
    SelectExpression, Span, Variant, VariantKey,
};
use crate::syntax::cursor::Cursor;
use crate::syntax::depth::DepthGuard;

impl Parser {
    /// `{ expression }` or `{ selector -> variants }`, cursor on the `{`.
    pub(super) fn placeable<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, Expression> {
        let guard = guard.enter().map_err(|err| ParserError::depth(err, &start))?;
        let cursor = expect(start, '{')?.skip_whitespace();
        let selector_start = cursor;
        let (inline, cursor) = self.inline_expression(cursor, guard)?;
        let cursor = cursor.skip_whitespace();

        if cursor.starts_with("->") {
            check_selector(&inline, &selector_start)?;
            let cursor = cursor.advance(2).skip_spaces();
            if !cursor.at_line_end() {
                return Err(ParserError::expected('\n', &cursor));
            }
            let (variants, cursor) = self.variants(cursor, guard)?;
            let cursor = expect(cursor.skip_whitespace(), '}')?;
            let select = SelectExpression {
                selector: inline,
                variants,
            };
            return Ok((Expression::Select(select), cursor));
        }

        if let InlineExpression::TermReference {
            attribute: Some(_), ..
        } = inline
        {
            return Err(ParserError::new(
                ParserErrorKind::TermAttributeAsPlaceable,
                Span::new(selector_start.pos(), cursor.pos()),
            ));
        }

        let cursor = expect(cursor, '}')?;
        Ok((Expression::Inline(inline), cursor))
    }

    pub(super) fn inline_expression<'s>(
        &self,
        cursor: Cursor<'s>,
        guard: DepthGuard,
    ) -> PResult<'s, InlineExpression> {
        match cursor.current()? {
            '"' => string_literal(cursor),
            '$' => {
                let (id, next) = self.identifier(cursor.advance(1))?;
                Ok((InlineExpression::VariableReference { id }, next))
            }
            '{' => {
                let (expression, next) = self.placeable(cursor, guard)?;
                let inline = InlineExpression::Placeable {
                    expression: Box::new(expression),
                };
                Ok((inline, next))
            }
            '-' if cursor.peek(1).is_some_and(|ch| ch.is_ascii_digit()) => {
                let (number, next) = number_literal(cursor)?;
                Ok((InlineExpression::NumberLiteral(number), next))
            }
            '-' => self.term_reference(cursor, guard),
            ch if ch.is_ascii_digit() => {
                let (number, next) = number_literal(cursor)?;
                Ok((InlineExpression::NumberLiteral(number), next))
            }
            ch if ch.is_ascii_alphabetic() => {
                let (id, next) = self.identifier(cursor)?;
                let (attribute, next) = self.attribute_accessor(next)?;
                let call = next.skip_whitespace();
                if call.is_current('(') {
                    if attribute.is_some() {
                        return Err(ParserError::at(ParserErrorKind::ForbiddenCallee, &cursor));
                    }
                    let (arguments, next) = self.call_arguments(call, guard)?;
                    return Ok((InlineExpression::FunctionReference { id, arguments }, next));
                }
                Ok((InlineExpression::MessageReference { id, attribute }, next))
            }
            _ => Err(ParserError::at(
                ParserErrorKind::ExpectedInlineExpression,
                &cursor,
            )),
        }
    }

    fn term_reference<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, InlineExpression> {
        let (id, cursor) = self.identifier(start.advance(1))?;
        let (attribute, cursor) = self.attribute_accessor(cursor)?;
        let call = cursor.skip_whitespace();
        let (arguments, cursor) = if call.is_current('(') {
            let (arguments, next) = self.call_arguments(call, guard)?;
            if !arguments.positional.is_empty() {
                return Err(ParserError::new(
                    ParserErrorKind::PositionalArgumentInTermCall,
                    Span::new(start.pos(), next.pos()),
                ));
            }
            (Some(arguments), next)
        } else {
            (None, cursor)
        };
        let term = InlineExpression::TermReference {
            id,
            attribute,
            arguments,
        };
        Ok((term, cursor))
    }

    fn attribute_accessor<'s>(&self, cursor: Cursor<'s>) -> PResult<'s, Option<Identifier>> {
        if cursor.is_current('.') {
            let (attribute, next) = self.identifier(cursor.advance(1))?;
            Ok((Some(attribute), next))
        } else {
            Ok((None, cursor))
        }
    }

    /// `( arg, name: "literal", ... )`, cursor on the `(`.
    fn call_arguments<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, CallArguments> {
        let guard = guard.enter().map_err(|err| ParserError::depth(err, &start))?;
        let mut arguments = CallArguments::default();
        let mut cursor = expect(start, '(')?.skip_whitespace();

        loop {
            if cursor.is_current(')') {
                return Ok((arguments, cursor.advance(1)));
            }

            let argument_start = cursor;
            let (expression, next) = self.inline_expression(cursor, guard)?;
            let next = next.skip_whitespace();

            if next.is_current(':') {
                let name = match expression {
                    InlineExpression::MessageReference {
                        id,
                        attribute: None,
                    } => id,
                    _ => {
                        return Err(ParserError::at(
                            ParserErrorKind::ForbiddenKey,
                            &argument_start,
                        ));
                    }
                };
                let value_start = next.advance(1).skip_whitespace();
                let (value, after) = self.inline_expression(value_start, guard)?;
                if !matches!(
                    value,
                    InlineExpression::StringLiteral { .. } | InlineExpression::NumberLiteral(_)
                ) {
                    return Err(ParserError::at(ParserErrorKind::MissingLiteral, &value_start));
                }
                if arguments.named.iter().any(|named| named.name == name) {
                    return Err(ParserError::at(
                        ParserErrorKind::DuplicatedNamedArgument { name: name.name },
                        &argument_start,
                    ));
                }
                arguments.named.push(NamedArgument { name, value });
                cursor = after.skip_whitespace();
            } else {
                if !arguments.named.is_empty() {
                    return Err(ParserError::at(
                        ParserErrorKind::PositionalArgumentFollowsNamed,
                        &argument_start,
                    ));
                }
                arguments.positional.push(expression);
                cursor = next;
            }

            if cursor.is_current(',') {
                cursor = cursor.advance(1).skip_whitespace();
            } else if !cursor.is_current(')') {
                return Err(ParserError::expected(')', &cursor));
            }
        }
    }

    /// Variant list after `->`, cursor at the line end that follows it.
    fn variants<'s>(&self, start: Cursor<'s>, guard: DepthGuard) -> PResult<'s, Vec<Variant>> {
        let mut variants: Vec<Variant> = Vec::new();
        let mut cursor = start;

        loop {
            let look = cursor.skip_whitespace();
            let default = look.is_current('*');
            let key_start = if default { look.advance(1) } else { look };
            if !key_start.is_current('[') {
                break;
            }
            if default && variants.iter().any(|variant| variant.default) {
                return Err(ParserError::at(
                    ParserErrorKind::MultipleDefaultVariants,
                    &look,
                ));
            }

            let (key, after_key) = self.variant_key(key_start.advance(1).skip_whitespace())?;
            let after_key = expect(after_key.skip_whitespace(), ']')?;
            let (value, next) = self.pattern(after_key, guard)?;
            let value = value.ok_or_else(|| ParserError::at(ParserErrorKind::MissingValue, &next))?;
            variants.push(Variant {
                key,
                value,
                default,
            });
            cursor = next;
        }

        if variants.is_empty() {
            return Err(ParserError::at(ParserErrorKind::MissingVariants, &cursor));
        }
        if !variants.iter().any(|variant| variant.default) {
            return Err(ParserError::new(
                ParserErrorKind::MissingDefaultVariant,
                Span::new(start.pos(), cursor.pos()),
            ));
        }
        Ok((variants, cursor))
    }

    fn variant_key<'s>(&self, cursor: Cursor<'s>) -> PResult<'s, VariantKey> {
        match cursor.current()? {
            ch if ch.is_ascii_digit() || ch == '-' => {
                let (number, next) = number_literal(cursor)?;
                Ok((VariantKey::NumberLiteral(number), next))
            }
            _ => {
                let (id, next) = self.identifier(cursor)?;
                Ok((VariantKey::Identifier { name: id.name }, next))
            }
        }
    }
}

fn check_selector(selector: &InlineExpression, at: &Cursor<'_>) -> Result<(), ParserError> {
    let kind = match selector {
        InlineExpression::MessageReference {
            attribute: None, ..
        } => ParserErrorKind::MessageReferenceAsSelector,
        InlineExpression::MessageReference { .. } => ParserErrorKind::MessageAttributeAsSelector,
        InlineExpression::TermReference {
            attribute: None, ..
        } => ParserErrorKind::TermReferenceAsSelector,
        InlineExpression::Placeable { .. } => ParserErrorKind::ExpectedSimpleExpressionAsSelector,
        _ => return Ok(()),
    };
    Err(ParserError::at(kind, at))
}

/// `-?[0-9]+(\.[0-9]+)?`
fn number_literal(start: Cursor<'_>) -> PResult<'_, NumberLiteral> {
    let digits_start = if start.is_current('-') { start.advance(1) } else { start };
    let (int, mut cursor) = digits_start.take_while(|ch| ch.is_ascii_digit());
    if int.is_empty() {
        return Err(digit_expected(&digits_start));
    }
    if cursor.is_current('.') {
        let (frac, next) = cursor.advance(1).take_while(|ch| ch.is_ascii_digit());
        if frac.is_empty() {
            return Err(digit_expected(&cursor.advance(1)));
        }
        cursor = next;
    }
    let raw = start.slice_to(&cursor);
    let number = NumberLiteral::parse(raw).ok_or_else(|| digit_expected(&start))?;
    Ok((number, cursor))
}

fn digit_expected(cursor: &Cursor<'_>) -> ParserError {
    ParserError::at(
        ParserErrorKind::ExpectedCharRange {
            range: "0-9".to_string(),
        },
        cursor,
    )
}

/// Double-quoted literal on a single line; stores the unescaped value.
fn string_literal(start: Cursor<'_>) -> PResult<'_, InlineExpression> {
    let mut cursor = expect(start, '"')?;
    let mut value = String::new();

    loop {
        let (run, next) = cursor.take_while(|ch| !matches!(ch, '"' | '\\' | '\n' | '\r'));
        value.push_str(run);
        cursor = next;

        match cursor.current() {
            Ok('"') => return Ok((InlineExpression::StringLiteral { value }, cursor.advance(1))),
            Ok('\\') => {
                let (ch, next) = escape(cursor)?;
                value.push(ch);
                cursor = next;
            }
            _ => {
                return Err(ParserError::new(
                    ParserErrorKind::UnterminatedStringLiteral,
                    Span::new(start.pos(), cursor.pos()),
                ));
            }
        }
    }
}

/// `\\`, `\"`, `\uXXXX` or `\UXXXXXX`, cursor on the backslash.
fn escape(start: Cursor<'_>) -> Result<(char, Cursor<'_>), ParserError> {
    let cursor = start.advance(1);
    let digits = match cursor.current() {
        Ok('\\') => return Ok(('\\', cursor.advance(1))),
        Ok('"') => return Ok(('"', cursor.advance(1))),
        Ok('u') => 4,
        Ok('U') => 6,
        Ok(other) => {
            return Err(ParserError::new(
                ParserErrorKind::UnknownEscapeSequence {
                    sequence: other.to_string(),
                },
                Span::new(start.pos(), cursor.advance(1).pos()),
            ));
        }
        Err(_) => {
            return Err(ParserError::new(
                ParserErrorKind::UnterminatedStringLiteral,
                Span::new(start.pos(), cursor.pos()),
            ));
        }
    };

    let mut taken = 0;
    let (hex, next) = cursor.advance(1).take_while(|ch| {
        taken += 1;
        taken <= digits && ch.is_ascii_hexdigit()
    });
    if hex.len() != digits {
        return Err(ParserError::new(
            ParserErrorKind::InvalidUnicodeEscapeSequence {
                sequence: start.advance(1).slice_to(&next).to_string(),
            },
            Span::new(start.pos(), next.pos()),
        ));
    }
    let ch = u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Ok((ch, next))
}
