//! Runtime values and argument maps

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::plural::PluralKind;
use crate::syntax::ast::NumberLiteral;

/// Fraction digits are clamped to this.
pub const MAX_FRACTION_DIGITS: usize = 20;

/// Display options attached to a number, set by `NUMBER()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberOptions {
    pub minimum_fraction_digits: Option<usize>,
    pub maximum_fraction_digits: Option<usize>,
    pub kind: PluralKind,
}

impl NumberOptions {
    fn is_default(&self) -> bool {
        self.minimum_fraction_digits.is_none() && self.maximum_fraction_digits.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberValue {
    pub value: f64,
    /// Authored text of a literal, used for display when no options apply.
    source: Option<String>,
    pub options: NumberOptions,
}

impl NumberValue {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            source: None,
            options: NumberOptions::default(),
        }
    }

    pub fn from_literal(literal: &NumberLiteral) -> Self {
        Self {
            value: literal.value,
            source: Some(literal.raw.clone()),
            options: NumberOptions::default(),
        }
    }

    pub fn with_options(self, options: NumberOptions) -> Self {
        Self { options, ..self }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Locale-neutral display: the authored text when available, otherwise
    /// the shortest representation, with fraction digits adjusted to the
    /// options.
    pub fn format(&self) -> String {
        let natural = match &self.source {
            Some(source) => source.clone(),
            None => self.value.to_string(),
        };
        if self.options.is_default() || !self.value.is_finite() {
            return natural;
        }

        let natural_digits = natural
            .split_once('.')
            .map(|(_, fraction)| fraction.len())
            .unwrap_or(0);
        let min = self
            .options
            .minimum_fraction_digits
            .unwrap_or(0)
            .min(MAX_FRACTION_DIGITS);
        let max = self
            .options
            .maximum_fraction_digits
            .unwrap_or_else(|| natural_digits.max(min))
            .min(MAX_FRACTION_DIGITS)
            .max(min);
        let digits = natural_digits.clamp(min, max);
        format!("{:.*}", digits, self.value)
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Intermediate value of an expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    String(String),
    Number(NumberValue),
    /// Explicitly absent; displays and matches as the empty string.
    #[default]
    None,
}

impl Value {
    pub fn as_number(&self) -> Option<&NumberValue> {
        match self {
            Value::Number(number) => Some(number),
            _ => None,
        }
    }

    /// Numeric reading of the value; strings are parsed as decimals.
    pub fn to_number(&self) -> Option<NumberValue> {
        match self {
            Value::Number(number) => Some(number.clone()),
            Value::String(text) => NumberLiteral::parse(text.trim())
                .map(|literal| NumberValue::from_literal(&literal)),
            Value::None => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(text) => f.write_str(text),
            Value::Number(number) => number.fmt(f),
            Value::None => Ok(()),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<NumberValue> for Value {
    fn from(value: NumberValue) -> Self {
        Value::Number(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

macro_rules! number_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(NumberValue::new(value as f64))
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Named arguments passed to a message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: HashMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Arguments::insert`].
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}
