//! Function registry for `FUNC(...)` calls
//!
//! Functions receive evaluated positional arguments and a map of named
//! arguments. Named argument names are written in camelCase in FTL
//! (`minimumFractionDigits`) and handed to implementations in snake_case
//! (`minimum_fraction_digits`). A function registered as locale-aware
//! receives the active locale as an extra trailing positional argument.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;
use unic_langid::LanguageIdentifier;

use super::plural::PluralKind;
use super::value::{NumberOptions, Value};

pub type NamedArguments = BTreeMap<String, Value>;

/// Implementation of a function. The error string describes the failure.
pub type Function =
    Box<dyn Fn(&[Value], &NamedArguments) -> Result<Value, String> + Send + Sync>;

/// Accepted number of positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionErrorCause {
    #[error("unknown function")]
    Unknown,
    #[error("expected {expected} positional arguments, got {got}")]
    Arity { expected: String, got: usize },
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("function {name}(): {cause}")]
pub struct FunctionError {
    pub name: String,
    pub cause: FunctionErrorCause,
}

struct Registered {
    arity: Arity,
    injects_locale: bool,
    function: Function,
}

#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Registered>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

impl FunctionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `NUMBER`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("NUMBER", Arity::Exactly(1), number);
        registry
    }

    /// Register (or replace) a function.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, function: F)
    where
        F: Fn(&[Value], &NamedArguments) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.insert(name.into(), arity, false, Box::new(function));
    }

    /// Register a function that receives the locale as a trailing argument.
    pub fn register_locale_aware<F>(&mut self, name: impl Into<String>, arity: Arity, function: F)
    where
        F: Fn(&[Value], &NamedArguments) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.insert(name.into(), arity, true, Box::new(function));
    }

    fn insert(&mut self, name: String, arity: Arity, injects_locale: bool, function: Function) {
        self.functions.insert(
            name,
            Registered {
                arity,
                injects_locale,
                function,
            },
        );
    }

    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call `name`. `named` holds the names as written in FTL.
    pub fn call(
        &self,
        name: &str,
        mut positional: Vec<Value>,
        named: Vec<(String, Value)>,
        locale: &LanguageIdentifier,
    ) -> Result<Value, FunctionError> {
        let error = |cause| FunctionError {
            name: name.to_string(),
            cause,
        };
        let registered = self
            .functions
            .get(name)
            .ok_or_else(|| error(FunctionErrorCause::Unknown))?;

        if !registered.arity.accepts(positional.len()) {
            return Err(error(FunctionErrorCause::Arity {
                expected: registered.arity.to_string(),
                got: positional.len(),
            }));
        }
        if registered.injects_locale {
            positional.push(Value::String(locale.to_string()));
        }

        let named: NamedArguments = named
            .into_iter()
            .map(|(key, value)| (snake_case(&key), value))
            .collect();
        (registered.function)(&positional, &named)
            .map_err(|cause| error(FunctionErrorCause::Failed(cause)))
    }
}

/// `minimumFractionDigits` → `minimum_fraction_digits`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn fraction_digits(named: &NamedArguments, key: &str) -> Result<Option<usize>, String> {
    let Some(value) = named.get(key) else {
        return Ok(None);
    };
    match value.to_number() {
        Some(number) if number.value >= 0.0 && number.value.fract() == 0.0 => {
            Ok(Some(number.value as usize))
        }
        _ => Err(format!("`{key}` must be a non-negative integer, got `{value}`")),
    }
}

/// `NUMBER($n, minimumFractionDigits: 2, type: "ordinal")`
fn number(positional: &[Value], named: &NamedArguments) -> Result<Value, String> {
    let value = positional
        .first()
        .ok_or_else(|| "missing argument".to_string())?;
    let number = value
        .to_number()
        .ok_or_else(|| format!("`{value}` is not a number"))?;

    let kind = match named.get("type") {
        None => number.options.kind,
        Some(Value::String(kind)) if kind == "cardinal" => PluralKind::Cardinal,
        Some(Value::String(kind)) if kind == "ordinal" => PluralKind::Ordinal,
        Some(other) => return Err(format!("unknown plural type `{other}`")),
    };

    let options = NumberOptions {
        minimum_fraction_digits: fraction_digits(named, "minimum_fraction_digits")?
            .or(number.options.minimum_fraction_digits),
        maximum_fraction_digits: fraction_digits(named, "maximum_fraction_digits")?
            .or(number.options.maximum_fraction_digits),
        kind,
    };
    Ok(Value::Number(number.with_options(options)))
}
