//! Message resolution
//!
//! A [`Bundle`] holds the messages and terms of one locale together with
//! the function registry and the plural oracle; [`Resolver`] walks a
//! message's pattern against them.

pub mod bundle;
mod context;
pub mod errors;
pub mod functions;
pub mod plural;
pub mod resolver;
pub mod value;

pub use bundle::Bundle;
pub use errors::{BundleError, EntryKind, ResolverError};
pub use functions::{
    Arity, Function, FunctionError, FunctionErrorCause, FunctionRegistry, NamedArguments,
};
pub use plural::{CldrPluralRules, PluralCategory, PluralKind, PluralRules};
pub use resolver::{EntryLookup, FSI, PDI, Resolver, ResolverOptions};
pub use value::{Arguments, NumberOptions, NumberValue, Value};
