//! Errors collected while resolving a message
//!
//! None of these abort resolution: each is recorded and the failing
//! expression is replaced by a readable placeholder.

use std::fmt;

use thiserror::Error;

use super::functions::FunctionError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    #[error("unknown variable `${name}`")]
    UnknownVariable { name: String },
    #[error("unknown message `{id}`")]
    UnknownMessage { id: String },
    #[error("unknown term `-{id}`")]
    UnknownTerm { id: String },
    /// `id` is `-`-prefixed for terms.
    #[error("`{id}` has no attribute `{attribute}`")]
    UnknownAttribute { id: String, attribute: String },
    #[error("message `{id}` has no value")]
    NoValue { id: String },
    #[error("cyclic reference to `{key}` ({})", chain.join(" -> "))]
    Cyclic { key: String, chain: Vec<String> },
    #[error("maximum depth of {max_depth} exceeded at `{key}`")]
    DepthExceeded { key: String, max_depth: usize },
    #[error(transparent)]
    Function(#[from] FunctionError),
}

/// Entry kind named by a bundle error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Message,
    Term,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Message => f.write_str("message"),
            EntryKind::Term => f.write_str("term"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    #[error("attempt to override an existing {kind} `{id}`")]
    Overriding { kind: EntryKind, id: String },
}
