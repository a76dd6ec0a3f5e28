//! Error types for FTL operations

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::runtime::{BundleError, ResolverError};
use crate::syntax::parser::ParserError;
use crate::syntax::serializer::SerializeError;
use crate::syntax::transformer::TransformError;

pub type Result<T> = std::result::Result<T, FtlError>;

/// Main error type for FTL operations
#[derive(Debug, Error)]
pub enum FtlError {
    /// Syntax error, normally folded into Junk
    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    /// Tree with no valid textual form
    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Resolver error: {0}")]
    Resolve(#[from] ResolverError),

    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Serialize,
    Transform,
    Resolve,
    Bundle,
    Config,
    Io,
}

impl FtlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FtlError::Parse(_) => ErrorKind::Parse,
            FtlError::Serialize(_) => ErrorKind::Serialize,
            FtlError::Transform(_) => ErrorKind::Transform,
            FtlError::Resolve(_) => ErrorKind::Resolve,
            FtlError::Bundle(_) => ErrorKind::Bundle,
            FtlError::Config(_) => ErrorKind::Config,
            FtlError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Whether processing of other entries or files can go on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Resolve | ErrorKind::Bundle
        )
    }

    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for FtlError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
