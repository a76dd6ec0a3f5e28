//! Configuration for the FTL engine
//!
//! Settings come from `ftl.toml`, `.ftlrc.toml` (TOML) or `.ftlrc.json`
//! (JSON). When no path is given the loader searches the start directory
//! and then each parent until a file is found; without one the defaults
//! apply. Every field is optional.
//!
//! ```toml
//! [limits]
//! maxDepth = 50
//!
//! [resolver]
//! locale = "pl"
//! ```

mod ftl_config;
mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use ftl_config::{
    FtlConfig, LimitsConfiguration, MAX_DEPTH_CEILING, MAX_IDENTIFIER_LENGTH_CEILING,
    MAX_SOURCE_SIZE_CEILING, ResolverConfiguration, SerializerConfiguration,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in '{path}': {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported config file format: '{path}'")]
    UnsupportedFormat { path: PathBuf },
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },
    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}
