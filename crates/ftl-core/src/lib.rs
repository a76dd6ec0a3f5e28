//! FTL Core
//!
//! Engine for the Fluent (FTL) localization language: a recursive-descent
//! parser that never fails (broken entries become Junk), the inverse
//! serializer, AST traversal, and a resolver that always returns
//! displayable text together with the errors it met.
//!
//! ```rust
//! use ftl_core::{Arguments, Bundle, parse};
//!
//! let resource = parse(
//!     "items = { $n ->\n    [one] One item\n   *[other] { $n } items\n}\n",
//! );
//! let mut bundle = Bundle::new("en-US".parse().unwrap());
//! bundle.add_resource(&resource).unwrap();
//!
//! let args = Arguments::new().set("n", 5);
//! assert_eq!(bundle.format_message("items", Some(&args), None).0, "5 items");
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod runtime;
pub mod syntax;

pub use config::{ConfigError, ConfigLoader, FtlConfig};
pub use diagnostics::{
    Diagnostic, DiagnosticRenderer, Location, OutputFormat, Severity, ToDiagnostic,
    resource_diagnostics,
};
pub use error::{ErrorKind, FtlError, Result};
pub use runtime::{
    Arguments, Arity, Bundle, BundleError, FunctionError, FunctionRegistry, PluralCategory,
    Resolver, ResolverError, ResolverOptions, Value,
};
pub use syntax::{
    Parser, ParserConfig, Resource, RoundTripValidator, SerializeError, Serializer,
    SerializerOptions, parse, serialize,
};

/// Initialize the tracing subscriber for logging
///
/// The filter comes from `FTL_LOG`, then `RUST_LOG`, defaulting to
/// `ftl=info`. Calling it again is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_env("FTL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("ftl=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
