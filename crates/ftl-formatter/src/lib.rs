//! FTL Formatter
//!
//! Rewrites Fluent resources in canonical form: parse with
//! [`ftl_core::syntax::Parser`], optionally strip comments, serialize with
//! [`ftl_core::syntax::Serializer`]. Check and diff modes report what would
//! change without touching the source.
//!
//! ```
//! use ftl_formatter::Formatter;
//!
//! let result = Formatter::default().format_str("hello=Hello\n").unwrap();
//! assert_eq!(result.content, "hello = Hello\n");
//! ```

mod diff;
mod formatter;
mod strip;

pub use diff::{DiffChange, DiffChangeType, FormatDiff};
pub use formatter::{FormatError, FormatMode, FormatOptions, FormatResult, FormatSummary, Formatter};
pub use strip::StripComments;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use super::{FormatDiff, FormatMode, FormatOptions, FormatResult, Formatter};
}
