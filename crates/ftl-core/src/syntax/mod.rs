//! FTL syntax: cursor, AST, parser, serializer and traversal
//!
//! ```text
//! source ──Parser(Cursor)──▶ Resource ──Serializer──▶ source
//!                              │
//!                    Visitor / Transformer
//! ```

pub mod ast;
pub mod cursor;
pub mod depth;
pub mod line_index;
pub mod parser;
pub mod round_trip;
pub mod serializer;
pub mod transformer;
mod validate;
pub mod visitor;

pub use ast::*;
pub use cursor::{Cursor, EndOfInput};
pub use depth::{DEFAULT_MAX_DEPTH, DepthExceeded, DepthGuard};
pub use line_index::{LineCol, LineIndex};
pub use parser::{Parser, ParserConfig, ParserError, ParserErrorKind, parse};
pub use round_trip::{
    DifferenceKind, RoundTripValidator, SemanticDifference, ValidationResult,
};
pub use serializer::{SerializeError, Serializer, SerializerOptions, serialize};
pub use transformer::{Transform, TransformError, Transformer, transform_resource};
pub use visitor::{Node, Visit, Visitor, walk};
