//! WKT / EWKT: the textual form.
//!
//! The parser is a recursive-descent grammar over a byte-offset-tracking
//! tokenizer; parse state (the established dimensionality) lives in the
//! parser value, and the optional validations are parameters rather than
//! ambient flags.

mod parser;
mod tokenizer;
mod writer;

pub use parser::parse_wkt;
pub use writer::{write_wkt, WktVariant};
