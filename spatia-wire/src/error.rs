use std::fmt;

use thiserror::Error;

/// What a parser check found wrong with the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A chain or ring has too few points for its type.
    MorePoints,
    /// A circular string has an even point count.
    OddPoints,
    /// A ring is not closed in the plane.
    Unclosed,
    /// A point's dimensionality disagrees with the geometry's.
    MixedDimensions,
    /// Structurally invalid input.
    InvalidGeom,
    /// An unknown or misplaced type code.
    InvalidWkbType,
    /// Compound curve segments that do not join end to start.
    Incontinuous,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ParseErrorKind::MorePoints => "geometry requires more points",
            ParseErrorKind::OddPoints => "geometry must have an odd number of points",
            ParseErrorKind::Unclosed => "geometry contains non-closed rings",
            ParseErrorKind::MixedDimensions => "can not mix dimensionality in a geometry",
            ParseErrorKind::InvalidGeom => "geometry is invalid",
            ParseErrorKind::InvalidWkbType => "unknown geometry type",
            ParseErrorKind::Incontinuous => "geometry contains non-continuous compound curve",
        })
    }
}

/// A parse failure with the byte offset locating it in the input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind} at byte {offset}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError { kind, offset, message: message.into() }
    }
}

/// Codec-level failures outside of input parsing proper.
#[derive(Debug, Error)]
pub enum WireError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The serialized buffer violates its own framing. This is a bug in
    /// whatever produced the buffer, not in the input data.
    #[error("malformed serialized buffer at byte {offset}: {message}")]
    Invariant { offset: usize, message: String },
}

impl WireError {
    pub(crate) fn invariant(offset: usize, message: impl Into<String>) -> WireError {
        WireError::Invariant { offset, message: message.into() }
    }
}
