use std::fmt;

use crate::Dims;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// A typed accessor or conversion was applied to the wrong variant.
    MismatchedGeometry {
        expected: &'static str,
        found: &'static str,
    },
    /// A sub-geometry does not share its parent's Z/M layout.
    MixedDimensions { expected: Dims, found: Dims },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MismatchedGeometry { expected, found } => {
                write!(f, "Expected a {}, but found a {}", expected, found)
            }
            Error::MixedDimensions { expected, found } => {
                write!(f, "Expected {} coordinates, but found {}", expected, found)
            }
        }
    }
}
