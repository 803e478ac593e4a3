//! Serialization codec for the spatia geometry runtime.
//!
//! Three interchangeable encodings of [`Geometry`](spatia_types::Geometry):
//!
//! - the **internal binary form** ([`serial`]): the compact
//!   machine-endian layout used between the runtime and its storage host,
//!   with optional bounding-box and SRID headers;
//! - **WKB / EWKB** ([`wkb`]): the OGC well-known binary form with
//!   per-geometry endian markers and Z/M/SRID flag bits, plus the
//!   hex-encoded flavor;
//! - **WKT / EWKT** ([`wkt`]): the textual form, parsed by a
//!   grammar-driven recursive-descent parser that reports typed errors
//!   with byte offsets.
//!
//! Each parser produces the same geometry a matching writer emits:
//! round-tripping through any of the three forms preserves structural
//! equality under [`Geometry::same`](spatia_types::Geometry::same).

mod error;

pub mod serial;
pub mod wkb;
pub mod wkt;

pub use error::{ParseError, ParseErrorKind, WireError};
pub use wkb::{Endian, WkbVariant};
pub use wkt::WktVariant;

use spatia_types::Geometry;

/// Optional validations applied while parsing.
///
/// ```
/// use spatia_wire::{wkt, Checks, ParseErrorKind};
///
/// let err = wkt::parse_wkt("LINESTRING (0 0)", Checks::ALL).unwrap_err();
/// assert_eq!(err.kind, ParseErrorKind::MorePoints);
/// assert!(wkt::parse_wkt("LINESTRING (0 0)", Checks::NONE).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Checks {
    /// Lines have at least 2 points, rings at least 4, circular strings
    /// at least 3.
    pub min_points: bool,
    /// Circular strings have an odd point count.
    pub odd_points: bool,
    /// Polygon rings are closed in the plane.
    pub closure: bool,
}

impl Checks {
    pub const NONE: Checks = Checks { min_points: false, odd_points: false, closure: false };
    pub const ALL: Checks = Checks { min_points: true, odd_points: true, closure: true };
}

/// Parse WKT/EWKT text into the internal serialized form.
pub fn parse_wkt(text: &str, checks: Checks) -> Result<Vec<u8>, ParseError> {
    let geom = wkt::parse_wkt(text, checks)?;
    Ok(serial::to_bytes(&geom))
}

/// Parse WKB/EWKB bytes into the internal serialized form.
pub fn parse_wkb(bytes: &[u8], checks: Checks) -> Result<Vec<u8>, ParseError> {
    let geom = wkb::read_wkb(bytes, checks)?;
    Ok(serial::to_bytes(&geom))
}

/// Render the internal serialized form as EWKT.
pub fn emit_wkt(bytes: &[u8], precision: usize) -> Result<String, WireError> {
    let geom = serial::from_bytes(bytes)?;
    Ok(wkt::write_wkt(&geom, WktVariant::Extended, precision))
}

/// Render the internal serialized form as EWKB in the given byte order.
pub fn emit_wkb(bytes: &[u8], endian: Endian) -> Result<Vec<u8>, WireError> {
    let geom = serial::from_bytes(bytes)?;
    Ok(wkb::write_wkb(&geom, WkbVariant::Extended, endian))
}

/// Deserialize the internal form into a geometry.
pub fn geom_from_bytes(bytes: &[u8]) -> Result<Geometry, WireError> {
    serial::from_bytes(bytes)
}

/// Serialize a geometry into the internal form.
pub fn geom_to_bytes(geom: &Geometry) -> Vec<u8> {
    serial::to_bytes(geom)
}
