#![warn(missing_debug_implementations)]
//! The `spatia-types` library defines the geometry object model of the
//! spatia runtime.
//!
//! Unlike statically two-dimensional models, every coordinate sequence here
//! carries its dimensionality at runtime: plain XY, XYZ, XYM or XYZM, with
//! missing ordinates reading back as zero. Geometries are tagged with an
//! optional SRID and may cache their axis-aligned bounding box.
//!
//! ## Geometries
//!
//! - **[`Point`]**, **[`LineString`]**, **[`CircularString`]**, **[`Triangle`]**:
//!   a single [`PointArray`] payload
//! - **[`Polygon`]**: one exterior ring and zero or more interior rings
//! - **[`CompoundCurve`]**, **[`CurvePolygon`]**: curved composites
//! - **[`MultiPoint`]**, **[`MultiLineString`]**, **[`MultiCurve`]**,
//!   **[`MultiPolygon`]**, **[`MultiSurface`]**: homogeneous collections
//! - **[`PolyhedralSurface`]**, **[`Tin`]**: surface meshes
//! - **[`GeometryCollection`]**: a heterogeneous collection
//! - **[`Geometry`]**: an enumeration of all of the above
//!
//! ## Semantics
//!
//! The types aim to be inter-operable with implementations of the
//! [OpenGIS Simple feature access][OGC-SFA] standards, extended with Z and
//! M ordinates.
//!
//! [OGC-SFA]: https://www.ogc.org/standards/sfa

mod bbox;
mod coord;
mod dims;
mod error;
mod homogenize;
mod pointarray;

pub mod geometry;

pub use bbox::Bbox;
pub use coord::Point4;
pub use dims::Dims;
pub use error::Error;
pub use pointarray::PointArray;

pub use geometry::{
    CircularString, CompoundCurve, Curve, CurvePolygon, CurveSegment, Geometry,
    GeometryCollection, GeometryType, LineString, MultiCurve, MultiLineString, MultiPoint,
    MultiPolygon, MultiSurface, Point, Polygon, PolyhedralSurface, Surface, Tin, Triangle,
};

/// Absolute tolerance used for floating-point coordinate comparisons that
/// are not required to be bit-exact.
pub const FP_TOLERANCE: f64 = 1e-12;
