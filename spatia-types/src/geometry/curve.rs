//! Curved geometry variants: arcs, composites of arcs and straight
//! segments, and the curved counterparts of polygon and the multi types.

use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, LineString, PointArray, Polygon};

/// A chain of circular arcs. Each arc is three consecutive points (start,
/// any point on the arc, end), so a valid non-empty payload has an odd
/// point count of at least three.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircularString {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub coords: PointArray,
}

impl CircularString {
    pub fn empty(dims: Dims) -> CircularString {
        CircularString { srid: None, bbox: None, coords: PointArray::new(dims) }
    }

    pub fn new(coords: PointArray) -> CircularString {
        CircularString { srid: None, bbox: None, coords }
    }

    pub fn dims(&self) -> Dims {
        self.coords.dims()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    pub fn same(&self, other: &CircularString) -> bool {
        bbox_compatible(&self.bbox, &other.bbox) && self.coords.same(&other.coords)
    }
}

/// One piece of a [`CompoundCurve`]: straight or circular.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveSegment {
    LineString(LineString),
    CircularString(CircularString),
}

impl CurveSegment {
    pub fn dims(&self) -> Dims {
        match self {
            CurveSegment::LineString(g) => g.dims(),
            CurveSegment::CircularString(g) => g.dims(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CurveSegment::LineString(g) => g.is_empty(),
            CurveSegment::CircularString(g) => g.is_empty(),
        }
    }

    pub fn coords(&self) -> &PointArray {
        match self {
            CurveSegment::LineString(g) => &g.coords,
            CurveSegment::CircularString(g) => &g.coords,
        }
    }

    pub fn same(&self, other: &CurveSegment) -> bool {
        match (self, other) {
            (CurveSegment::LineString(a), CurveSegment::LineString(b)) => a.same(b),
            (CurveSegment::CircularString(a), CurveSegment::CircularString(b)) => a.same(b),
            _ => false,
        }
    }
}

/// A continuous chain of straight and circular segments. Each segment's
/// end point must coincide with the next segment's start point in every
/// ordinate of the compound's dimensionality.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompoundCurve {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub segments: Vec<CurveSegment>,
}

impl CompoundCurve {
    pub fn empty(dims: Dims) -> CompoundCurve {
        CompoundCurve { srid: None, bbox: None, dims, segments: Vec::new() }
    }

    pub fn new(segments: Vec<CurveSegment>) -> CompoundCurve {
        let dims = derive_dims(segments.first().map(CurveSegment::dims));
        CompoundCurve { srid: None, bbox: None, dims, segments }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(CurveSegment::is_empty)
    }

    /// True when every segment's end point meets its successor's start
    /// point within [`FP_TOLERANCE`](crate::FP_TOLERANCE), in every
    /// ordinate of the compound's dimensionality.
    pub fn is_continuous(&self) -> bool {
        let dims = self.dims();
        let tol = crate::FP_TOLERANCE;
        self.segments.windows(2).all(|pair| {
            let (end, start) = match (pair[0].coords().last(), pair[1].coords().first()) {
                (Some(end), Some(start)) => (end, start),
                _ => return true,
            };
            (end.x - start.x).abs() <= tol
                && (end.y - start.y).abs() <= tol
                && (!dims.has_z || (end.z - start.z).abs() <= tol)
                && (!dims.has_m || (end.m - start.m).abs() <= tol)
        })
    }

    pub fn same(&self, other: &CompoundCurve) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same(b))
    }
}

/// Any one-dimensional curve: the member type of [`MultiCurve`] and the
/// ring type of [`CurvePolygon`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    LineString(LineString),
    CircularString(CircularString),
    CompoundCurve(CompoundCurve),
}

impl Curve {
    pub fn dims(&self) -> Dims {
        match self {
            Curve::LineString(g) => g.dims(),
            Curve::CircularString(g) => g.dims(),
            Curve::CompoundCurve(g) => g.dims(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Curve::LineString(g) => g.is_empty(),
            Curve::CircularString(g) => g.is_empty(),
            Curve::CompoundCurve(g) => g.is_empty(),
        }
    }

    pub fn same(&self, other: &Curve) -> bool {
        match (self, other) {
            (Curve::LineString(a), Curve::LineString(b)) => a.same(b),
            (Curve::CircularString(a), Curve::CircularString(b)) => a.same(b),
            (Curve::CompoundCurve(a), Curve::CompoundCurve(b)) => a.same(b),
            _ => false,
        }
    }
}

/// A planar area bounded by curved rings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePolygon {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub rings: Vec<Curve>,
}

impl CurvePolygon {
    pub fn empty(dims: Dims) -> CurvePolygon {
        CurvePolygon { srid: None, bbox: None, dims, rings: Vec::new() }
    }

    pub fn new(rings: Vec<Curve>) -> CurvePolygon {
        let dims = derive_dims(rings.first().map(Curve::dims));
        CurvePolygon { srid: None, bbox: None, dims, rings }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(Curve::is_empty)
    }

    pub fn same(&self, other: &CurvePolygon) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && self.rings.len() == other.rings.len()
            && self.rings.iter().zip(&other.rings).all(|(a, b)| a.same(b))
    }
}

/// A collection of [`Curve`]s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiCurve {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub curves: Vec<Curve>,
}

impl MultiCurve {
    pub fn empty(dims: Dims) -> MultiCurve {
        MultiCurve { srid: None, bbox: None, dims, curves: Vec::new() }
    }

    pub fn new(curves: Vec<Curve>) -> MultiCurve {
        let dims = derive_dims(curves.first().map(Curve::dims));
        MultiCurve { srid: None, bbox: None, dims, curves }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.curves.iter().all(Curve::is_empty)
    }

    pub fn same(&self, other: &MultiCurve) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.curves, &other.curves, Curve::same)
    }
}

/// Any two-dimensional surface: the member type of [`MultiSurface`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Surface {
    Polygon(Polygon),
    CurvePolygon(CurvePolygon),
}

impl Surface {
    pub fn dims(&self) -> Dims {
        match self {
            Surface::Polygon(g) => g.dims(),
            Surface::CurvePolygon(g) => g.dims(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Surface::Polygon(g) => g.is_empty(),
            Surface::CurvePolygon(g) => g.is_empty(),
        }
    }

    pub fn same(&self, other: &Surface) -> bool {
        match (self, other) {
            (Surface::Polygon(a), Surface::Polygon(b)) => a.same(b),
            (Surface::CurvePolygon(a), Surface::CurvePolygon(b)) => a.same(b),
            _ => false,
        }
    }
}

/// A collection of [`Surface`]s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiSurface {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub surfaces: Vec<Surface>,
}

impl MultiSurface {
    pub fn empty(dims: Dims) -> MultiSurface {
        MultiSurface { srid: None, bbox: None, dims, surfaces: Vec::new() }
    }

    pub fn new(surfaces: Vec<Surface>) -> MultiSurface {
        let dims = derive_dims(surfaces.first().map(Surface::dims));
        MultiSurface { srid: None, bbox: None, dims, surfaces }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.iter().all(Surface::is_empty)
    }

    pub fn same(&self, other: &MultiSurface) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.surfaces, &other.surfaces, Surface::same)
    }
}
