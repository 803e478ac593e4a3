//! Triangulated and polyhedral surface variants.

use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, PointArray, Polygon};

/// A single triangular face: a closed ring of exactly four points (or
/// empty).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub coords: PointArray,
}

impl Triangle {
    pub fn empty(dims: Dims) -> Triangle {
        Triangle { srid: None, bbox: None, coords: PointArray::new(dims) }
    }

    /// Wrap the face ring, taking ownership. A valid non-empty ring holds
    /// four points with the first repeated last; this is not enforced
    /// here (parsers enforce it through their ring checks).
    pub fn new(coords: PointArray) -> Triangle {
        Triangle { srid: None, bbox: None, coords }
    }

    pub fn dims(&self) -> Dims {
        self.coords.dims()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn same(&self, other: &Triangle) -> bool {
        bbox_compatible(&self.bbox, &other.bbox) && self.coords.same(&other.coords)
    }
}

/// A surface mesh of polygonal patches. `solid` marks a closed volume
/// boundary.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolyhedralSurface {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub solid: bool,
    pub patches: Vec<Polygon>,
}

impl PolyhedralSurface {
    pub fn empty(dims: Dims) -> PolyhedralSurface {
        PolyhedralSurface { srid: None, bbox: None, dims, solid: false, patches: Vec::new() }
    }

    pub fn new(patches: Vec<Polygon>) -> PolyhedralSurface {
        let dims = derive_dims(patches.first().map(Polygon::dims));
        PolyhedralSurface { srid: None, bbox: None, dims, solid: false, patches }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.patches.iter().all(Polygon::is_empty)
    }

    pub fn same(&self, other: &PolyhedralSurface) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && self.solid == other.solid
            && unordered_same_by(&self.patches, &other.patches, Polygon::same)
    }
}

/// A triangulated irregular network: a mesh of [`Triangle`] faces.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tin {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub triangles: Vec<Triangle>,
}

impl Tin {
    pub fn empty(dims: Dims) -> Tin {
        Tin { srid: None, bbox: None, dims, triangles: Vec::new() }
    }

    pub fn new(triangles: Vec<Triangle>) -> Tin {
        let dims = derive_dims(triangles.first().map(Triangle::dims));
        Tin { srid: None, bbox: None, dims, triangles }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.iter().all(Triangle::is_empty)
    }

    pub fn same(&self, other: &Tin) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.triangles, &other.triangles, Triangle::same)
    }
}
