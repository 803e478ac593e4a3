use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, Polygon};

/// A collection of [`Polygon`]s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiPolygon {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn empty(dims: Dims) -> MultiPolygon {
        MultiPolygon { srid: None, bbox: None, dims, polygons: Vec::new() }
    }

    /// Build from members, taking ownership; dimensionality is derived
    /// from the first member.
    pub fn new(polygons: Vec<Polygon>) -> MultiPolygon {
        let dims = derive_dims(polygons.first().map(Polygon::dims));
        MultiPolygon { srid: None, bbox: None, dims, polygons }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(Polygon::is_empty)
    }

    pub fn same(&self, other: &MultiPolygon) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.polygons, &other.polygons, Polygon::same)
    }
}
