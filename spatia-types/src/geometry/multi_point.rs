use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, Point};

/// A collection of [`Point`]s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiPoint {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub points: Vec<Point>,
}

impl MultiPoint {
    pub fn empty(dims: Dims) -> MultiPoint {
        MultiPoint { srid: None, bbox: None, dims, points: Vec::new() }
    }

    /// Build from members, taking ownership; dimensionality is derived
    /// from the first member.
    pub fn new(points: Vec<Point>) -> MultiPoint {
        let dims = derive_dims(points.first().map(Point::dims));
        MultiPoint { srid: None, bbox: None, dims, points }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Point::is_empty)
    }

    pub fn same(&self, other: &MultiPoint) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.points, &other.points, Point::same)
    }
}
