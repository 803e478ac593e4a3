use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, LineString};

/// A collection of [`LineString`]s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiLineString {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub lines: Vec<LineString>,
}

impl MultiLineString {
    pub fn empty(dims: Dims) -> MultiLineString {
        MultiLineString { srid: None, bbox: None, dims, lines: Vec::new() }
    }

    /// Build from members, taking ownership; dimensionality is derived
    /// from the first member.
    pub fn new(lines: Vec<LineString>) -> MultiLineString {
        let dims = derive_dims(lines.first().map(LineString::dims));
        MultiLineString { srid: None, bbox: None, dims, lines }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(LineString::is_empty)
    }

    pub fn same(&self, other: &MultiLineString) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.lines, &other.lines, LineString::same)
    }
}
