use crate::geometry::bbox_compatible;
use crate::{Bbox, Dims, PointArray};

/// A chain of straight segments between two or more points (or empty).
///
/// # Examples
///
/// ```
/// use spatia_types::{Dims, LineString, Point4, PointArray};
///
/// let ls = LineString::new(PointArray::from_points(
///     Dims::XY,
///     &[Point4::new(0.0, 0.0), Point4::new(10.0, 0.0)],
/// ));
/// assert_eq!(ls.num_points(), 2);
/// assert!(!ls.is_closed());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineString {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub coords: PointArray,
}

impl LineString {
    pub fn empty(dims: Dims) -> LineString {
        LineString { srid: None, bbox: None, coords: PointArray::new(dims) }
    }

    /// Wrap a coordinate sequence, taking ownership.
    pub fn new(coords: PointArray) -> LineString {
        LineString { srid: None, bbox: None, coords }
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

    /// Closed in the plane: first and last point match in x and y.
    pub fn is_closed(&self) -> bool {
        self.coords.is_closed_2d()
    }

    pub fn same(&self, other: &LineString) -> bool {
        bbox_compatible(&self.bbox, &other.bbox) && self.coords.same(&other.coords)
    }
}
