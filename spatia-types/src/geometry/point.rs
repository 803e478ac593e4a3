use crate::geometry::bbox_compatible;
use crate::{Bbox, Dims, Point4, PointArray};

/// A single location, or the empty point.
///
/// The payload is a [`PointArray`] holding zero points (empty) or exactly
/// one.
///
/// # Examples
///
/// ```
/// use spatia_types::Point;
///
/// let p = Point::from_xyz(1.0, 2.0, 3.0);
/// assert_eq!(p.x(), Some(1.0));
/// assert!(p.dims().has_z);
/// assert!(Point::empty(Default::default()).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub coords: PointArray,
}

impl Point {
    pub fn empty(dims: Dims) -> Point {
        Point { srid: None, bbox: None, coords: PointArray::new(dims) }
    }

    /// Wrap a coordinate sequence, taking ownership. The sequence is
    /// expected to hold at most one point.
    pub fn new(coords: PointArray) -> Point {
        debug_assert!(coords.len() <= 1);
        Point { srid: None, bbox: None, coords }
    }

    pub fn from_point4(dims: Dims, p: Point4) -> Point {
        let mut coords = PointArray::with_capacity(dims, 1);
        coords.append(p);
        Point::new(coords)
    }

    pub fn from_xy(x: f64, y: f64) -> Point {
        Point::from_point4(Dims::XY, Point4::new(x, y))
    }

    pub fn from_xyz(x: f64, y: f64, z: f64) -> Point {
        Point::from_point4(Dims::XYZ, Point4::with_z(x, y, z))
    }

    pub fn from_xym(x: f64, y: f64, m: f64) -> Point {
        Point::from_point4(Dims::XYM, Point4::with_m(x, y, m))
    }

    pub fn from_xyzm(x: f64, y: f64, z: f64, m: f64) -> Point {
        Point::from_point4(Dims::XYZM, Point4::with_zm(x, y, z, m))
    }

    pub fn dims(&self) -> Dims {
        self.coords.dims()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The coordinate in canonical four-ordinate form, `None` when empty.
    pub fn point4(&self) -> Option<Point4> {
        self.coords.first()
    }

    pub fn x(&self) -> Option<f64> {
        self.point4().map(|p| p.x)
    }

    pub fn y(&self) -> Option<f64> {
        self.point4().map(|p| p.y)
    }

    pub fn z(&self) -> Option<f64> {
        if self.dims().has_z {
            self.point4().map(|p| p.z)
        } else {
            None
        }
    }

    pub fn m(&self) -> Option<f64> {
        if self.dims().has_m {
            self.point4().map(|p| p.m)
        } else {
            None
        }
    }

    pub fn same(&self, other: &Point) -> bool {
        bbox_compatible(&self.bbox, &other.bbox) && self.coords.same(&other.coords)
    }
}
