use crate::geometry::{bbox_compatible, derive_dims};
use crate::{Bbox, Dims, PointArray};

/// A planar area bounded by one exterior ring and zero or more interior
/// rings (holes). Each ring is a closed [`PointArray`].
///
/// # Examples
///
/// ```
/// use spatia_types::{Dims, Point4, PointArray, Polygon};
///
/// let ring = PointArray::from_points(
///     Dims::XY,
///     &[
///         Point4::new(0.0, 0.0),
///         Point4::new(10.0, 0.0),
///         Point4::new(10.0, 10.0),
///         Point4::new(0.0, 0.0),
///     ],
/// );
/// let poly = Polygon::new(vec![ring]);
/// assert_eq!(poly.num_rings(), 1);
/// assert!(poly.interiors().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub rings: Vec<PointArray>,
}

impl Polygon {
    pub fn empty(dims: Dims) -> Polygon {
        Polygon { srid: None, bbox: None, dims, rings: Vec::new() }
    }

    /// Build from rings, taking ownership; the first ring is the exterior.
    /// Dimensionality is derived from the first ring.
    pub fn new(rings: Vec<PointArray>) -> Polygon {
        let dims = derive_dims(rings.first().map(PointArray::dims));
        Polygon { srid: None, bbox: None, dims, rings }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(PointArray::is_empty)
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn exterior(&self) -> Option<&PointArray> {
        self.rings.first()
    }

    pub fn interiors(&self) -> &[PointArray] {
        if self.rings.is_empty() {
            &[]
        } else {
            &self.rings[1..]
        }
    }

    pub fn push_ring(&mut self, ring: PointArray) {
        if self.rings.is_empty() {
            self.dims = ring.dims();
        }
        self.rings.push(ring);
    }

    pub fn same(&self, other: &Polygon) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && self.rings.len() == other.rings.len()
            && self.rings.iter().zip(&other.rings).all(|(a, b)| a.same(b))
    }

    /// Reorient every ring to the right-hand rule: exterior clockwise,
    /// interiors counter-clockwise.
    pub fn force_rhr(&mut self) {
        for (i, ring) in self.rings.iter_mut().enumerate() {
            let ccw = ring.signed_area2d() > 0.0;
            if (i == 0 && ccw) || (i > 0 && !ccw) {
                ring.reverse();
            }
        }
    }
}
