use crate::geometry::{bbox_compatible, derive_dims, unordered_same_by};
use crate::{Bbox, Dims, Error, Geometry};

/// A heterogeneous collection of [`Geometry`] values.
///
/// Sub-geometries are expected to share the collection's Z/M layout and
/// either its SRID or none.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryCollection {
    pub srid: Option<i32>,
    pub bbox: Option<Bbox>,
    pub dims: Dims,
    pub geoms: Vec<Geometry>,
}

impl GeometryCollection {
    pub fn empty(dims: Dims) -> GeometryCollection {
        GeometryCollection { srid: None, bbox: None, dims, geoms: Vec::new() }
    }

    /// Build from members, taking ownership; dimensionality is derived
    /// from the first member.
    pub fn new(geoms: Vec<Geometry>) -> GeometryCollection {
        let dims = derive_dims(geoms.first().map(Geometry::dims));
        GeometryCollection { srid: None, bbox: None, dims, geoms }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geoms.iter().all(Geometry::is_empty)
    }

    pub fn same(&self, other: &GeometryCollection) -> bool {
        bbox_compatible(&self.bbox, &other.bbox)
            && self.dims == other.dims
            && unordered_same_by(&self.geoms, &other.geoms, Geometry::same)
    }

    /// Append a member, enforcing that it shares the collection's Z/M
    /// layout. The first member of an all-empty collection establishes
    /// the layout instead.
    pub fn try_push(&mut self, geom: Geometry) -> Result<(), Error> {
        if self.geoms.is_empty() {
            self.dims = geom.dims();
        } else if geom.dims() != self.dims {
            return Err(Error::MixedDimensions {
                expected: self.dims,
                found: geom.dims(),
            });
        }
        self.geoms.push(geom);
        Ok(())
    }
}
