//! Collection simplification: rewrite a geometry as its simplest
//! equivalent form.

use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

impl Geometry {
    /// The "simplest" equivalent of this geometry.
    ///
    /// - a multi holding a single member becomes that member;
    /// - a collection of uniform leaves becomes the matching multi;
    /// - a mixed collection is flattened: nested collections surface their
    ///   leaves, which are then grouped by kind into sub-multis.
    ///
    /// ```
    /// use spatia_types::{Geometry, GeometryCollection, GeometryType, MultiPoint, Point};
    ///
    /// let col = Geometry::GeometryCollection(GeometryCollection::new(vec![
    ///     Geometry::MultiPoint(MultiPoint::new(vec![Point::from_xy(0.0, 0.0)])),
    /// ]));
    /// assert_eq!(col.homogenize().geom_type(), GeometryType::Point);
    /// ```
    pub fn homogenize(&self) -> Geometry {
        match self {
            Geometry::GeometryCollection(col) => homogenize_collection(col),
            Geometry::MultiPoint(m) if m.points.len() == 1 => {
                let mut g = Geometry::Point(m.points[0].clone());
                g.set_srid(m.srid);
                copy_bbox(&mut g, self);
                g
            }
            Geometry::MultiLineString(m) if m.lines.len() == 1 => {
                let mut g = Geometry::LineString(m.lines[0].clone());
                g.set_srid(m.srid);
                copy_bbox(&mut g, self);
                g
            }
            Geometry::MultiPolygon(m) if m.polygons.len() == 1 => {
                let mut g = Geometry::Polygon(m.polygons[0].clone());
                g.set_srid(m.srid);
                copy_bbox(&mut g, self);
                g
            }
            other => other.clone(),
        }
    }
}

fn copy_bbox(dst: &mut Geometry, src: &Geometry) {
    if let Some(b) = src.bbox() {
        let b = *b;
        dst.drop_bbox();
        match dst {
            Geometry::Point(g) => g.bbox = Some(b),
            Geometry::LineString(g) => g.bbox = Some(b),
            Geometry::Polygon(g) => g.bbox = Some(b),
            _ => {}
        }
    }
}

/// Per-kind buckets accumulated while flattening a collection.
#[derive(Default)]
struct Buckets {
    points: Vec<Point>,
    lines: Vec<LineString>,
    polys: Vec<Polygon>,
    /// Kinds with no flattening rule, kept verbatim in encounter order.
    others: Vec<Geometry>,
}

fn fill_buckets(geoms: &[Geometry], buckets: &mut Buckets) {
    for g in geoms {
        match g {
            Geometry::Point(p) => buckets.points.push(p.clone()),
            Geometry::LineString(l) => buckets.lines.push(l.clone()),
            Geometry::Polygon(p) => buckets.polys.push(p.clone()),
            Geometry::MultiPoint(m) => buckets.points.extend(m.points.iter().cloned()),
            Geometry::MultiLineString(m) => buckets.lines.extend(m.lines.iter().cloned()),
            Geometry::MultiPolygon(m) => buckets.polys.extend(m.polygons.iter().cloned()),
            Geometry::GeometryCollection(col) => fill_buckets(&col.geoms, buckets),
            other => buckets.others.push(other.clone()),
        }
    }
}

fn homogenize_collection(col: &GeometryCollection) -> Geometry {
    if col.geoms.is_empty() {
        return Geometry::GeometryCollection(col.clone());
    }

    let mut buckets = Buckets::default();
    fill_buckets(&col.geoms, &mut buckets);

    let mut parts: Vec<Geometry> = Vec::new();
    if !buckets.points.is_empty() {
        parts.push(if buckets.points.len() == 1 {
            Geometry::Point(buckets.points.remove(0))
        } else {
            Geometry::MultiPoint(MultiPoint::new(std::mem::take(&mut buckets.points)))
        });
    }
    if !buckets.lines.is_empty() {
        parts.push(if buckets.lines.len() == 1 {
            Geometry::LineString(buckets.lines.remove(0))
        } else {
            Geometry::MultiLineString(MultiLineString::new(std::mem::take(&mut buckets.lines)))
        });
    }
    if !buckets.polys.is_empty() {
        parts.push(if buckets.polys.len() == 1 {
            Geometry::Polygon(buckets.polys.remove(0))
        } else {
            Geometry::MultiPolygon(MultiPolygon::new(std::mem::take(&mut buckets.polys)))
        });
    }
    parts.extend(buckets.others);

    let mut out = if parts.len() == 1 {
        parts.remove(0)
    } else {
        let mut grouped = GeometryCollection::new(parts);
        grouped.dims = col.dims;
        Geometry::GeometryCollection(grouped)
    };
    out.set_srid(col.srid);
    if let Some(b) = col.bbox {
        match &mut out {
            Geometry::GeometryCollection(g) => g.bbox = Some(b),
            single => copy_bbox_value(single, b),
        }
    }
    out
}

fn copy_bbox_value(dst: &mut Geometry, b: crate::Bbox) {
    match dst {
        Geometry::Point(g) => g.bbox = Some(b),
        Geometry::LineString(g) => g.bbox = Some(b),
        Geometry::Polygon(g) => g.bbox = Some(b),
        Geometry::MultiPoint(g) => g.bbox = Some(b),
        Geometry::MultiLineString(g) => g.bbox = Some(b),
        Geometry::MultiPolygon(g) => g.bbox = Some(b),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dims, GeometryType, Point4, PointArray};

    fn ls(points: &[(f64, f64)]) -> LineString {
        LineString::new(PointArray::from_points(
            Dims::XY,
            &points.iter().map(|&(x, y)| Point4::new(x, y)).collect::<Vec<_>>(),
        ))
    }

    #[test]
    fn leaf_passes_through() {
        let g = Geometry::LineString(ls(&[(0.0, 0.0), (1.0, 1.0)]));
        assert!(g.homogenize().same(&g));
    }

    #[test]
    fn singleton_multi_unwraps() {
        let mut m = MultiLineString::new(vec![ls(&[(0.0, 0.0), (1.0, 1.0)])]);
        m.srid = Some(4326);
        let h = Geometry::MultiLineString(m).homogenize();
        assert_eq!(h.geom_type(), GeometryType::LineString);
        assert_eq!(h.srid(), Some(4326));
    }

    #[test]
    fn collection_of_single_multi_becomes_multi() {
        let col = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::MultiLineString(MultiLineString::new(vec![
                ls(&[(0.0, 0.0), (1.0, 1.0)]),
                ls(&[(2.0, 2.0), (3.0, 3.0)]),
            ])),
        ]));
        let h = col.homogenize();
        assert_eq!(h.geom_type(), GeometryType::MultiLineString);
        assert_eq!(h.as_multi_line_string().unwrap().lines.len(), 2);
    }

    #[test]
    fn mixed_collection_groups_by_kind() {
        let col = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::MultiLineString(MultiLineString::new(vec![ls(&[(0.0, 0.0), (1.0, 1.0)])])),
            Geometry::MultiLineString(MultiLineString::new(vec![ls(&[(2.0, 2.0), (3.0, 3.0)])])),
            Geometry::Point(Point::from_xy(9.0, 9.0)),
        ]));
        let h = col.homogenize();
        let out = h.as_collection().unwrap();
        assert_eq!(out.geoms.len(), 2);
        assert_eq!(out.geoms[0].geom_type(), GeometryType::Point);
        let lines = out.geoms[1].as_multi_line_string().unwrap();
        assert_eq!(lines.lines.len(), 2);
    }

    #[test]
    fn nested_collections_surface_their_leaves() {
        let inner = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::Point(Point::from_xy(1.0, 1.0)),
            Geometry::Point(Point::from_xy(2.0, 2.0)),
        ]));
        let col = Geometry::GeometryCollection(GeometryCollection::new(vec![
            inner,
            Geometry::Point(Point::from_xy(3.0, 3.0)),
        ]));
        let h = col.homogenize();
        assert_eq!(h.geom_type(), GeometryType::MultiPoint);
        assert_eq!(h.as_multi_point().unwrap().points.len(), 3);
    }

    #[test]
    fn empty_collection_is_kept() {
        let col = Geometry::GeometryCollection(GeometryCollection::empty(Dims::XYZ));
        let h = col.homogenize();
        assert!(h.same(&col));
    }
}
