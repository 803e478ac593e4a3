//! The narrow adapter to the planar computational-geometry engine (the
//! [`geo`] stack). Everything the runtime needs from the engine goes
//! through here: conversion in and out of the engine's 2D object model,
//! intersection predicates (plain and prepared), minimum distance, and
//! the polygon overlay used by the longitude-wrap splitter.
//!
//! Curved and surface variants have no engine representation; converting
//! one is an [`EngineError::Unsupported`], which callers surface without
//! partial results.

use geo::{unary_union, BooleanOps, Distance, Euclidean, Intersects, PreparedGeometry, Relate};

use spatia_types::{
    Bbox, Dims, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Point4, PointArray, Polygon,
};

use crate::EngineError;

/// Convert into the engine's (planar, XY) object model. Z and M
/// ordinates are dropped; empty leaves inside multis are skipped.
pub(crate) fn to_engine(geom: &Geometry) -> Result<geo_types::Geometry<f64>, EngineError> {
    Ok(match geom {
        Geometry::Point(g) => match g.point4() {
            Some(p) => geo_types::Geometry::Point(geo_types::Point::new(p.x, p.y)),
            None => empty_engine_geom(),
        },
        Geometry::LineString(g) => geo_types::Geometry::LineString(line_to_engine(&g.coords)),
        Geometry::Triangle(g) => {
            if g.coords.is_empty() {
                empty_engine_geom()
            } else {
                geo_types::Geometry::Polygon(geo_types::Polygon::new(
                    line_to_engine(&g.coords),
                    vec![],
                ))
            }
        }
        Geometry::Polygon(g) => geo_types::Geometry::Polygon(polygon_to_engine(g)),
        Geometry::MultiPoint(g) => geo_types::Geometry::MultiPoint(geo_types::MultiPoint::new(
            g.points
                .iter()
                .filter_map(|p| p.point4())
                .map(|p| geo_types::Point::new(p.x, p.y))
                .collect(),
        )),
        Geometry::MultiLineString(g) => {
            geo_types::Geometry::MultiLineString(geo_types::MultiLineString::new(
                g.lines.iter().map(|l| line_to_engine(&l.coords)).collect(),
            ))
        }
        Geometry::MultiPolygon(g) => geo_types::Geometry::MultiPolygon(
            geo_types::MultiPolygon::new(g.polygons.iter().map(polygon_to_engine).collect()),
        ),
        // Meshes flatten to their planar footprint.
        Geometry::PolyhedralSurface(g) => geo_types::Geometry::MultiPolygon(
            geo_types::MultiPolygon::new(g.patches.iter().map(polygon_to_engine).collect()),
        ),
        Geometry::Tin(g) => geo_types::Geometry::MultiPolygon(geo_types::MultiPolygon::new(
            g.triangles
                .iter()
                .filter(|t| !t.coords.is_empty())
                .map(|t| geo_types::Polygon::new(line_to_engine(&t.coords), vec![]))
                .collect(),
        )),
        Geometry::GeometryCollection(g) => {
            let mut members = Vec::with_capacity(g.geoms.len());
            for m in &g.geoms {
                members.push(to_engine(m)?);
            }
            geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection::new_from(
                members,
            ))
        }
        Geometry::CircularString(_)
        | Geometry::CompoundCurve(_)
        | Geometry::CurvePolygon(_)
        | Geometry::MultiCurve(_)
        | Geometry::MultiSurface(_) => {
            return Err(EngineError::Unsupported(geom.geom_type().name()))
        }
    })
}

/// Convert an engine geometry back, tagging it with `srid`. The result
/// is always plain XY.
pub(crate) fn from_engine(geom: geo_types::Geometry<f64>, srid: Option<i32>) -> Geometry {
    let mut out = match geom {
        geo_types::Geometry::Point(p) => {
            Geometry::Point(Point::from_xy(p.x(), p.y()))
        }
        geo_types::Geometry::Line(l) => Geometry::LineString(LineString::new(
            PointArray::from_points(
                Dims::XY,
                &[Point4::new(l.start.x, l.start.y), Point4::new(l.end.x, l.end.y)],
            ),
        )),
        geo_types::Geometry::LineString(l) => {
            Geometry::LineString(LineString::new(line_from_engine(&l)))
        }
        geo_types::Geometry::Polygon(p) => Geometry::Polygon(polygon_from_engine(&p)),
        geo_types::Geometry::Rect(r) => Geometry::Polygon(polygon_from_engine(&r.to_polygon())),
        geo_types::Geometry::Triangle(t) => {
            Geometry::Polygon(polygon_from_engine(&t.to_polygon()))
        }
        geo_types::Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.0.iter().map(|p| Point::from_xy(p.x(), p.y())).collect(),
        )),
        geo_types::Geometry::MultiLineString(ml) => Geometry::MultiLineString(
            MultiLineString::new(
                ml.0.iter()
                    .map(|l| LineString::new(line_from_engine(l)))
                    .collect(),
            ),
        ),
        geo_types::Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon::new(
            mp.0.iter().map(polygon_from_engine).collect(),
        )),
        geo_types::Geometry::GeometryCollection(gc) => {
            Geometry::GeometryCollection(GeometryCollection::new(
                gc.0.into_iter().map(|m| from_engine(m, None)).collect(),
            ))
        }
    };
    out.set_srid(srid);
    out
}

fn line_to_engine(pa: &PointArray) -> geo_types::LineString<f64> {
    geo_types::LineString::new(
        pa.iter()
            .map(|p| geo_types::coord! { x: p.x, y: p.y })
            .collect(),
    )
}

fn polygon_to_engine(poly: &Polygon) -> geo_types::Polygon<f64> {
    let exterior = poly
        .exterior()
        .map(line_to_engine)
        .unwrap_or_else(|| geo_types::LineString::new(vec![]));
    let interiors = poly.interiors().iter().map(line_to_engine).collect();
    geo_types::Polygon::new(exterior, interiors)
}

fn line_from_engine(line: &geo_types::LineString<f64>) -> PointArray {
    let mut pa = PointArray::with_capacity(Dims::XY, line.0.len());
    for c in &line.0 {
        pa.append(Point4::new(c.x, c.y));
    }
    pa
}

fn polygon_from_engine(poly: &geo_types::Polygon<f64>) -> Polygon {
    let mut rings = Vec::with_capacity(1 + poly.interiors().len());
    if !poly.exterior().0.is_empty() {
        rings.push(line_from_engine(poly.exterior()));
    }
    for interior in poly.interiors() {
        rings.push(line_from_engine(interior));
    }
    Polygon::new(rings)
}

fn empty_engine_geom() -> geo_types::Geometry<f64> {
    geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection::new_from(vec![]))
}

/// Plain pairwise intersection predicate.
pub(crate) fn intersects(a: &geo_types::Geometry<f64>, b: &geo_types::Geometry<f64>) -> bool {
    a.intersects(b)
}

/// Build the engine's optimized representation for repeated predicate
/// evaluation against many partners.
pub(crate) fn prepare(g: &geo_types::Geometry<f64>) -> PreparedGeometry<'_, &geo_types::Geometry<f64>> {
    PreparedGeometry::from(g)
}

pub(crate) fn prepared_intersects<'a>(
    prepared: &PreparedGeometry<'a, &'a geo_types::Geometry<f64>>,
    other: &geo_types::Geometry<f64>,
) -> bool {
    prepared.relate(other).is_intersects()
}

/// Planar minimum distance between two engine geometries.
pub(crate) fn distance(a: &geo_types::Geometry<f64>, b: &geo_types::Geometry<f64>) -> f64 {
    Euclidean.distance(a, b)
}

/// Split a polygon by the vertical line `x = cut_x` via overlay against
/// the two half-plane rectangles bounded by `bbox` (padded so boundary
/// vertices survive). Pieces keep the polygon's ring structure.
pub(crate) fn split_polygon_x(
    poly: &Polygon,
    cut_x: f64,
    bbox: &Bbox,
) -> Result<Vec<Polygon>, EngineError> {
    let subject = polygon_to_engine(poly);
    let left = geo_types::Rect::new(
        geo_types::coord! { x: bbox.xmin - 1.0, y: bbox.ymin - 1.0 },
        geo_types::coord! { x: cut_x, y: bbox.ymax + 1.0 },
    )
    .to_polygon();
    let right = geo_types::Rect::new(
        geo_types::coord! { x: cut_x, y: bbox.ymin - 1.0 },
        geo_types::coord! { x: bbox.xmax + 1.0, y: bbox.ymax + 1.0 },
    )
    .to_polygon();

    let mut pieces = Vec::new();
    for half in [left, right] {
        for piece in subject.intersection(&half) {
            pieces.push(polygon_from_engine(&piece));
        }
    }
    if pieces.is_empty() {
        return Err(EngineError::Failure(
            "vertical split produced no pieces".into(),
        ));
    }
    Ok(pieces)
}

/// Dissolve polygon pieces into their union: a single polygon when the
/// union is connected, a multipolygon otherwise.
pub(crate) fn union_polygons(polys: &[Polygon], srid: Option<i32>) -> Geometry {
    let engine_polys: Vec<geo_types::Polygon<f64>> =
        polys.iter().map(polygon_to_engine).collect();
    let merged = unary_union(engine_polys.iter());
    if merged.0.len() == 1 {
        let mut out = Geometry::Polygon(polygon_from_engine(&merged.0[0]));
        out.set_srid(srid);
        out
    } else {
        from_engine(geo_types::Geometry::MultiPolygon(merged), srid)
    }
}
