use std::fmt::Write as _;

use spatia_types::{
    CompoundCurve, Curve, CurvePolygon, CurveSegment, Dims, Geometry, LineString, Point,
    PointArray, Polygon, Surface, Triangle,
};

/// Which textual dialect to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WktVariant {
    /// ISO style: `POINT ZM (1 2 3 4)`, no SRID.
    Iso,
    /// Extended (EWKT) style: `SRID=n;` prefix, `POINTM` for M-only
    /// layouts, Z implied by the ordinate count.
    Extended,
}

/// Render a geometry as WKT/EWKT.
///
/// Ordinates are written with the given decimal precision and trailing
/// zeros trimmed; a precision of 17 or more uses the shortest
/// representation that round-trips the exact f64 value.
pub fn write_wkt(geom: &Geometry, variant: WktVariant, precision: usize) -> String {
    let mut out = String::new();
    if variant == WktVariant::Extended {
        if let Some(srid) = geom.srid() {
            let _ = write!(out, "SRID={srid};");
        }
    }
    write_geometry(geom, variant, precision, &mut out);
    out
}

fn write_geometry(geom: &Geometry, v: WktVariant, p: usize, out: &mut String) {
    let dims = geom.dims();
    match geom {
        Geometry::Point(g) => {
            tag("POINT", dims, v, g.is_empty(), out);
            if !g.is_empty() {
                out.push('(');
                write_pa_body(&g.coords, p, out);
                out.push(')');
            }
        }
        Geometry::LineString(g) => {
            tag("LINESTRING", dims, v, g.is_empty(), out);
            if !g.is_empty() {
                chain(&g.coords, p, out);
            }
        }
        Geometry::CircularString(g) => {
            tag("CIRCULARSTRING", dims, v, g.is_empty(), out);
            if !g.is_empty() {
                chain(&g.coords, p, out);
            }
        }
        Geometry::Triangle(g) => {
            tag("TRIANGLE", dims, v, g.is_empty(), out);
            if !g.is_empty() {
                out.push('(');
                chain(&g.coords, p, out);
                out.push(')');
            }
        }
        Geometry::Polygon(g) => {
            tag("POLYGON", dims, v, g.rings.is_empty(), out);
            if !g.rings.is_empty() {
                rings_body(&g.rings, p, out);
            }
        }
        Geometry::CompoundCurve(g) => {
            tag("COMPOUNDCURVE", dims, v, g.segments.is_empty(), out);
            if !g.segments.is_empty() {
                out.push('(');
                for (i, s) in g.segments.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_segment(s, p, out);
                }
                out.push(')');
            }
        }
        Geometry::CurvePolygon(g) => {
            tag("CURVEPOLYGON", dims, v, g.rings.is_empty(), out);
            if !g.rings.is_empty() {
                out.push('(');
                for (i, r) in g.rings.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_curve(r, p, out);
                }
                out.push(')');
            }
        }
        Geometry::MultiPoint(g) => {
            tag("MULTIPOINT", dims, v, g.points.is_empty(), out);
            if !g.points.is_empty() {
                out.push('(');
                for (i, pt) in g.points.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_point(pt, p, out);
                }
                out.push(')');
            }
        }
        Geometry::MultiLineString(g) => {
            tag("MULTILINESTRING", dims, v, g.lines.is_empty(), out);
            if !g.lines.is_empty() {
                out.push('(');
                for (i, l) in g.lines.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_line(l, p, out);
                }
                out.push(')');
            }
        }
        Geometry::MultiCurve(g) => {
            tag("MULTICURVE", dims, v, g.curves.is_empty(), out);
            if !g.curves.is_empty() {
                out.push('(');
                for (i, c) in g.curves.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_curve(c, p, out);
                }
                out.push(')');
            }
        }
        Geometry::MultiPolygon(g) => {
            tag("MULTIPOLYGON", dims, v, g.polygons.is_empty(), out);
            if !g.polygons.is_empty() {
                out.push('(');
                for (i, poly) in g.polygons.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_polygon(poly, p, out);
                }
                out.push(')');
            }
        }
        Geometry::MultiSurface(g) => {
            tag("MULTISURFACE", dims, v, g.surfaces.is_empty(), out);
            if !g.surfaces.is_empty() {
                out.push('(');
                for (i, s) in g.surfaces.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    match s {
                        Surface::Polygon(poly) => write_member_polygon(poly, p, out),
                        Surface::CurvePolygon(cp) => write_member_curvepoly(cp, p, out),
                    }
                }
                out.push(')');
            }
        }
        Geometry::PolyhedralSurface(g) => {
            tag("POLYHEDRALSURFACE", dims, v, g.patches.is_empty(), out);
            if !g.patches.is_empty() {
                out.push('(');
                for (i, patch) in g.patches.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_polygon(patch, p, out);
                }
                out.push(')');
            }
        }
        Geometry::Tin(g) => {
            tag("TIN", dims, v, g.triangles.is_empty(), out);
            if !g.triangles.is_empty() {
                out.push('(');
                for (i, t) in g.triangles.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_member_triangle(t, p, out);
                }
                out.push(')');
            }
        }
        Geometry::GeometryCollection(g) => {
            tag("GEOMETRYCOLLECTION", dims, v, g.geoms.is_empty(), out);
            if !g.geoms.is_empty() {
                out.push('(');
                for (i, m) in g.geoms.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_geometry(m, v, p, out);
                }
                out.push(')');
            }
        }
    }
}

/// Type name, dimensionality marker, and `EMPTY` when there is no body.
fn tag(name: &str, dims: Dims, v: WktVariant, empty: bool, out: &mut String) {
    out.push_str(name);
    match v {
        WktVariant::Iso => match (dims.has_z, dims.has_m) {
            (true, true) => out.push_str(" ZM "),
            (true, false) => out.push_str(" Z "),
            (false, true) => out.push_str(" M "),
            (false, false) => {}
        },
        WktVariant::Extended => {
            if dims.has_m && !dims.has_z {
                out.push('M');
            }
        }
    }
    if empty {
        if !out.ends_with(' ') {
            out.push(' ');
        }
        out.push_str("EMPTY");
    }
}

fn write_segment(s: &CurveSegment, p: usize, out: &mut String) {
    match s {
        CurveSegment::LineString(l) => write_member_line(l, p, out),
        CurveSegment::CircularString(c) => {
            if c.is_empty() {
                out.push_str("CIRCULARSTRING EMPTY");
            } else {
                out.push_str("CIRCULARSTRING");
                chain(&c.coords, p, out);
            }
        }
    }
}

fn write_curve(c: &Curve, p: usize, out: &mut String) {
    match c {
        Curve::LineString(l) => write_member_line(l, p, out),
        Curve::CircularString(cs) => {
            if cs.is_empty() {
                out.push_str("CIRCULARSTRING EMPTY");
            } else {
                out.push_str("CIRCULARSTRING");
                chain(&cs.coords, p, out);
            }
        }
        Curve::CompoundCurve(cc) => write_member_compound(cc, p, out),
    }
}

fn write_member_curvepoly(cp: &CurvePolygon, p: usize, out: &mut String) {
    if cp.rings.is_empty() {
        out.push_str("CURVEPOLYGON EMPTY");
        return;
    }
    out.push_str("CURVEPOLYGON(");
    for (i, r) in cp.rings.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_curve(r, p, out);
    }
    out.push(')');
}

fn write_member_compound(cc: &CompoundCurve, p: usize, out: &mut String) {
    if cc.segments.is_empty() {
        out.push_str("COMPOUNDCURVE EMPTY");
        return;
    }
    out.push_str("COMPOUNDCURVE(");
    for (i, s) in cc.segments.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_segment(s, p, out);
    }
    out.push(')');
}

fn write_member_point(pt: &Point, p: usize, out: &mut String) {
    if pt.is_empty() {
        out.push_str("EMPTY");
    } else {
        out.push('(');
        write_pa_body(&pt.coords, p, out);
        out.push(')');
    }
}

fn write_member_line(l: &LineString, p: usize, out: &mut String) {
    if l.is_empty() {
        out.push_str("EMPTY");
    } else {
        chain(&l.coords, p, out);
    }
}

fn write_member_polygon(poly: &Polygon, p: usize, out: &mut String) {
    if poly.rings.is_empty() {
        out.push_str("EMPTY");
    } else {
        rings_body(&poly.rings, p, out);
    }
}

fn write_member_triangle(t: &Triangle, p: usize, out: &mut String) {
    if t.is_empty() {
        out.push_str("EMPTY");
    } else {
        out.push('(');
        chain(&t.coords, p, out);
        out.push(')');
    }
}

fn rings_body(rings: &[PointArray], p: usize, out: &mut String) {
    out.push('(');
    for (i, r) in rings.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        chain(r, p, out);
    }
    out.push(')');
}

fn chain(pa: &PointArray, p: usize, out: &mut String) {
    out.push('(');
    write_pa_body(pa, p, out);
    out.push(')');
}

fn write_pa_body(pa: &PointArray, precision: usize, out: &mut String) {
    let dims = pa.dims();
    for (i, pt) in pa.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        fmt_ord(pt.x, precision, out);
        out.push(' ');
        fmt_ord(pt.y, precision, out);
        if dims.has_z {
            out.push(' ');
            fmt_ord(pt.z, precision, out);
        }
        if dims.has_m {
            out.push(' ');
            fmt_ord(pt.m, precision, out);
        }
    }
}

fn fmt_ord(v: f64, precision: usize, out: &mut String) {
    if precision >= 17 {
        let _ = write!(out, "{v}");
        return;
    }
    let s = format!("{v:.precision$}");
    let trimmed = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    out.push_str(if trimmed == "-0" { "0" } else { trimmed });
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatia_types::{Dims, MultiPoint};

    fn pt(x: f64, y: f64) -> Point {
        Point::from_xy(x, y)
    }

    #[test]
    fn plain_and_extended_points() {
        let mut g = Geometry::Point(Point::from_xy(1.0, 2.0));
        assert_eq!(write_wkt(&g, WktVariant::Iso, 15), "POINT(1 2)");
        g.set_srid(Some(4326));
        assert_eq!(write_wkt(&g, WktVariant::Extended, 15), "SRID=4326;POINT(1 2)");
        assert_eq!(write_wkt(&g, WktVariant::Iso, 15), "POINT(1 2)");
    }

    #[test]
    fn dimensionality_markers() {
        let z = Geometry::Point(Point::from_xyz(1.0, 2.0, 3.0));
        assert_eq!(write_wkt(&z, WktVariant::Iso, 15), "POINT Z (1 2 3)");
        assert_eq!(write_wkt(&z, WktVariant::Extended, 15), "POINT(1 2 3)");

        let m = Geometry::Point(Point::from_xym(1.0, 2.0, 3.0));
        assert_eq!(write_wkt(&m, WktVariant::Iso, 15), "POINT M (1 2 3)");
        assert_eq!(write_wkt(&m, WktVariant::Extended, 15), "POINTM(1 2 3)");

        let zm = Geometry::Point(Point::from_xyzm(1.0, 2.0, 3.0, 4.0));
        assert_eq!(write_wkt(&zm, WktVariant::Iso, 15), "POINT ZM (1 2 3 4)");
        assert_eq!(write_wkt(&zm, WktVariant::Extended, 15), "POINT(1 2 3 4)");
    }

    #[test]
    fn empties() {
        let g = Geometry::Point(Point::empty(Dims::XYZ));
        assert_eq!(write_wkt(&g, WktVariant::Iso, 15), "POINT Z EMPTY");
        let g = Geometry::MultiPoint(MultiPoint::empty(Dims::XY));
        assert_eq!(write_wkt(&g, WktVariant::Iso, 15), "MULTIPOINT EMPTY");
    }

    #[test]
    fn multipoint_members_are_parenthesized() {
        let g = Geometry::MultiPoint(MultiPoint::new(vec![
            pt(0.0, 0.0),
            Point::empty(Dims::XY),
            pt(1.5, -2.0),
        ]));
        assert_eq!(
            write_wkt(&g, WktVariant::Extended, 15),
            "MULTIPOINT((0 0),EMPTY,(1.5 -2))"
        );
    }

    #[test]
    fn precision_trims_trailing_zeros() {
        let g = Geometry::Point(Point::from_xy(1.25, -0.000001));
        assert_eq!(write_wkt(&g, WktVariant::Iso, 2), "POINT(1.25 0)");
        assert_eq!(write_wkt(&g, WktVariant::Iso, 8), "POINT(1.25 -0.000001)");
    }

    #[test]
    fn high_precision_roundtrips_f64() {
        let x = 0.1 + 0.2;
        let g = Geometry::Point(Point::from_xy(x, 1.0 / 3.0));
        let text = write_wkt(&g, WktVariant::Iso, 20);
        let back = crate::wkt::parse_wkt(&text, crate::Checks::NONE).unwrap();
        assert!(back.same(&g));
    }
}
