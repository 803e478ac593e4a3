//! Server-side viewport decimation: destructively remove vertices that
//! are provably invisible for a planar rendering of the geometry within
//! a rectangular view.

use spatia_types::{Bbox, Geometry, LineString, Point4, PointArray, Polygon};

const LEFT: u8 = 0x1;
const RIGHT: u8 = 0x2;
const BELOW: u8 = 0x4;
const ABOVE: u8 = 0x8;

/// Drop vertices of 2D (multi)linestrings and (multi)polygons that
/// cannot affect the rendered silhouette inside `view`. Other variants
/// and 3D geometries are left untouched.
///
/// A vertex is removed when it lies strictly outside the view and either
/// shares an outside half-plane with both neighbors, or (with
/// `cartesian_hint`, i.e. the downstream rendering is planar) the
/// triangle it spans with its neighbors provably misses the view
/// rectangle. Rings keep at least four points and stay closed; open
/// chains keep their endpoints.
///
/// # Examples
///
/// ```
/// use spatia::{remove_irrelevant_points_for_view, Bbox};
/// use spatia::wire::{wkt, Checks, WktVariant};
///
/// let mut g = wkt::parse_wkt(
///     "POLYGON ((0 30, 15 30, 30 30, 30 0, 0 0, 0 30))",
///     Checks::NONE,
/// )
/// .unwrap();
/// remove_irrelevant_points_for_view(&mut g, &Bbox::new2d(12.0, 12.0, 18.0, 18.0), true);
/// assert_eq!(
///     wkt::write_wkt(&g, WktVariant::Extended, 15),
///     "POLYGON((15 30,30 0,0 0,15 30))"
/// );
/// ```
pub fn remove_irrelevant_points_for_view(geom: &mut Geometry, view: &Bbox, cartesian_hint: bool) {
    if geom.has_z() {
        return;
    }
    match geom {
        Geometry::LineString(g) => decimate_line(g, view, cartesian_hint),
        Geometry::Polygon(g) => decimate_polygon(g, view, cartesian_hint),
        Geometry::MultiLineString(g) => {
            for line in &mut g.lines {
                decimate_line(line, view, cartesian_hint);
            }
            g.bbox = None;
        }
        Geometry::MultiPolygon(g) => {
            for poly in &mut g.polygons {
                decimate_polygon(poly, view, cartesian_hint);
            }
            g.bbox = None;
        }
        _ => {}
    }
}

fn decimate_line(line: &mut LineString, view: &Bbox, hint: bool) {
    if decimate_chain(&mut line.coords, view, hint, false) {
        line.bbox = None;
    }
}

fn decimate_polygon(poly: &mut Polygon, view: &Bbox, hint: bool) {
    let mut changed = false;
    for ring in &mut poly.rings {
        changed |= decimate_chain(ring, view, hint, true);
    }
    if changed {
        poly.bbox = None;
    }
}

/// Returns whether anything was removed. `ring` chains are handled
/// cyclically on their open representation and re-closed afterwards.
fn decimate_chain(pa: &mut PointArray, view: &Bbox, hint: bool, ring: bool) -> bool {
    let cyclic = ring && pa.is_closed_2d() && pa.len() > 1;
    let mut points: Vec<Point4> = pa.iter().collect();
    if cyclic {
        points.pop();
    }
    let min_len = if cyclic { 3 } else { 2 };
    if points.len() <= min_len {
        return false;
    }

    let mut removed = false;
    let mut pass_removed = true;
    while pass_removed {
        pass_removed = false;
        let mut i = if cyclic { 0 } else { 1 };
        loop {
            let n = points.len();
            if n <= min_len {
                break;
            }
            let end = if cyclic { n } else { n - 1 };
            if i >= end {
                break;
            }
            let (a, b) = if cyclic {
                (points[(i + n - 1) % n], points[(i + 1) % n])
            } else {
                (points[i - 1], points[i + 1])
            };
            if removable(&a, &points[i], &b, view, hint) {
                points.remove(i);
                pass_removed = true;
                removed = true;
                // Re-test the same position: its neighborhood changed.
            } else {
                i += 1;
            }
        }
    }

    if removed {
        let mut out = PointArray::from_points(pa.dims(), &points);
        if cyclic {
            let first = points[0];
            out.append(first);
        }
        *pa = out;
    }
    removed
}

fn removable(a: &Point4, v: &Point4, b: &Point4, view: &Bbox, hint: bool) -> bool {
    let ov = outcode(v, view);
    if ov == 0 {
        return false;
    }
    let oa = outcode(a, view);
    let ob = outcode(b, view);
    // All three on one outside half-plane: the change is invisible.
    if oa & ov & ob != 0 {
        return true;
    }
    // With a planar renderer downstream, removal only alters the region
    // swept by the neighbor triangle; when that misses the view entirely
    // the rendering within the view is unchanged.
    hint && !triangle_touches_rect(a, v, b, view)
}

fn outcode(p: &Point4, view: &Bbox) -> u8 {
    let mut code = 0;
    if p.x < view.xmin {
        code |= LEFT;
    } else if p.x > view.xmax {
        code |= RIGHT;
    }
    if p.y < view.ymin {
        code |= BELOW;
    } else if p.y > view.ymax {
        code |= ABOVE;
    }
    code
}

fn triangle_touches_rect(a: &Point4, b: &Point4, c: &Point4, view: &Bbox) -> bool {
    // A triangle vertex inside (or on) the rectangle.
    if outcode(a, view) == 0 || outcode(b, view) == 0 || outcode(c, view) == 0 {
        return true;
    }
    // A triangle edge crossing a rectangle edge.
    let corners = [
        (view.xmin, view.ymin),
        (view.xmax, view.ymin),
        (view.xmax, view.ymax),
        (view.xmin, view.ymax),
    ];
    let tri = [(a.x, a.y), (b.x, b.y), (c.x, c.y)];
    for i in 0..3 {
        for j in 0..4 {
            if segments_intersect(tri[i], tri[(i + 1) % 3], corners[j], corners[(j + 1) % 4]) {
                return true;
            }
        }
    }
    // The rectangle wholly inside the triangle.
    point_in_triangle(corners[0], tri[0], tri[1], tri[2])
}

fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    r.0 >= p.0.min(q.0) && r.0 <= p.0.max(q.0) && r.1 >= p.1.min(q.1) && r.1 <= p.1.max(q.1)
}

/// Inclusive segment intersection (touching counts).
fn segments_intersect(p1: (f64, f64), p2: (f64, f64), q1: (f64, f64), q2: (f64, f64)) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

fn point_in_triangle(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let d1 = orient(a, b, p);
    let d2 = orient(b, c, p);
    let d3 = orient(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
