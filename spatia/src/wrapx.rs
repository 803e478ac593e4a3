//! Longitude wrapping: split a geometry along a vertical line and
//! translate everything on one side, so that world-spanning data can be
//! re-centered on an arbitrary meridian.

use spatia_types::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Point4, PointArray, Polygon,
};

use crate::{engine, EngineError};

/// Split `geom` along the vertical line `x = cut_x` and translate the
/// resulting pieces on one side by `(amount, 0)`: the side with
/// `x > cut_x` when `amount < 0`, the side with `x < cut_x` when
/// `amount > 0`.
///
/// Empty input or a zero `amount` returns a plain clone. Lines are split
/// by direct segment interpolation, polygons through the planar engine's
/// overlay, and the translated and untranslated polygon pieces are
/// dissolved with its union. Curved and surface variants are not
/// supported.
///
/// # Examples
///
/// ```
/// use spatia::wrap_x;
/// use spatia::wire::{wkt, Checks};
///
/// let line = wkt::parse_wkt("LINESTRING (0 0, 10 0)", Checks::NONE).unwrap();
/// let wrapped = wrap_x(&line, 8.0, -10.0).unwrap();
/// let expected = wkt::parse_wkt("MULTILINESTRING ((0 0, 8 0), (-2 0, 0 0))", Checks::NONE).unwrap();
/// assert!(wrapped.same(&expected));
/// ```
pub fn wrap_x(geom: &Geometry, cut_x: f64, amount: f64) -> Result<Geometry, EngineError> {
    if geom.is_empty() || amount == 0.0 {
        return Ok(geom.clone());
    }
    match geom {
        Geometry::Point(g) => Ok(Geometry::Point(wrap_point(g, cut_x, amount))),
        Geometry::LineString(_) | Geometry::Polygon(_) => split_wrap(geom, cut_x, amount),
        Geometry::MultiPoint(g) => {
            let mut out = MultiPoint::new(
                g.points.iter().map(|p| wrap_point(p, cut_x, amount)).collect(),
            );
            out.srid = g.srid;
            out.dims = g.dims;
            Ok(Geometry::MultiPoint(out))
        }
        Geometry::MultiLineString(g) => {
            let members: Vec<Geometry> =
                g.lines.iter().map(|l| Geometry::LineString(l.clone())).collect();
            wrap_members(&members, g.srid, cut_x, amount)
        }
        Geometry::MultiPolygon(g) => {
            let members: Vec<Geometry> =
                g.polygons.iter().map(|p| Geometry::Polygon(p.clone())).collect();
            wrap_members(&members, g.srid, cut_x, amount)
        }
        Geometry::GeometryCollection(g) => {
            let mut wrapped = Vec::with_capacity(g.geoms.len());
            for m in &g.geoms {
                wrapped.push(wrap_x(m, cut_x, amount)?);
            }
            let mut out = GeometryCollection::new(wrapped);
            out.srid = g.srid;
            out.dims = g.dims;
            Ok(Geometry::GeometryCollection(out))
        }
        other => Err(EngineError::Unsupported(other.geom_type().name())),
    }
}

fn wrap_point(p: &Point, cut_x: f64, amount: f64) -> Point {
    let mut out = p.clone();
    if let Some(pt) = out.coords.first() {
        if (amount < 0.0 && pt.x > cut_x) || (amount > 0.0 && pt.x < cut_x) {
            out.coords.set_point(0, Point4 { x: pt.x + amount, ..pt });
            out.bbox = None;
        }
    }
    out
}

/// Wrap the members of a typed multi. When every wrapped member keeps the
/// original leaf variant the multi is rebuilt; a member that split falls
/// back to a heterogeneous collection of the wrapped members.
fn wrap_members(
    members: &[Geometry],
    srid: Option<i32>,
    cut_x: f64,
    amount: f64,
) -> Result<Geometry, EngineError> {
    let mut wrapped = Vec::with_capacity(members.len());
    for m in members {
        wrapped.push(wrap_x(m, cut_x, amount)?);
    }
    let mut out = if wrapped.iter().all(|w| w.as_line_string().is_some()) {
        Geometry::MultiLineString(MultiLineString::new(
            wrapped
                .into_iter()
                .filter_map(|w| match w {
                    Geometry::LineString(l) => Some(l),
                    _ => None,
                })
                .collect(),
        ))
    } else if wrapped.iter().all(|w| w.as_polygon().is_some()) {
        Geometry::MultiPolygon(MultiPolygon::new(
            wrapped
                .into_iter()
                .filter_map(|w| match w {
                    Geometry::Polygon(p) => Some(p),
                    _ => None,
                })
                .collect(),
        ))
    } else {
        Geometry::GeometryCollection(GeometryCollection::new(wrapped))
    };
    out.set_srid(srid);
    Ok(out)
}

/// Wrap a line or polygon that may straddle the cut line.
fn split_wrap(geom: &Geometry, cut_x: f64, amount: f64) -> Result<Geometry, EngineError> {
    let bbox = match geom.compute_box2d() {
        Some(b) => b,
        None => return Ok(geom.clone()),
    };

    // Entirely on the side that shifts.
    if (amount < 0.0 && bbox.xmin >= cut_x) || (amount > 0.0 && bbox.xmax <= cut_x) {
        let mut out = geom.clone();
        out.translate(amount, 0.0);
        return Ok(out);
    }
    // Entirely on the side that stays.
    if (amount < 0.0 && bbox.xmax <= cut_x) || (amount > 0.0 && bbox.xmin >= cut_x) {
        return Ok(geom.clone());
    }

    let pieces: Vec<Geometry> = match geom {
        Geometry::LineString(l) => split_line_x(l, cut_x),
        Geometry::Polygon(p) => engine::split_polygon_x(p, cut_x, &bbox)?
            .into_iter()
            .map(Geometry::Polygon)
            .collect(),
        other => return Ok(other.clone()),
    };
    if pieces.len() < 2 {
        log::warn!("expected a split at x={cut_x} but got {} piece(s)", pieces.len());
        return Ok(geom.clone());
    }

    let mut wrapped = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        wrapped.push(wrap_x(piece, cut_x, amount)?);
    }
    recombine(wrapped, geom.srid())
}

/// Cut a chain at every crossing of `x = cut_x`, interpolating the
/// crossing point in all four ordinates. A vertex exactly on the line
/// ends one piece and starts the next when the sides differ around it.
fn split_line_x(line: &LineString, cut_x: f64) -> Vec<Geometry> {
    let dims = line.dims();
    let mut pieces: Vec<Geometry> = Vec::new();
    let mut cur = PointArray::new(dims);
    let mut run_side = 0i8;

    let mut flush = |cur: &mut PointArray| {
        if cur.len() >= 2 {
            pieces.push(Geometry::LineString(LineString::new(std::mem::replace(
                cur,
                PointArray::new(dims),
            ))));
        }
    };

    for pt in line.coords.iter() {
        let side = side_of(pt.x, cut_x);
        if cur.is_empty() {
            cur.append(pt);
            run_side = side;
            continue;
        }
        let prev = cur.last().unwrap_or(pt);
        if side != 0 && run_side != 0 && side != run_side {
            if side_of(prev.x, cut_x) == 0 {
                // The previous vertex sat on the line; it closes this
                // piece and opens the next.
                flush(&mut cur);
                cur.append(prev);
            } else {
                let t = (cut_x - prev.x) / (pt.x - prev.x);
                let mut crossing = prev.interpolate(&pt, t);
                crossing.x = cut_x;
                cur.append(crossing);
                flush(&mut cur);
                cur.append(crossing);
            }
        }
        cur.append(pt);
        if side != 0 {
            run_side = side;
        }
    }
    flush(&mut cur);
    pieces
}

fn side_of(x: f64, cut_x: f64) -> i8 {
    if x < cut_x {
        -1
    } else if x > cut_x {
        1
    } else {
        0
    }
}

/// Reassemble wrapped pieces: lines collect into a multi, polygons
/// dissolve through the engine union, a mix falls back to a collection.
fn recombine(pieces: Vec<Geometry>, srid: Option<i32>) -> Result<Geometry, EngineError> {
    let mut lines: Vec<LineString> = Vec::new();
    let mut polys: Vec<Polygon> = Vec::new();
    let mut other = false;
    for piece in &pieces {
        match piece {
            Geometry::LineString(l) => lines.push(l.clone()),
            Geometry::MultiLineString(ml) => lines.extend(ml.lines.iter().cloned()),
            Geometry::Polygon(p) => polys.push(p.clone()),
            Geometry::MultiPolygon(mp) => polys.extend(mp.polygons.iter().cloned()),
            _ => other = true,
        }
    }
    if other || (!lines.is_empty() && !polys.is_empty()) {
        let mut out = GeometryCollection::new(pieces);
        out.srid = srid;
        return Ok(Geometry::GeometryCollection(out));
    }
    if polys.is_empty() {
        let mut out = if lines.len() == 1 {
            Geometry::LineString(lines.remove(0))
        } else {
            Geometry::MultiLineString(MultiLineString::new(lines))
        };
        out.set_srid(srid);
        Ok(out)
    } else {
        Ok(engine::union_polygons(&polys, srid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spatia_types::Dims;

    fn chain(dims: Dims, pts: &[Point4]) -> LineString {
        LineString::new(PointArray::from_points(dims, pts))
    }

    #[test]
    fn split_line_at_strict_crossing() {
        let line = chain(Dims::XY, &[Point4::new(0.0, 0.0), Point4::new(10.0, 0.0)]);
        let pieces = split_line_x(&line, 8.0);
        assert_eq!(pieces.len(), 2);
        let a = pieces[0].as_line_string().unwrap();
        let b = pieces[1].as_line_string().unwrap();
        assert_eq!(a.coords.last().unwrap().x, 8.0);
        assert_eq!(b.coords.first().unwrap().x, 8.0);
        assert_eq!(b.coords.last().unwrap().x, 10.0);
    }

    #[test]
    fn split_line_at_vertex_on_cut() {
        let line = chain(
            Dims::XY,
            &[Point4::new(0.0, 0.0), Point4::new(8.0, 1.0), Point4::new(10.0, 2.0)],
        );
        let pieces = split_line_x(&line, 8.0);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].as_line_string().unwrap().coords.len(), 2);
        assert_eq!(pieces[1].as_line_string().unwrap().coords.first().unwrap().x, 8.0);
    }

    #[test]
    fn split_interpolates_zm() {
        let line = chain(
            Dims::XYZM,
            &[
                Point4::with_zm(0.0, 0.0, 0.0, 0.0),
                Point4::with_zm(10.0, 0.0, 10.0, 20.0),
            ],
        );
        let pieces = split_line_x(&line, 5.0);
        let crossing = pieces[0].as_line_string().unwrap().coords.last().unwrap();
        assert_eq!(crossing.z, 5.0);
        assert_eq!(crossing.m, 10.0);
    }

    #[test]
    fn no_crossing_yields_one_piece() {
        let line = chain(Dims::XY, &[Point4::new(0.0, 0.0), Point4::new(5.0, 0.0)]);
        assert_eq!(split_line_x(&line, 8.0).len(), 1);
    }
}
