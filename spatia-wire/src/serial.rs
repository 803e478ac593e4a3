//! The internal binary form: the canonical machine-endian interchange
//! between the runtime and its storage host.
//!
//! ```text
//! geom       := type_byte [bbox] [srid] body
//! type_byte  := TYPE (low nibble) | HASM 0x10 | HASZ 0x20 | HASSRID 0x40 | HASBBOX 0x80
//! bbox       := 4 x f32  (xmin, ymin, xmax, ymax)
//! srid       := i32
//! body       := point | chain | rings | sub-geometries, per type
//! ```
//!
//! The f32 bounding box is rounded outward so it always covers the f64
//! extent; it is a storage-side prefilter, and parsing recomputes the
//! exact in-memory box from the coordinates instead of trusting it.

use float_next_after::NextAfter;
use spatia_types::{
    Bbox, CircularString, CompoundCurve, Curve, CurvePolygon, CurveSegment, Dims, Geometry,
    GeometryCollection, LineString, MultiCurve, MultiLineString, MultiPoint, MultiPolygon,
    MultiSurface, Point, Point4, PointArray, Polygon, PolyhedralSurface, Surface, Tin, Triangle,
};

use crate::WireError;

const HAS_M: u8 = 0x10;
const HAS_Z: u8 = 0x20;
const HAS_SRID: u8 = 0x40;
const HAS_BBOX: u8 = 0x80;

const TYPE_POINT: u8 = 1;
const TYPE_LINESTRING: u8 = 2;
const TYPE_POLYGON: u8 = 3;
const TYPE_MULTIPOINT: u8 = 4;
const TYPE_MULTILINESTRING: u8 = 5;
const TYPE_MULTIPOLYGON: u8 = 6;
const TYPE_COLLECTION: u8 = 7;
const TYPE_CIRCULARSTRING: u8 = 8;
const TYPE_COMPOUNDCURVE: u8 = 9;
const TYPE_TRIANGLE: u8 = 10;
const TYPE_POLYHEDRALSURFACE: u8 = 11;
const TYPE_TIN: u8 = 12;
const TYPE_CURVEPOLYGON: u8 = 13;
const TYPE_MULTICURVE: u8 = 14;
const TYPE_MULTISURFACE: u8 = 15;

/// Serialize a geometry into the internal form.
pub fn to_bytes(geom: &Geometry) -> Vec<u8> {
    let mut out = Vec::new();
    write_geom(geom, &mut out);
    out
}

/// Deserialize a geometry from the internal form.
pub fn from_bytes(bytes: &[u8]) -> Result<Geometry, WireError> {
    let mut r = Reader { buf: bytes, pos: 0 };
    read_geom(&mut r, None)
}

fn write_geom(geom: &Geometry, out: &mut Vec<u8>) {
    match geom {
        Geometry::Point(g) => {
            write_header(TYPE_POINT, g.dims(), &g.bbox, g.srid, out);
            write_point_body(&g.coords, g.dims(), out);
        }
        Geometry::LineString(g) => {
            write_header(TYPE_LINESTRING, g.dims(), &g.bbox, g.srid, out);
            write_pa(&g.coords, out);
        }
        Geometry::CircularString(g) => {
            write_header(TYPE_CIRCULARSTRING, g.dims(), &g.bbox, g.srid, out);
            write_pa(&g.coords, out);
        }
        Geometry::Triangle(g) => {
            write_header(TYPE_TRIANGLE, g.dims(), &g.bbox, g.srid, out);
            write_pa(&g.coords, out);
        }
        Geometry::Polygon(g) => {
            write_header(TYPE_POLYGON, g.dims(), &g.bbox, g.srid, out);
            write_rings(&g.rings, out);
        }
        Geometry::CompoundCurve(g) => {
            write_header(TYPE_COMPOUNDCURVE, g.dims(), &g.bbox, g.srid, out);
            write_count(g.segments.len(), out);
            for s in &g.segments {
                write_geom(&s.clone().into(), out);
            }
        }
        Geometry::CurvePolygon(g) => {
            write_header(TYPE_CURVEPOLYGON, g.dims(), &g.bbox, g.srid, out);
            write_count(g.rings.len(), out);
            for rg in &g.rings {
                write_geom(&rg.clone().into(), out);
            }
        }
        Geometry::MultiPoint(g) => {
            write_header(TYPE_MULTIPOINT, g.dims(), &g.bbox, g.srid, out);
            write_count(g.points.len(), out);
            for p in &g.points {
                write_geom(&Geometry::Point(p.clone()), out);
            }
        }
        Geometry::MultiLineString(g) => {
            write_header(TYPE_MULTILINESTRING, g.dims(), &g.bbox, g.srid, out);
            write_count(g.lines.len(), out);
            for l in &g.lines {
                write_geom(&Geometry::LineString(l.clone()), out);
            }
        }
        Geometry::MultiCurve(g) => {
            write_header(TYPE_MULTICURVE, g.dims(), &g.bbox, g.srid, out);
            write_count(g.curves.len(), out);
            for c in &g.curves {
                write_geom(&c.clone().into(), out);
            }
        }
        Geometry::MultiPolygon(g) => {
            write_header(TYPE_MULTIPOLYGON, g.dims(), &g.bbox, g.srid, out);
            write_count(g.polygons.len(), out);
            for p in &g.polygons {
                write_geom(&Geometry::Polygon(p.clone()), out);
            }
        }
        Geometry::MultiSurface(g) => {
            write_header(TYPE_MULTISURFACE, g.dims(), &g.bbox, g.srid, out);
            write_count(g.surfaces.len(), out);
            for s in &g.surfaces {
                write_geom(&s.clone().into(), out);
            }
        }
        Geometry::PolyhedralSurface(g) => {
            write_header(TYPE_POLYHEDRALSURFACE, g.dims(), &g.bbox, g.srid, out);
            out.push(u8::from(g.solid));
            write_count(g.patches.len(), out);
            for p in &g.patches {
                write_geom(&Geometry::Polygon(p.clone()), out);
            }
        }
        Geometry::Tin(g) => {
            write_header(TYPE_TIN, g.dims(), &g.bbox, g.srid, out);
            write_count(g.triangles.len(), out);
            for t in &g.triangles {
                write_geom(&Geometry::Triangle(t.clone()), out);
            }
        }
        Geometry::GeometryCollection(g) => {
            write_header(TYPE_COLLECTION, g.dims(), &g.bbox, g.srid, out);
            write_count(g.geoms.len(), out);
            for m in &g.geoms {
                write_geom(m, out);
            }
        }
    }
}

fn write_header(
    code: u8,
    dims: Dims,
    bbox: &Option<Bbox>,
    srid: Option<i32>,
    out: &mut Vec<u8>,
) {
    let mut tb = code;
    if dims.has_z {
        tb |= HAS_Z;
    }
    if dims.has_m {
        tb |= HAS_M;
    }
    if srid.is_some() {
        tb |= HAS_SRID;
    }
    if bbox.is_some() {
        tb |= HAS_BBOX;
    }
    out.push(tb);
    if let Some(b) = bbox {
        write_f32(round_down(b.xmin), out);
        write_f32(round_down(b.ymin), out);
        write_f32(round_up(b.xmax), out);
        write_f32(round_up(b.ymax), out);
    }
    if let Some(s) = srid {
        out.extend_from_slice(&s.to_ne_bytes());
    }
}

// The coarse f32 box must keep covering the f64 extent it summarizes.
fn round_down(v: f64) -> f32 {
    let n = v as f32;
    if f64::from(n) > v {
        n.next_after(f32::NEG_INFINITY)
    } else {
        n
    }
}

fn round_up(v: f64) -> f32 {
    let n = v as f32;
    if f64::from(n) < v {
        n.next_after(f32::INFINITY)
    } else {
        n
    }
}

fn write_f32(v: f32, out: &mut Vec<u8>) {
    out.extend_from_slice(&v.to_ne_bytes());
}

fn write_count(n: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(n as u32).to_ne_bytes());
}

fn write_ordinates(p: &Point4, dims: Dims, out: &mut Vec<u8>) {
    out.extend_from_slice(&p.x.to_ne_bytes());
    out.extend_from_slice(&p.y.to_ne_bytes());
    if dims.has_z {
        out.extend_from_slice(&p.z.to_ne_bytes());
    }
    if dims.has_m {
        out.extend_from_slice(&p.m.to_ne_bytes());
    }
}

// The point body has no count field; emptiness is encoded as NaN
// ordinates.
fn write_point_body(pa: &PointArray, dims: Dims, out: &mut Vec<u8>) {
    match pa.first() {
        Some(p) => write_ordinates(&p, dims, out),
        None => {
            for _ in 0..dims.width() {
                out.extend_from_slice(&f64::NAN.to_ne_bytes());
            }
        }
    }
}

fn write_pa(pa: &PointArray, out: &mut Vec<u8>) {
    write_count(pa.len(), out);
    for p in pa.iter() {
        write_ordinates(&p, pa.dims(), out);
    }
}

fn write_rings(rings: &[PointArray], out: &mut Vec<u8>) {
    write_count(rings.len(), out);
    for r in rings {
        write_pa(r, out);
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8], WireError> {
        if self.pos + n > self.buf.len() {
            return Err(WireError::invariant(self.pos, "unexpected end of buffer"));
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_ne_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn i32(&mut self) -> Result<i32, WireError> {
        Ok(i32::from_ne_bytes(self.take(4)?.try_into().unwrap()))
    }

    fn f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_ne_bytes(self.take(8)?.try_into().unwrap()))
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

fn read_geom(r: &mut Reader, parent_dims: Option<Dims>) -> Result<Geometry, WireError> {
    let header_at = r.pos;
    let tb = r.u8()?;
    let code = tb & 0x0F;
    let dims = Dims::new(tb & HAS_Z != 0, tb & HAS_M != 0);
    if let Some(parent) = parent_dims {
        if parent != dims {
            return Err(WireError::invariant(
                header_at,
                "sub-geometry dimensionality differs from its parent",
            ));
        }
    }
    let has_bbox = tb & HAS_BBOX != 0;
    if has_bbox {
        r.take(16)?;
    }
    let srid = if tb & HAS_SRID != 0 { Some(r.i32()?) } else { None };

    let mut geom = read_body(r, code, dims, header_at)?;
    geom.set_srid(srid);
    if has_bbox {
        geom.add_bbox();
    }
    Ok(geom)
}

fn read_body(r: &mut Reader, code: u8, dims: Dims, at: usize) -> Result<Geometry, WireError> {
    Ok(match code {
        TYPE_POINT => {
            let mut ords = Vec::with_capacity(dims.width());
            for _ in 0..dims.width() {
                ords.push(r.f64()?);
            }
            let mut coords = PointArray::with_capacity(dims, 1);
            if !ords.iter().all(|v| v.is_nan()) {
                coords.append(ordinates_to_point(&ords, dims));
            }
            Geometry::Point(Point::new(coords))
        }
        TYPE_LINESTRING => Geometry::LineString(LineString::new(read_pa(r, dims)?)),
        TYPE_CIRCULARSTRING => Geometry::CircularString(CircularString::new(read_pa(r, dims)?)),
        TYPE_TRIANGLE => Geometry::Triangle(Triangle::new(read_pa(r, dims)?)),
        TYPE_POLYGON => {
            let nrings = r.u32()? as usize;
            let mut rings = Vec::with_capacity(nrings.min(r.remaining() / 4));
            for _ in 0..nrings {
                rings.push(read_pa(r, dims)?);
            }
            let mut poly = Polygon::new(rings);
            poly.dims = dims;
            Geometry::Polygon(poly)
        }
        TYPE_COMPOUNDCURVE => {
            let mut g = CompoundCurve::empty(dims);
            for child in read_children(r, dims)? {
                g.segments.push(match child {
                    Geometry::LineString(l) => CurveSegment::LineString(l),
                    Geometry::CircularString(c) => CurveSegment::CircularString(c),
                    other => return Err(bad_child(at, "CompoundCurve", &other)),
                });
            }
            Geometry::CompoundCurve(g)
        }
        TYPE_CURVEPOLYGON => {
            let mut g = CurvePolygon::empty(dims);
            for child in read_children(r, dims)? {
                g.rings.push(child_to_curve(child).map_err(|o| bad_child(at, "CurvePolygon", &o))?);
            }
            Geometry::CurvePolygon(g)
        }
        TYPE_MULTIPOINT => {
            let mut g = MultiPoint::empty(dims);
            for child in read_children(r, dims)? {
                match child {
                    Geometry::Point(p) => g.points.push(p),
                    other => return Err(bad_child(at, "MultiPoint", &other)),
                }
            }
            Geometry::MultiPoint(g)
        }
        TYPE_MULTILINESTRING => {
            let mut g = MultiLineString::empty(dims);
            for child in read_children(r, dims)? {
                match child {
                    Geometry::LineString(l) => g.lines.push(l),
                    other => return Err(bad_child(at, "MultiLineString", &other)),
                }
            }
            Geometry::MultiLineString(g)
        }
        TYPE_MULTICURVE => {
            let mut g = MultiCurve::empty(dims);
            for child in read_children(r, dims)? {
                g.curves.push(child_to_curve(child).map_err(|o| bad_child(at, "MultiCurve", &o))?);
            }
            Geometry::MultiCurve(g)
        }
        TYPE_MULTIPOLYGON => {
            let mut g = MultiPolygon::empty(dims);
            for child in read_children(r, dims)? {
                match child {
                    Geometry::Polygon(p) => g.polygons.push(p),
                    other => return Err(bad_child(at, "MultiPolygon", &other)),
                }
            }
            Geometry::MultiPolygon(g)
        }
        TYPE_MULTISURFACE => {
            let mut g = MultiSurface::empty(dims);
            for child in read_children(r, dims)? {
                g.surfaces.push(match child {
                    Geometry::Polygon(p) => Surface::Polygon(p),
                    Geometry::CurvePolygon(cp) => Surface::CurvePolygon(cp),
                    other => return Err(bad_child(at, "MultiSurface", &other)),
                });
            }
            Geometry::MultiSurface(g)
        }
        TYPE_POLYHEDRALSURFACE => {
            let mut g = PolyhedralSurface::empty(dims);
            g.solid = r.u8()? != 0;
            for child in read_children(r, dims)? {
                match child {
                    Geometry::Polygon(p) => g.patches.push(p),
                    other => return Err(bad_child(at, "PolyhedralSurface", &other)),
                }
            }
            Geometry::PolyhedralSurface(g)
        }
        TYPE_TIN => {
            let mut g = Tin::empty(dims);
            for child in read_children(r, dims)? {
                match child {
                    Geometry::Triangle(t) => g.triangles.push(t),
                    other => return Err(bad_child(at, "Tin", &other)),
                }
            }
            Geometry::Tin(g)
        }
        TYPE_COLLECTION => {
            let mut g = GeometryCollection::empty(dims);
            g.geoms = read_children(r, dims)?;
            Geometry::GeometryCollection(g)
        }
        other => {
            return Err(WireError::invariant(at, format!("unknown type code {other}")));
        }
    })
}

fn child_to_curve(child: Geometry) -> Result<Curve, Geometry> {
    match child {
        Geometry::LineString(l) => Ok(Curve::LineString(l)),
        Geometry::CircularString(c) => Ok(Curve::CircularString(c)),
        Geometry::CompoundCurve(cc) => Ok(Curve::CompoundCurve(cc)),
        other => Err(other),
    }
}

fn bad_child(at: usize, parent: &str, child: &Geometry) -> WireError {
    WireError::invariant(
        at,
        format!("{parent} may not contain {}", child.geom_type().name()),
    )
}

fn read_children(r: &mut Reader, dims: Dims) -> Result<Vec<Geometry>, WireError> {
    let n = r.u32()? as usize;
    // Each child costs at least a type byte; a count beyond the remaining
    // bytes is framing corruption, not a huge allocation request.
    if n > r.remaining() {
        return Err(WireError::invariant(r.pos, "sub-geometry count overruns buffer"));
    }
    let mut children = Vec::with_capacity(n);
    for _ in 0..n {
        children.push(read_geom(r, Some(dims))?);
    }
    Ok(children)
}

fn read_pa(r: &mut Reader, dims: Dims) -> Result<PointArray, WireError> {
    let at = r.pos;
    let n = r.u32()? as usize;
    if n * dims.width() * 8 > r.remaining() {
        return Err(WireError::invariant(at, "point count overruns buffer"));
    }
    let mut pa = PointArray::with_capacity(dims, n);
    let mut ords = vec![0.0; dims.width()];
    for _ in 0..n {
        for o in ords.iter_mut() {
            *o = r.f64()?;
        }
        pa.append(ordinates_to_point(&ords, dims));
    }
    Ok(pa)
}

fn ordinates_to_point(ords: &[f64], dims: Dims) -> Point4 {
    let mut p = Point4::new(ords[0], ords[1]);
    match (dims.has_z, dims.has_m) {
        (true, false) => p.z = ords[2],
        (false, true) => p.m = ords[2],
        (true, true) => {
            p.z = ords[2];
            p.m = ords[3];
        }
        (false, false) => {}
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ls(dims: Dims, pts: &[Point4]) -> Geometry {
        Geometry::LineString(LineString::new(PointArray::from_points(dims, pts)))
    }

    fn roundtrip(g: &Geometry) -> Geometry {
        from_bytes(&to_bytes(g)).unwrap()
    }

    #[test]
    fn point_roundtrip_all_dims() {
        for g in [
            Geometry::Point(Point::from_xy(1.5, -2.5)),
            Geometry::Point(Point::from_xyz(1.0, 2.0, 3.0)),
            Geometry::Point(Point::from_xym(1.0, 2.0, 4.0)),
            Geometry::Point(Point::from_xyzm(1.0, 2.0, 3.0, 4.0)),
        ] {
            assert!(roundtrip(&g).same(&g));
        }
    }

    #[test]
    fn empty_point_uses_nan_body() {
        let g = Geometry::Point(Point::empty(Dims::XYZ));
        let bytes = to_bytes(&g);
        assert_eq!(bytes.len(), 1 + 3 * 8);
        let back = from_bytes(&bytes).unwrap();
        assert!(back.is_empty());
        assert!(back.same(&g));
    }

    #[test]
    fn srid_header_roundtrips() {
        let mut g = Geometry::Point(Point::from_xy(0.0, 0.0));
        g.set_srid(Some(4326));
        let back = roundtrip(&g);
        assert_eq!(back.srid(), Some(4326));

        let mut no_srid = g.clone();
        no_srid.set_srid(None);
        assert!(to_bytes(&no_srid).len() < to_bytes(&g).len());
    }

    #[test]
    fn bbox_header_is_recomputed_exactly() {
        // Coordinates that are not representable as f32; the lossy header
        // must not leak into the reconstructed box.
        let mut g = ls(
            Dims::XY,
            &[Point4::new(0.1, 0.2), Point4::new(16777217.1, 7.3)],
        );
        g.add_bbox();
        let back = roundtrip(&g);
        assert!(back.same(&g));
        assert_eq!(back.bbox(), g.bbox());
    }

    #[test]
    fn outward_rounding_covers_extent() {
        let xmax: f64 = 16777217.1;
        assert!(f64::from(round_up(xmax)) >= xmax);
        assert!(f64::from(round_down(-xmax)) <= -xmax);
        assert!(f64::from(round_down(0.1)) <= 0.1);
        assert!(f64::from(round_up(0.1)) >= 0.1);
    }

    #[test]
    fn nested_collection_roundtrip() {
        let inner = GeometryCollection::new(vec![
            Geometry::Point(Point::from_xy(1.0, 1.0)),
            ls(Dims::XY, &[Point4::new(0.0, 0.0), Point4::new(2.0, 2.0)]),
        ]);
        let g = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::GeometryCollection(inner),
            Geometry::Point(Point::empty(Dims::XY)),
        ]));
        assert!(roundtrip(&g).same(&g));
    }

    #[test]
    fn polygon_and_multipolygon_roundtrip() {
        let ring = PointArray::from_points(
            Dims::XY,
            &[
                Point4::new(0.0, 0.0),
                Point4::new(10.0, 0.0),
                Point4::new(10.0, 10.0),
                Point4::new(0.0, 0.0),
            ],
        );
        let poly = Polygon::new(vec![ring]);
        let g = Geometry::MultiPolygon(MultiPolygon::new(vec![poly.clone(), poly]));
        assert!(roundtrip(&g).same(&g));
    }

    #[test]
    fn solid_surface_roundtrip() {
        let ring = PointArray::from_points(
            Dims::XYZ,
            &[
                Point4::with_z(0.0, 0.0, 0.0),
                Point4::with_z(1.0, 0.0, 0.0),
                Point4::with_z(1.0, 1.0, 0.0),
                Point4::with_z(0.0, 0.0, 0.0),
            ],
        );
        let mut ps = PolyhedralSurface::new(vec![Polygon::new(vec![ring])]);
        ps.solid = true;
        let g = Geometry::PolyhedralSurface(ps);
        let back = roundtrip(&g);
        assert!(back.same(&g));
        assert!(back.as_polyhedral_surface().unwrap().solid);
    }

    #[test]
    fn truncated_buffer_is_an_invariant_error() {
        let g = ls(Dims::XY, &[Point4::new(0.0, 0.0), Point4::new(2.0, 2.0)]);
        let bytes = to_bytes(&g);
        let err = from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, WireError::Invariant { .. }));
    }

    #[test]
    fn mismatched_child_type_is_rejected() {
        // MultiPoint framing a LineString child.
        let child = ls(Dims::XY, &[Point4::new(0.0, 0.0), Point4::new(1.0, 1.0)]);
        let mut buf = vec![TYPE_MULTIPOINT];
        buf.extend_from_slice(&1u32.to_ne_bytes());
        buf.extend_from_slice(&to_bytes(&child));
        assert!(matches!(
            from_bytes(&buf).unwrap_err(),
            WireError::Invariant { .. }
        ));
    }
}
