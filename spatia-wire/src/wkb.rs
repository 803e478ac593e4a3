//! WKB / EWKB: the OGC well-known binary form (06-103r4) with the Z, M
//! and SRID high-bit extensions, plus the uppercase-hex flavor.
//!
//! Every geometry, nested ones included, carries its own byte-order
//! marker (0 = big-endian, 1 = little-endian). The reader accepts both
//! orders, the extended flag bits as well as the ISO +1000/+2000/+3000
//! type offsets, and swaps ordinate bytes whenever the marker disagrees
//! with the machine.

use std::io::Cursor;

use scroll::IOread;
use spatia_types::{
    CircularString, CompoundCurve, Curve, CurvePolygon, CurveSegment, Dims, Geometry,
    GeometryCollection, LineString, MultiCurve, MultiLineString, MultiPoint, MultiPolygon,
    MultiSurface, Point, Point4, PointArray, Polygon, PolyhedralSurface, Surface, Tin, Triangle,
};

use crate::{Checks, ParseError, ParseErrorKind};

const WKB_Z: u32 = 0x8000_0000;
const WKB_M: u32 = 0x4000_0000;
const WKB_SRID: u32 = 0x2000_0000;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTILINESTRING: u32 = 5;
const WKB_MULTIPOLYGON: u32 = 6;
const WKB_COLLECTION: u32 = 7;
const WKB_CIRCULARSTRING: u32 = 8;
const WKB_COMPOUNDCURVE: u32 = 9;
const WKB_CURVEPOLYGON: u32 = 10;
const WKB_MULTICURVE: u32 = 11;
const WKB_MULTISURFACE: u32 = 12;
const WKB_POLYHEDRALSURFACE: u32 = 15;
const WKB_TIN: u32 = 16;
const WKB_TRIANGLE: u32 = 17;

/// Byte order of an encoded geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    /// XDR, marker byte 0.
    Big,
    /// NDR, marker byte 1.
    Little,
}

impl Endian {
    pub fn native() -> Endian {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    fn marker(self) -> u8 {
        match self {
            Endian::Big => 0,
            Endian::Little => 1,
        }
    }

    fn ctx(self) -> scroll::Endian {
        match self {
            Endian::Big => scroll::BE,
            Endian::Little => scroll::LE,
        }
    }
}

/// Which dialect to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WkbVariant {
    /// Plain WKB: no SRID is written.
    Iso,
    /// EWKB: a known SRID is written on the outermost geometry.
    Extended,
}

/// Encode a geometry as WKB/EWKB in the given byte order.
pub fn write_wkb(geom: &Geometry, variant: WkbVariant, endian: Endian) -> Vec<u8> {
    let mut out = Vec::new();
    let srid = match variant {
        WkbVariant::Iso => None,
        WkbVariant::Extended => geom.srid(),
    };
    write_geometry(geom, srid, endian, &mut out);
    out
}

/// Encode as uppercase hexadecimal WKB/EWKB.
pub fn write_hex_wkb(geom: &Geometry, variant: WkbVariant, endian: Endian) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let bytes = write_wkb(geom, variant, endian);
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push(HEX[usize::from(b >> 4)] as char);
        s.push(HEX[usize::from(b & 0xF)] as char);
    }
    s
}

/// Decode WKB/EWKB bytes.
pub fn read_wkb(bytes: &[u8], checks: Checks) -> Result<Geometry, ParseError> {
    let mut r = WkbReader { cur: Cursor::new(bytes), checks };
    r.read_geometry(None)
}

/// Decode hexadecimal WKB/EWKB.
pub fn read_hex_wkb(hex: &str, checks: Checks) -> Result<Geometry, ParseError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(ParseError::new(
            ParseErrorKind::InvalidGeom,
            hex.len(),
            "hex input has odd length",
        ));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
        let hi = (pair[0] as char).to_digit(16);
        let lo = (pair[1] as char).to_digit(16);
        match (hi, lo) {
            (Some(hi), Some(lo)) => bytes.push((hi * 16 + lo) as u8),
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidGeom,
                    i * 2,
                    "invalid hex digit",
                ))
            }
        }
    }
    read_wkb(&bytes, checks)
}

fn push_u8(v: u8, out: &mut Vec<u8>) {
    out.push(v);
}

fn push_u32(v: u32, e: Endian, out: &mut Vec<u8>) {
    match e {
        Endian::Big => out.extend_from_slice(&v.to_be_bytes()),
        Endian::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

fn push_i32(v: i32, e: Endian, out: &mut Vec<u8>) {
    match e {
        Endian::Big => out.extend_from_slice(&v.to_be_bytes()),
        Endian::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

fn push_f64(v: f64, e: Endian, out: &mut Vec<u8>) {
    match e {
        Endian::Big => out.extend_from_slice(&v.to_be_bytes()),
        Endian::Little => out.extend_from_slice(&v.to_le_bytes()),
    }
}

fn type_word(code: u32, dims: Dims, with_srid: bool) -> u32 {
    let mut w = code;
    if dims.has_z {
        w |= WKB_Z;
    }
    if dims.has_m {
        w |= WKB_M;
    }
    if with_srid {
        w |= WKB_SRID;
    }
    w
}

fn write_header(
    code: u32,
    dims: Dims,
    srid: Option<i32>,
    e: Endian,
    out: &mut Vec<u8>,
) {
    push_u8(e.marker(), out);
    push_u32(type_word(code, dims, srid.is_some()), e, out);
    if let Some(s) = srid {
        push_i32(s, e, out);
    }
}

fn write_ordinates(p: &Point4, dims: Dims, e: Endian, out: &mut Vec<u8>) {
    push_f64(p.x, e, out);
    push_f64(p.y, e, out);
    if dims.has_z {
        push_f64(p.z, e, out);
    }
    if dims.has_m {
        push_f64(p.m, e, out);
    }
}

fn write_pa(pa: &PointArray, e: Endian, out: &mut Vec<u8>) {
    push_u32(pa.len() as u32, e, out);
    for p in pa.iter() {
        write_ordinates(&p, pa.dims(), e, out);
    }
}

fn write_geometry(geom: &Geometry, srid: Option<i32>, e: Endian, out: &mut Vec<u8>) {
    let dims = geom.dims();
    match geom {
        Geometry::Point(g) => {
            write_header(WKB_POINT, dims, srid, e, out);
            match g.point4() {
                Some(p) => write_ordinates(&p, dims, e, out),
                None => {
                    for _ in 0..dims.width() {
                        push_f64(f64::NAN, e, out);
                    }
                }
            }
        }
        Geometry::LineString(g) => {
            write_header(WKB_LINESTRING, dims, srid, e, out);
            write_pa(&g.coords, e, out);
        }
        Geometry::CircularString(g) => {
            write_header(WKB_CIRCULARSTRING, dims, srid, e, out);
            write_pa(&g.coords, e, out);
        }
        Geometry::Triangle(g) => {
            // A triangle frames like a one-ring polygon on the wire.
            write_header(WKB_TRIANGLE, dims, srid, e, out);
            if g.coords.is_empty() {
                push_u32(0, e, out);
            } else {
                push_u32(1, e, out);
                write_pa(&g.coords, e, out);
            }
        }
        Geometry::Polygon(g) => {
            write_header(WKB_POLYGON, dims, srid, e, out);
            push_u32(g.rings.len() as u32, e, out);
            for ring in &g.rings {
                write_pa(ring, e, out);
            }
        }
        Geometry::CompoundCurve(g) => {
            write_header(WKB_COMPOUNDCURVE, dims, srid, e, out);
            push_u32(g.segments.len() as u32, e, out);
            for s in &g.segments {
                write_geometry(&s.clone().into(), None, e, out);
            }
        }
        Geometry::CurvePolygon(g) => {
            write_header(WKB_CURVEPOLYGON, dims, srid, e, out);
            push_u32(g.rings.len() as u32, e, out);
            for ring in &g.rings {
                write_geometry(&ring.clone().into(), None, e, out);
            }
        }
        Geometry::MultiPoint(g) => {
            write_header(WKB_MULTIPOINT, dims, srid, e, out);
            push_u32(g.points.len() as u32, e, out);
            for p in &g.points {
                write_geometry(&Geometry::Point(p.clone()), None, e, out);
            }
        }
        Geometry::MultiLineString(g) => {
            write_header(WKB_MULTILINESTRING, dims, srid, e, out);
            push_u32(g.lines.len() as u32, e, out);
            for l in &g.lines {
                write_geometry(&Geometry::LineString(l.clone()), None, e, out);
            }
        }
        Geometry::MultiCurve(g) => {
            write_header(WKB_MULTICURVE, dims, srid, e, out);
            push_u32(g.curves.len() as u32, e, out);
            for c in &g.curves {
                write_geometry(&c.clone().into(), None, e, out);
            }
        }
        Geometry::MultiPolygon(g) => {
            write_header(WKB_MULTIPOLYGON, dims, srid, e, out);
            push_u32(g.polygons.len() as u32, e, out);
            for p in &g.polygons {
                write_geometry(&Geometry::Polygon(p.clone()), None, e, out);
            }
        }
        Geometry::MultiSurface(g) => {
            write_header(WKB_MULTISURFACE, dims, srid, e, out);
            push_u32(g.surfaces.len() as u32, e, out);
            for s in &g.surfaces {
                write_geometry(&s.clone().into(), None, e, out);
            }
        }
        Geometry::PolyhedralSurface(g) => {
            write_header(WKB_POLYHEDRALSURFACE, dims, srid, e, out);
            push_u32(g.patches.len() as u32, e, out);
            for p in &g.patches {
                write_geometry(&Geometry::Polygon(p.clone()), None, e, out);
            }
        }
        Geometry::Tin(g) => {
            write_header(WKB_TIN, dims, srid, e, out);
            push_u32(g.triangles.len() as u32, e, out);
            for t in &g.triangles {
                write_geometry(&Geometry::Triangle(t.clone()), None, e, out);
            }
        }
        Geometry::GeometryCollection(g) => {
            write_header(WKB_COLLECTION, dims, srid, e, out);
            push_u32(g.geoms.len() as u32, e, out);
            for m in &g.geoms {
                write_geometry(m, None, e, out);
            }
        }
    }
}

struct WkbReader<'a> {
    cur: Cursor<&'a [u8]>,
    checks: Checks,
}

impl WkbReader<'_> {
    fn pos(&self) -> usize {
        self.cur.position() as usize
    }

    fn eof(&self) -> ParseError {
        ParseError::new(ParseErrorKind::InvalidGeom, self.pos(), "unexpected end of input")
    }

    fn u8(&mut self) -> Result<u8, ParseError> {
        self.cur.ioread::<u8>().map_err(|_| self.eof())
    }

    fn u32(&mut self, e: Endian) -> Result<u32, ParseError> {
        self.cur.ioread_with::<u32>(e.ctx()).map_err(|_| self.eof())
    }

    fn i32(&mut self, e: Endian) -> Result<i32, ParseError> {
        self.cur.ioread_with::<i32>(e.ctx()).map_err(|_| self.eof())
    }

    fn f64(&mut self, e: Endian) -> Result<f64, ParseError> {
        self.cur.ioread_with::<f64>(e.ctx()).map_err(|_| self.eof())
    }

    fn read_geometry(&mut self, parent_dims: Option<Dims>) -> Result<Geometry, ParseError> {
        let at = self.pos();
        let endian = match self.u8()? {
            0 => Endian::Big,
            1 => Endian::Little,
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidGeom,
                    at,
                    format!("invalid byte order marker {other}"),
                ))
            }
        };
        let word = self.u32(endian)?;

        let mut has_z = word & WKB_Z != 0;
        let mut has_m = word & WKB_M != 0;
        let has_srid = word & WKB_SRID != 0;
        let mut code = word & !(WKB_Z | WKB_M | WKB_SRID);
        // ISO encodes dimensionality as +1000/+2000/+3000 type offsets.
        if (1000..4000).contains(&code) {
            match code / 1000 {
                1 => has_z = true,
                2 => has_m = true,
                _ => {
                    has_z = true;
                    has_m = true;
                }
            }
            code %= 1000;
        }
        let dims = Dims::new(has_z, has_m);
        if let Some(parent) = parent_dims {
            if parent != dims {
                return Err(ParseError::new(
                    ParseErrorKind::MixedDimensions,
                    at,
                    "sub-geometry dimensionality differs from its parent",
                ));
            }
        }
        let srid = if has_srid {
            match self.i32(endian)? {
                0 => None,
                s => Some(s),
            }
        } else {
            None
        };

        let mut geom = self.read_body(code, dims, endian, at)?;
        geom.set_srid(srid);
        Ok(geom)
    }

    fn read_body(
        &mut self,
        code: u32,
        dims: Dims,
        e: Endian,
        at: usize,
    ) -> Result<Geometry, ParseError> {
        Ok(match code {
            WKB_POINT => {
                let mut ords = [0.0f64; 4];
                for o in ords.iter_mut().take(dims.width()) {
                    *o = self.f64(e)?;
                }
                let mut coords = PointArray::with_capacity(dims, 1);
                if !ords.iter().take(dims.width()).all(|v| v.is_nan()) {
                    coords.append(ordinates_to_point(&ords, dims));
                }
                Geometry::Point(Point::new(coords))
            }
            WKB_LINESTRING => {
                let pa = self.read_pa(dims, e)?;
                if self.checks.min_points && pa.len() == 1 {
                    return Err(ParseError::new(ParseErrorKind::MorePoints, at, "linestring"));
                }
                Geometry::LineString(LineString::new(pa))
            }
            WKB_CIRCULARSTRING => {
                let pa = self.read_pa(dims, e)?;
                self.check_arc(&pa, at)?;
                Geometry::CircularString(CircularString::new(pa))
            }
            WKB_TRIANGLE => {
                let nrings = self.u32(e)? as usize;
                let mut coords = PointArray::new(dims);
                for i in 0..nrings {
                    let ring = self.read_ring(dims, e, at)?;
                    if i == 0 {
                        coords = ring;
                    }
                }
                Geometry::Triangle(Triangle::new(coords))
            }
            WKB_POLYGON => {
                let nrings = self.u32(e)? as usize;
                let mut rings = Vec::with_capacity(nrings.min(1024));
                for _ in 0..nrings {
                    rings.push(self.read_ring(dims, e, at)?);
                }
                let mut poly = Polygon::new(rings);
                poly.dims = dims;
                Geometry::Polygon(poly)
            }
            WKB_COMPOUNDCURVE => {
                let mut g = CompoundCurve::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    g.segments.push(match self.read_geometry(Some(dims))? {
                        Geometry::LineString(l) => CurveSegment::LineString(l),
                        Geometry::CircularString(c) => CurveSegment::CircularString(c),
                        other => return Err(self.bad_child("CompoundCurve", &other, child_at)),
                    });
                }
                check_continuity(&g, at)?;
                Geometry::CompoundCurve(g)
            }
            WKB_CURVEPOLYGON => {
                let mut g = CurvePolygon::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    g.rings.push(match self.read_geometry(Some(dims))? {
                        Geometry::LineString(l) => Curve::LineString(l),
                        Geometry::CircularString(c) => Curve::CircularString(c),
                        Geometry::CompoundCurve(cc) => Curve::CompoundCurve(cc),
                        other => return Err(self.bad_child("CurvePolygon", &other, child_at)),
                    });
                }
                Geometry::CurvePolygon(g)
            }
            WKB_MULTIPOINT => {
                let mut g = MultiPoint::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    match self.read_geometry(Some(dims))? {
                        Geometry::Point(p) => g.points.push(p),
                        other => return Err(self.bad_child("MultiPoint", &other, child_at)),
                    }
                }
                Geometry::MultiPoint(g)
            }
            WKB_MULTILINESTRING => {
                let mut g = MultiLineString::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    match self.read_geometry(Some(dims))? {
                        Geometry::LineString(l) => g.lines.push(l),
                        other => return Err(self.bad_child("MultiLineString", &other, child_at)),
                    }
                }
                Geometry::MultiLineString(g)
            }
            WKB_MULTICURVE => {
                let mut g = MultiCurve::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    g.curves.push(match self.read_geometry(Some(dims))? {
                        Geometry::LineString(l) => Curve::LineString(l),
                        Geometry::CircularString(c) => Curve::CircularString(c),
                        Geometry::CompoundCurve(cc) => Curve::CompoundCurve(cc),
                        other => return Err(self.bad_child("MultiCurve", &other, child_at)),
                    });
                }
                Geometry::MultiCurve(g)
            }
            WKB_MULTIPOLYGON => {
                let mut g = MultiPolygon::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    match self.read_geometry(Some(dims))? {
                        Geometry::Polygon(p) => g.polygons.push(p),
                        other => return Err(self.bad_child("MultiPolygon", &other, child_at)),
                    }
                }
                Geometry::MultiPolygon(g)
            }
            WKB_MULTISURFACE => {
                let mut g = MultiSurface::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    g.surfaces.push(match self.read_geometry(Some(dims))? {
                        Geometry::Polygon(p) => Surface::Polygon(p),
                        Geometry::CurvePolygon(cp) => Surface::CurvePolygon(cp),
                        other => return Err(self.bad_child("MultiSurface", &other, child_at)),
                    });
                }
                Geometry::MultiSurface(g)
            }
            WKB_POLYHEDRALSURFACE => {
                let mut g = PolyhedralSurface::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    match self.read_geometry(Some(dims))? {
                        Geometry::Polygon(p) => g.patches.push(p),
                        other => return Err(self.bad_child("PolyhedralSurface", &other, child_at)),
                    }
                }
                Geometry::PolyhedralSurface(g)
            }
            WKB_TIN => {
                let mut g = Tin::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    let child_at = self.pos();
                    match self.read_geometry(Some(dims))? {
                        Geometry::Triangle(t) => g.triangles.push(t),
                        other => return Err(self.bad_child("Tin", &other, child_at)),
                    }
                }
                Geometry::Tin(g)
            }
            WKB_COLLECTION => {
                let mut g = GeometryCollection::empty(dims);
                let n = self.u32(e)? as usize;
                for _ in 0..n {
                    g.geoms.push(self.read_geometry(Some(dims))?);
                }
                Geometry::GeometryCollection(g)
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidWkbType,
                    at,
                    format!("unknown type code {other}"),
                ))
            }
        })
    }

    fn bad_child(&self, parent: &str, child: &Geometry, at: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidWkbType,
            at,
            format!("{parent} may not contain {}", child.geom_type().name()),
        )
    }

    fn read_pa(&mut self, dims: Dims, e: Endian) -> Result<PointArray, ParseError> {
        let n = self.u32(e)? as usize;
        let mut pa = PointArray::with_capacity(dims, n.min(65536));
        let mut ords = [0.0f64; 4];
        for _ in 0..n {
            for o in ords.iter_mut().take(dims.width()) {
                *o = self.f64(e)?;
            }
            pa.append(ordinates_to_point(&ords, dims));
        }
        Ok(pa)
    }

    fn read_ring(&mut self, dims: Dims, e: Endian, at: usize) -> Result<PointArray, ParseError> {
        let pa = self.read_pa(dims, e)?;
        if self.checks.min_points && !pa.is_empty() && pa.len() < 4 {
            return Err(ParseError::new(ParseErrorKind::MorePoints, at, "ring"));
        }
        if self.checks.closure && !pa.is_empty() && !pa.is_closed_2d() {
            return Err(ParseError::new(ParseErrorKind::Unclosed, at, "ring"));
        }
        Ok(pa)
    }

    fn check_arc(&self, pa: &PointArray, at: usize) -> Result<(), ParseError> {
        if self.checks.min_points && !pa.is_empty() && pa.len() < 3 {
            return Err(ParseError::new(ParseErrorKind::MorePoints, at, "circularstring"));
        }
        if self.checks.odd_points && !pa.is_empty() && pa.len() % 2 == 0 {
            return Err(ParseError::new(ParseErrorKind::OddPoints, at, "circularstring"));
        }
        Ok(())
    }
}

fn check_continuity(g: &CompoundCurve, at: usize) -> Result<(), ParseError> {
    if g.is_continuous() {
        Ok(())
    } else {
        Err(ParseError::new(
            ParseErrorKind::Incontinuous,
            at,
            "compound curve segments do not join",
        ))
    }
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
