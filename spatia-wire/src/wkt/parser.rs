use spatia_types::{
    CircularString, CompoundCurve, Curve, CurvePolygon, CurveSegment, Dims, Geometry,
    GeometryCollection, GeometryType, LineString, MultiCurve, MultiLineString, MultiPoint,
    MultiPolygon, MultiSurface, Point, Point4, PointArray, Polygon, PolyhedralSurface, Surface,
    Tin, Triangle,
};

use super::tokenizer::{Token, Tokenizer};
use crate::{Checks, ParseError, ParseErrorKind};

/// Parse WKT/EWKT text into a geometry.
///
/// The first point seen establishes the dimensionality unless `Z`/`M`/`ZM`
/// markers declare it; every later point must agree. `checks` selects the
/// optional validations; failures carry the byte offset of the offending
/// construct.
pub fn parse_wkt(text: &str, checks: Checks) -> Result<Geometry, ParseError> {
    let mut p = Parser {
        toks: Tokenizer::new(text),
        checks,
        dims: None,
    };
    let srid = p.parse_srid_prefix()?;
    let mut geom = p.parse_geometry()?;
    if let Some((_, at)) = p.toks.next()? {
        return Err(ParseError::new(
            ParseErrorKind::InvalidGeom,
            at,
            "trailing content after geometry",
        ));
    }
    geom.set_srid(srid);
    Ok(geom)
}

struct Parser<'a> {
    toks: Tokenizer<'a>,
    checks: Checks,
    /// The established dimensionality, shared by every nested point.
    dims: Option<Dims>,
}

impl Parser<'_> {
    fn parse_srid_prefix(&mut self) -> Result<Option<i32>, ParseError> {
        match self.toks.peek()? {
            Some((Token::Word(w), _)) if w == "SRID" => {}
            _ => return Ok(None),
        }
        self.toks.next()?;
        self.expect(Token::Eq, "'='")?;
        let (srid, at) = match self.toks.next()? {
            Some((Token::Number(n), at)) => (n, at),
            other => return Err(self.unexpected(other, "an SRID value")),
        };
        self.expect(Token::Semicolon, "';'")?;
        if srid.fract() != 0.0 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidGeom,
                at,
                "SRID must be an integer",
            ));
        }
        let srid = srid as i32;
        Ok(if srid == 0 { None } else { Some(srid) })
    }

    fn parse_geometry(&mut self) -> Result<Geometry, ParseError> {
        let (word, at) = match self.toks.next()? {
            Some((Token::Word(w), at)) => (w, at),
            other => return Err(self.unexpected(other, "a geometry type")),
        };
        let (gtype, mut declared) = split_type(&word).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidWkbType,
                at,
                format!("unknown geometry type {word:?}"),
            )
        })?;
        // A standalone dimensionality word may follow the type name.
        if let Some((Token::Word(w), wat)) = self.peek_cloned()? {
            let dims = match w.as_str() {
                "Z" => Some(Dims::XYZ),
                "M" => Some(Dims::XYM),
                "ZM" => Some(Dims::XYZM),
                _ => None,
            };
            if let Some(d) = dims {
                if declared.is_some() {
                    return Err(ParseError::new(
                        ParseErrorKind::MixedDimensions,
                        wat,
                        "dimensionality declared twice",
                    ));
                }
                self.toks.next()?;
                declared = Some(d);
            }
        }
        if let Some(d) = declared {
            self.declare_dims(d, at)?;
        }

        match self.toks.next()? {
            Some((Token::Word(w), _)) if w == "EMPTY" => {
                Ok(empty_geometry(gtype, self.current_dims()))
            }
            Some((Token::LParen, _)) => self.parse_body(gtype, at),
            other => Err(self.unexpected(other, "EMPTY or '('")),
        }
    }

    fn parse_body(&mut self, gtype: GeometryType, at: usize) -> Result<Geometry, ParseError> {
        Ok(match gtype {
            GeometryType::Point => {
                let p = self.parse_coord()?;
                self.expect(Token::RParen, "')'")?;
                Geometry::Point(Point::new(PointArray::from_points(self.current_dims(), &[p])))
            }
            GeometryType::LineString => {
                let pa = self.parse_coord_list()?;
                self.check_line(&pa, at)?;
                Geometry::LineString(LineString::new(pa))
            }
            GeometryType::CircularString => {
                let pa = self.parse_coord_list()?;
                self.check_arc(&pa, at)?;
                Geometry::CircularString(CircularString::new(pa))
            }
            GeometryType::Triangle => {
                let (ring, rat) = self.parse_chain_parens()?;
                self.check_ring(&ring, rat)?;
                self.expect(Token::RParen, "')'")?;
                Geometry::Triangle(Triangle::new(ring))
            }
            GeometryType::Polygon => {
                let rings = self.parse_rings()?;
                let mut poly = Polygon::new(rings);
                poly.dims = self.current_dims();
                Geometry::Polygon(poly)
            }
            GeometryType::CompoundCurve => {
                let mut g = CompoundCurve::empty(self.current_dims());
                loop {
                    let seg_at = self.toks.offset();
                    let seg = match self.peek_cloned()? {
                        Some((Token::LParen, _)) => {
                            let (pa, cat) = self.parse_chain_parens()?;
                            self.check_line(&pa, cat)?;
                            CurveSegment::LineString(LineString::new(pa))
                        }
                        _ => match self.parse_geometry()? {
                            Geometry::LineString(l) => CurveSegment::LineString(l),
                            Geometry::CircularString(c) => CurveSegment::CircularString(c),
                            other => {
                                return Err(self.bad_member("COMPOUNDCURVE", &other, seg_at))
                            }
                        },
                    };
                    g.segments.push(seg);
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                g.dims = self.current_dims();
                if !g.is_continuous() {
                    return Err(ParseError::new(
                        ParseErrorKind::Incontinuous,
                        at,
                        "compound curve segments do not join",
                    ));
                }
                Geometry::CompoundCurve(g)
            }
            GeometryType::CurvePolygon => {
                let mut g = CurvePolygon::empty(self.current_dims());
                loop {
                    let ring_at = self.toks.offset();
                    let ring = match self.peek_cloned()? {
                        Some((Token::LParen, _)) => {
                            let (pa, rat) = self.parse_chain_parens()?;
                            self.check_ring(&pa, rat)?;
                            Curve::LineString(LineString::new(pa))
                        }
                        _ => match self.parse_geometry()? {
                            Geometry::LineString(l) => Curve::LineString(l),
                            Geometry::CircularString(c) => Curve::CircularString(c),
                            Geometry::CompoundCurve(cc) => Curve::CompoundCurve(cc),
                            other => return Err(self.bad_member("CURVEPOLYGON", &other, ring_at)),
                        },
                    };
                    self.check_curve_ring(&ring, ring_at)?;
                    g.rings.push(ring);
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                g.dims = self.current_dims();
                Geometry::CurvePolygon(g)
            }
            GeometryType::MultiPoint => {
                let mut points = Vec::new();
                loop {
                    match self.peek_cloned()? {
                        Some((Token::Word(w), _)) if w == "EMPTY" => {
                            self.toks.next()?;
                            points.push(Point::empty(self.current_dims()));
                        }
                        Some((Token::LParen, _)) => {
                            self.toks.next()?;
                            let p = self.parse_coord()?;
                            self.expect(Token::RParen, "')'")?;
                            points.push(Point::new(PointArray::from_points(
                                self.current_dims(),
                                &[p],
                            )));
                        }
                        _ => {
                            let p = self.parse_coord()?;
                            points.push(Point::new(PointArray::from_points(
                                self.current_dims(),
                                &[p],
                            )));
                        }
                    }
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = MultiPoint::new(points);
                g.dims = self.current_dims();
                Geometry::MultiPoint(g)
            }
            GeometryType::MultiLineString => {
                let mut lines = Vec::new();
                loop {
                    match self.peek_cloned()? {
                        Some((Token::Word(w), _)) if w == "EMPTY" => {
                            self.toks.next()?;
                            lines.push(LineString::empty(self.current_dims()));
                        }
                        _ => {
                            let (pa, cat) = self.parse_chain_parens()?;
                            self.check_line(&pa, cat)?;
                            lines.push(LineString::new(pa));
                        }
                    }
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = MultiLineString::new(lines);
                g.dims = self.current_dims();
                Geometry::MultiLineString(g)
            }
            GeometryType::MultiCurve => {
                let mut curves = Vec::new();
                loop {
                    let member_at = self.toks.offset();
                    match self.peek_cloned()? {
                        Some((Token::Word(w), _)) if w == "EMPTY" => {
                            self.toks.next()?;
                            curves.push(Curve::LineString(LineString::empty(self.current_dims())));
                        }
                        Some((Token::LParen, _)) => {
                            let (pa, cat) = self.parse_chain_parens()?;
                            self.check_line(&pa, cat)?;
                            curves.push(Curve::LineString(LineString::new(pa)));
                        }
                        _ => match self.parse_geometry()? {
                            Geometry::LineString(l) => curves.push(Curve::LineString(l)),
                            Geometry::CircularString(c) => curves.push(Curve::CircularString(c)),
                            Geometry::CompoundCurve(cc) => curves.push(Curve::CompoundCurve(cc)),
                            other => return Err(self.bad_member("MULTICURVE", &other, member_at)),
                        },
                    }
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = MultiCurve::new(curves);
                g.dims = self.current_dims();
                Geometry::MultiCurve(g)
            }
            GeometryType::MultiPolygon => {
                let mut polygons = Vec::new();
                loop {
                    match self.peek_cloned()? {
                        Some((Token::Word(w), _)) if w == "EMPTY" => {
                            self.toks.next()?;
                            polygons.push(Polygon::empty(self.current_dims()));
                        }
                        _ => {
                            self.expect(Token::LParen, "'('")?;
                            let rings = self.parse_rings()?;
                            let mut poly = Polygon::new(rings);
                            poly.dims = self.current_dims();
                            polygons.push(poly);
                        }
                    }
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = MultiPolygon::new(polygons);
                g.dims = self.current_dims();
                Geometry::MultiPolygon(g)
            }
            GeometryType::MultiSurface => {
                let mut surfaces = Vec::new();
                loop {
                    let member_at = self.toks.offset();
                    match self.peek_cloned()? {
                        Some((Token::Word(w), _)) if w == "EMPTY" => {
                            self.toks.next()?;
                            surfaces.push(Surface::Polygon(Polygon::empty(self.current_dims())));
                        }
                        Some((Token::LParen, _)) => {
                            self.toks.next()?;
                            let rings = self.parse_rings()?;
                            let mut poly = Polygon::new(rings);
                            poly.dims = self.current_dims();
                            surfaces.push(Surface::Polygon(poly));
                        }
                        _ => match self.parse_geometry()? {
                            Geometry::Polygon(p) => surfaces.push(Surface::Polygon(p)),
                            Geometry::CurvePolygon(cp) => surfaces.push(Surface::CurvePolygon(cp)),
                            other => {
                                return Err(self.bad_member("MULTISURFACE", &other, member_at))
                            }
                        },
                    }
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = MultiSurface::new(surfaces);
                g.dims = self.current_dims();
                Geometry::MultiSurface(g)
            }
            GeometryType::PolyhedralSurface => {
                let mut patches = Vec::new();
                loop {
                    self.expect(Token::LParen, "'('")?;
                    let rings = self.parse_rings()?;
                    let mut poly = Polygon::new(rings);
                    poly.dims = self.current_dims();
                    patches.push(poly);
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = PolyhedralSurface::new(patches);
                g.dims = self.current_dims();
                Geometry::PolyhedralSurface(g)
            }
            GeometryType::Tin => {
                let mut triangles = Vec::new();
                loop {
                    self.expect(Token::LParen, "'('")?;
                    let (ring, rat) = self.parse_chain_parens()?;
                    self.check_ring(&ring, rat)?;
                    self.expect(Token::RParen, "')'")?;
                    triangles.push(Triangle::new(ring));
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = Tin::new(triangles);
                g.dims = self.current_dims();
                Geometry::Tin(g)
            }
            GeometryType::GeometryCollection => {
                let mut geoms = Vec::new();
                loop {
                    geoms.push(self.parse_geometry()?);
                    if !self.eat(Token::Comma)? {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let mut g = GeometryCollection::new(geoms);
                g.dims = self.current_dims();
                Geometry::GeometryCollection(g)
            }
        })
    }

    /// `( p, p, ... )` including both parens; returns the payload and the
    /// byte offset of the opening paren.
    fn parse_chain_parens(&mut self) -> Result<(PointArray, usize), ParseError> {
        let at = self.expect(Token::LParen, "'('")?;
        let pa = self.parse_coord_list()?;
        Ok((pa, at))
    }

    /// Coordinates separated by commas, consuming the closing paren.
    fn parse_coord_list(&mut self) -> Result<PointArray, ParseError> {
        let mut pts = Vec::new();
        loop {
            pts.push(self.parse_coord()?);
            if !self.eat(Token::Comma)? {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(PointArray::from_points(self.current_dims(), &pts))
    }

    /// `( (ring), (ring), ... )` with the outer opening paren already
    /// consumed; consumes the outer closing paren.
    fn parse_rings(&mut self) -> Result<Vec<PointArray>, ParseError> {
        let mut rings = Vec::new();
        loop {
            let (ring, rat) = self.parse_chain_parens()?;
            self.check_ring(&ring, rat)?;
            rings.push(ring);
            if !self.eat(Token::Comma)? {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(rings)
    }

    fn parse_coord(&mut self) -> Result<Point4, ParseError> {
        let (first, at) = match self.toks.next()? {
            Some((Token::Number(n), at)) => (n, at),
            other => return Err(self.unexpected(other, "a coordinate")),
        };
        let mut ords = vec![first];
        while let Some((Token::Number(_), _)) = self.toks.peek()? {
            if let Some((Token::Number(n), nat)) = self.toks.next()? {
                if ords.len() == 4 {
                    return Err(ParseError::new(
                        ParseErrorKind::InvalidGeom,
                        nat,
                        "too many ordinates",
                    ));
                }
                ords.push(n);
            }
        }
        self.resolve_point(&ords, at)
    }

    fn resolve_point(&mut self, ords: &[f64], at: usize) -> Result<Point4, ParseError> {
        if ords.len() < 2 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidGeom,
                at,
                "a point needs at least two ordinates",
            ));
        }
        let dims = match self.dims {
            Some(d) => {
                if ords.len() != d.width() {
                    return Err(ParseError::new(
                        ParseErrorKind::MixedDimensions,
                        at,
                        format!("expected {} ordinates, found {}", d.width(), ords.len()),
                    ));
                }
                d
            }
            None => {
                let d = match ords.len() {
                    2 => Dims::XY,
                    3 => Dims::XYZ,
                    _ => Dims::XYZM,
                };
                self.dims = Some(d);
                d
            }
        };
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
        Ok(p)
    }

    fn declare_dims(&mut self, d: Dims, at: usize) -> Result<(), ParseError> {
        match self.dims {
            Some(existing) if existing != d => Err(ParseError::new(
                ParseErrorKind::MixedDimensions,
                at,
                format!("{} geometry inside {} context", d, existing),
            )),
            _ => {
                self.dims = Some(d);
                Ok(())
            }
        }
    }

    fn current_dims(&self) -> Dims {
        self.dims.unwrap_or(Dims::XY)
    }

    fn check_line(&self, pa: &PointArray, at: usize) -> Result<(), ParseError> {
        if self.checks.min_points && pa.len() == 1 {
            return Err(ParseError::new(ParseErrorKind::MorePoints, at, "linestring"));
        }
        Ok(())
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

    fn check_ring(&self, pa: &PointArray, at: usize) -> Result<(), ParseError> {
        if self.checks.min_points && !pa.is_empty() && pa.len() < 4 {
            return Err(ParseError::new(ParseErrorKind::MorePoints, at, "ring"));
        }
        if self.checks.closure && !pa.is_empty() && !pa.is_closed_2d() {
            return Err(ParseError::new(ParseErrorKind::Unclosed, at, "ring"));
        }
        Ok(())
    }

    /// Ring closure for the curved ring kinds, which check_ring does not
    /// see as a single point array.
    fn check_curve_ring(&self, ring: &Curve, at: usize) -> Result<(), ParseError> {
        if !self.checks.closure {
            return Ok(());
        }
        let (first, last) = match ring {
            Curve::LineString(g) => (g.coords.first(), g.coords.last()),
            Curve::CircularString(g) => (g.coords.first(), g.coords.last()),
            Curve::CompoundCurve(g) => (
                g.segments.first().and_then(|s| s.coords().first()),
                g.segments.last().and_then(|s| s.coords().last()),
            ),
        };
        match (first, last) {
            (Some(f), Some(l)) if f.x != l.x || f.y != l.y => {
                Err(ParseError::new(ParseErrorKind::Unclosed, at, "ring"))
            }
            _ => Ok(()),
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<usize, ParseError> {
        match self.toks.next()? {
            Some((t, at)) if t == token => Ok(at),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn eat(&mut self, token: Token) -> Result<bool, ParseError> {
        if let Some((t, _)) = self.toks.peek()? {
            if *t == token {
                self.toks.next()?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn peek_cloned(&mut self) -> Result<Option<(Token, usize)>, ParseError> {
        Ok(self.toks.peek()?.cloned())
    }

    fn unexpected(&mut self, got: Option<(Token, usize)>, wanted: &str) -> ParseError {
        match got {
            Some((t, at)) => ParseError::new(
                ParseErrorKind::InvalidGeom,
                at,
                format!("expected {wanted}, found {t:?}"),
            ),
            None => ParseError::new(
                ParseErrorKind::InvalidGeom,
                self.toks.offset(),
                format!("expected {wanted}, found end of input"),
            ),
        }
    }

    fn bad_member(&self, parent: &str, child: &Geometry, at: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidGeom,
            at,
            format!("{parent} may not contain {}", child.geom_type().name()),
        )
    }
}

fn type_from_name(word: &str) -> Option<GeometryType> {
    Some(match word {
        "POINT" => GeometryType::Point,
        "LINESTRING" => GeometryType::LineString,
        "CIRCULARSTRING" => GeometryType::CircularString,
        "COMPOUNDCURVE" => GeometryType::CompoundCurve,
        "TRIANGLE" => GeometryType::Triangle,
        "POLYGON" => GeometryType::Polygon,
        "CURVEPOLYGON" => GeometryType::CurvePolygon,
        "MULTIPOINT" => GeometryType::MultiPoint,
        "MULTILINESTRING" => GeometryType::MultiLineString,
        "MULTICURVE" => GeometryType::MultiCurve,
        "MULTIPOLYGON" => GeometryType::MultiPolygon,
        "MULTISURFACE" => GeometryType::MultiSurface,
        "POLYHEDRALSURFACE" => GeometryType::PolyhedralSurface,
        "TIN" => GeometryType::Tin,
        "GEOMETRYCOLLECTION" => GeometryType::GeometryCollection,
        _ => return None,
    })
}

/// Resolve a type word, peeling a trailing `Z`/`M`/`ZM` dimensionality
/// suffix (`POINTM`, `LINESTRINGZM`, ...).
fn split_type(word: &str) -> Option<(GeometryType, Option<Dims>)> {
    if let Some(t) = type_from_name(word) {
        return Some((t, None));
    }
    if let Some(base) = word.strip_suffix("ZM") {
        if let Some(t) = type_from_name(base) {
            return Some((t, Some(Dims::XYZM)));
        }
    }
    if let Some(base) = word.strip_suffix('Z') {
        if let Some(t) = type_from_name(base) {
            return Some((t, Some(Dims::XYZ)));
        }
    }
    if let Some(base) = word.strip_suffix('M') {
        if let Some(t) = type_from_name(base) {
            return Some((t, Some(Dims::XYM)));
        }
    }
    None
}

fn empty_geometry(gtype: GeometryType, dims: Dims) -> Geometry {
    match gtype {
        GeometryType::Point => Geometry::Point(Point::empty(dims)),
        GeometryType::LineString => Geometry::LineString(LineString::empty(dims)),
        GeometryType::CircularString => Geometry::CircularString(CircularString::empty(dims)),
        GeometryType::CompoundCurve => Geometry::CompoundCurve(CompoundCurve::empty(dims)),
        GeometryType::Triangle => Geometry::Triangle(Triangle::empty(dims)),
        GeometryType::Polygon => Geometry::Polygon(Polygon::empty(dims)),
        GeometryType::CurvePolygon => Geometry::CurvePolygon(CurvePolygon::empty(dims)),
        GeometryType::MultiPoint => Geometry::MultiPoint(MultiPoint::empty(dims)),
        GeometryType::MultiLineString => {
            Geometry::MultiLineString(MultiLineString::empty(dims))
        }
        GeometryType::MultiCurve => Geometry::MultiCurve(MultiCurve::empty(dims)),
        GeometryType::MultiPolygon => Geometry::MultiPolygon(MultiPolygon::empty(dims)),
        GeometryType::MultiSurface => Geometry::MultiSurface(MultiSurface::empty(dims)),
        GeometryType::PolyhedralSurface => {
            Geometry::PolyhedralSurface(PolyhedralSurface::empty(dims))
        }
        GeometryType::Tin => Geometry::Tin(Tin::empty(dims)),
        GeometryType::GeometryCollection => {
            Geometry::GeometryCollection(GeometryCollection::empty(dims))
        }
    }
}
