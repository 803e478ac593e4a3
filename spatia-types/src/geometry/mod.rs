pub(crate) mod curve;
pub(crate) mod geometry_collection;
pub(crate) mod line_string;
pub(crate) mod multi_line_string;
pub(crate) mod multi_point;
pub(crate) mod multi_polygon;
pub(crate) mod point;
pub(crate) mod polygon;
pub(crate) mod surface;

pub use curve::{
    CircularString, CompoundCurve, Curve, CurvePolygon, CurveSegment, MultiCurve, MultiSurface,
    Surface,
};
pub use geometry_collection::GeometryCollection;
pub use line_string::LineString;
pub use multi_line_string::MultiLineString;
pub use multi_point::MultiPoint;
pub use multi_polygon::MultiPolygon;
pub use point::Point;
pub use polygon::Polygon;
pub use surface::{PolyhedralSurface, Tin, Triangle};

use crate::{Bbox, Dims, Point4, PointArray};

/// The tag of a [`Geometry`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeometryType {
    Point,
    LineString,
    CircularString,
    CompoundCurve,
    Triangle,
    Polygon,
    CurvePolygon,
    MultiPoint,
    MultiLineString,
    MultiCurve,
    MultiPolygon,
    MultiSurface,
    PolyhedralSurface,
    Tin,
    GeometryCollection,
}

impl GeometryType {
    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::CircularString => "CircularString",
            GeometryType::CompoundCurve => "CompoundCurve",
            GeometryType::Triangle => "Triangle",
            GeometryType::Polygon => "Polygon",
            GeometryType::CurvePolygon => "CurvePolygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiCurve => "MultiCurve",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::MultiSurface => "MultiSurface",
            GeometryType::PolyhedralSurface => "PolyhedralSurface",
            GeometryType::Tin => "Tin",
            GeometryType::GeometryCollection => "GeometryCollection",
        }
    }

    /// True for the variants that own sub-geometries rather than a single
    /// coordinate payload.
    pub fn is_collection(self) -> bool {
        matches!(
            self,
            GeometryType::CompoundCurve
                | GeometryType::CurvePolygon
                | GeometryType::MultiPoint
                | GeometryType::MultiLineString
                | GeometryType::MultiCurve
                | GeometryType::MultiPolygon
                | GeometryType::MultiSurface
                | GeometryType::PolyhedralSurface
                | GeometryType::Tin
                | GeometryType::GeometryCollection
        )
    }
}

/// Any geometry value.
///
/// Every variant owns its payload; cloning is deep, and dropping a
/// geometry frees everything it owns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    CircularString(CircularString),
    CompoundCurve(CompoundCurve),
    Triangle(Triangle),
    Polygon(Polygon),
    CurvePolygon(CurvePolygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiCurve(MultiCurve),
    MultiPolygon(MultiPolygon),
    MultiSurface(MultiSurface),
    PolyhedralSurface(PolyhedralSurface),
    Tin(Tin),
    GeometryCollection(GeometryCollection),
}

macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Geometry::Point($g) => $body,
            Geometry::LineString($g) => $body,
            Geometry::CircularString($g) => $body,
            Geometry::CompoundCurve($g) => $body,
            Geometry::Triangle($g) => $body,
            Geometry::Polygon($g) => $body,
            Geometry::CurvePolygon($g) => $body,
            Geometry::MultiPoint($g) => $body,
            Geometry::MultiLineString($g) => $body,
            Geometry::MultiCurve($g) => $body,
            Geometry::MultiPolygon($g) => $body,
            Geometry::MultiSurface($g) => $body,
            Geometry::PolyhedralSurface($g) => $body,
            Geometry::Tin($g) => $body,
            Geometry::GeometryCollection($g) => $body,
        }
    };
}

impl Geometry {
    pub fn geom_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::CircularString(_) => GeometryType::CircularString,
            Geometry::CompoundCurve(_) => GeometryType::CompoundCurve,
            Geometry::Triangle(_) => GeometryType::Triangle,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::CurvePolygon(_) => GeometryType::CurvePolygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiCurve(_) => GeometryType::MultiCurve,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::MultiSurface(_) => GeometryType::MultiSurface,
            Geometry::PolyhedralSurface(_) => GeometryType::PolyhedralSurface,
            Geometry::Tin(_) => GeometryType::Tin,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
        }
    }

    pub fn dims(&self) -> Dims {
        dispatch!(self, g => g.dims())
    }

    pub fn has_z(&self) -> bool {
        self.dims().has_z
    }

    pub fn has_m(&self) -> bool {
        self.dims().has_m
    }

    /// Ordinates per point: 2, 3 or 4.
    pub fn ndims(&self) -> usize {
        self.dims().width()
    }

    pub fn srid(&self) -> Option<i32> {
        dispatch!(self, g => g.srid)
    }

    pub fn set_srid(&mut self, srid: Option<i32>) {
        dispatch!(self, g => g.srid = srid)
    }

    pub fn bbox(&self) -> Option<&Bbox> {
        dispatch!(self, g => g.bbox.as_ref())
    }

    /// Compute and cache the bounding box; a no-op when one is already
    /// cached or the geometry is empty.
    pub fn add_bbox(&mut self) {
        if self.bbox().is_some() {
            return;
        }
        let bbox = self.compute_bbox();
        dispatch!(self, g => g.bbox = bbox);
    }

    pub fn drop_bbox(&mut self) {
        dispatch!(self, g => g.bbox = None)
    }

    /// Signal that the coordinates were mutated: any cached bounding box
    /// is no longer trustworthy and is discarded.
    pub fn changed(&mut self) {
        self.drop_bbox();
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, g => g.is_empty())
    }

    pub fn is_collection(&self) -> bool {
        self.geom_type().is_collection()
    }

    pub fn count_vertices(&self) -> usize {
        self.point_arrays().iter().map(|pa| pa.len()).sum()
    }

    /// Topological dimension: 0 for point-like, 1 for line-like, 2 for
    /// surface-like variants; the maximum over members for a collection
    /// (`None` for a memberless collection).
    pub fn dimension(&self) -> Option<u8> {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => Some(0),
            Geometry::LineString(_)
            | Geometry::CircularString(_)
            | Geometry::CompoundCurve(_)
            | Geometry::MultiLineString(_)
            | Geometry::MultiCurve(_) => Some(1),
            Geometry::Triangle(_)
            | Geometry::Polygon(_)
            | Geometry::CurvePolygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::MultiSurface(_)
            | Geometry::PolyhedralSurface(_)
            | Geometry::Tin(_) => Some(2),
            Geometry::GeometryCollection(g) => {
                g.geoms.iter().filter_map(Geometry::dimension).max()
            }
        }
    }

    /// Every coordinate sequence in the geometry, depth first.
    pub fn point_arrays(&self) -> Vec<&PointArray> {
        let mut out = Vec::new();
        collect_point_arrays(self, &mut out);
        out
    }

    pub fn point_arrays_mut(&mut self) -> Vec<&mut PointArray> {
        let mut out = Vec::new();
        collect_point_arrays_mut(self, &mut out);
        out
    }

    /// Every vertex of the geometry in depth-first order, in canonical
    /// four-ordinate form.
    pub fn points(&self) -> impl Iterator<Item = Point4> + '_ {
        self.point_arrays().into_iter().flat_map(|pa| pa.iter())
    }

    /// The planar bounding box over all vertices; `None` when empty.
    pub fn compute_box2d(&self) -> Option<Bbox> {
        self.compute_bbox().map(Bbox::to2d)
    }

    /// The bounding box over the geometry's own dimensionality (Z range
    /// included for XYZ/XYZM); `None` when empty.
    pub fn compute_bbox(&self) -> Option<Bbox> {
        let mut acc: Option<Bbox> = None;
        for pa in self.point_arrays() {
            if let Some(b) = pa.compute_bbox() {
                match &mut acc {
                    Some(whole) => whole.merge(&b),
                    None => acc = Some(b),
                }
            }
        }
        acc
    }

    /// Structural equality: same variant, same Z/M layout, same cached
    /// boxes when both carry one, and bitwise-equal coordinates. Members
    /// of collection variants match without regard to order.
    pub fn same(&self, other: &Geometry) -> bool {
        match (self, other) {
            (Geometry::Point(a), Geometry::Point(b)) => a.same(b),
            (Geometry::LineString(a), Geometry::LineString(b)) => a.same(b),
            (Geometry::CircularString(a), Geometry::CircularString(b)) => a.same(b),
            (Geometry::CompoundCurve(a), Geometry::CompoundCurve(b)) => a.same(b),
            (Geometry::Triangle(a), Geometry::Triangle(b)) => a.same(b),
            (Geometry::Polygon(a), Geometry::Polygon(b)) => a.same(b),
            (Geometry::CurvePolygon(a), Geometry::CurvePolygon(b)) => a.same(b),
            (Geometry::MultiPoint(a), Geometry::MultiPoint(b)) => a.same(b),
            (Geometry::MultiLineString(a), Geometry::MultiLineString(b)) => a.same(b),
            (Geometry::MultiCurve(a), Geometry::MultiCurve(b)) => a.same(b),
            (Geometry::MultiPolygon(a), Geometry::MultiPolygon(b)) => a.same(b),
            (Geometry::MultiSurface(a), Geometry::MultiSurface(b)) => a.same(b),
            (Geometry::PolyhedralSurface(a), Geometry::PolyhedralSurface(b)) => a.same(b),
            (Geometry::Tin(a), Geometry::Tin(b)) => a.same(b),
            (Geometry::GeometryCollection(a), Geometry::GeometryCollection(b)) => a.same(b),
            _ => false,
        }
    }

    /// Reverse the point order of every line and every polygon ring;
    /// points are untouched.
    pub fn reverse(&mut self) {
        match self {
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
            Geometry::LineString(g) => g.coords.reverse(),
            Geometry::CircularString(g) => g.coords.reverse(),
            Geometry::Triangle(g) => g.coords.reverse(),
            Geometry::Polygon(g) => g.rings.iter_mut().for_each(PointArray::reverse),
            Geometry::CompoundCurve(g) => reverse_compound(g),
            Geometry::CurvePolygon(g) => g.rings.iter_mut().for_each(reverse_curve),
            Geometry::MultiLineString(g) => {
                g.lines.iter_mut().for_each(|l| l.coords.reverse())
            }
            Geometry::MultiCurve(g) => g.curves.iter_mut().for_each(reverse_curve),
            Geometry::MultiPolygon(g) => g
                .polygons
                .iter_mut()
                .for_each(|p| p.rings.iter_mut().for_each(PointArray::reverse)),
            Geometry::MultiSurface(g) => g.surfaces.iter_mut().for_each(reverse_surface),
            Geometry::PolyhedralSurface(g) => g
                .patches
                .iter_mut()
                .for_each(|p| p.rings.iter_mut().for_each(PointArray::reverse)),
            Geometry::Tin(g) => g.triangles.iter_mut().for_each(|t| t.coords.reverse()),
            Geometry::GeometryCollection(g) => g.geoms.iter_mut().for_each(Geometry::reverse),
        }
    }

    /// Make every polygon ring obey the right-hand rule (exterior
    /// clockwise, interiors counter-clockwise). Non-polygonal variants are
    /// untouched.
    pub fn force_rhr(&mut self) {
        match self {
            Geometry::Polygon(g) => g.force_rhr(),
            Geometry::MultiPolygon(g) => g.polygons.iter_mut().for_each(Polygon::force_rhr),
            Geometry::PolyhedralSurface(g) => g.patches.iter_mut().for_each(Polygon::force_rhr),
            Geometry::GeometryCollection(g) => g.geoms.iter_mut().for_each(Geometry::force_rhr),
            _ => {}
        }
    }

    /// Apply [`PointArray::longitude_shift`] to every coordinate sequence.
    pub fn longitude_shift(&mut self) {
        for pa in self.point_arrays_mut() {
            pa.longitude_shift();
        }
        self.changed();
    }

    /// Shift every vertex by `(dx, dy)` in the plane.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for pa in self.point_arrays_mut() {
            pa.translate(dx, dy);
        }
        self.changed();
    }

    /// A copy in which no straight segment is longer than `max_length` in
    /// the plane. Points are cloned; curved variants are cloned unchanged
    /// (arc subdivision is the business of a linearizer, not this
    /// routine).
    pub fn segmentize2d(&self, max_length: f64) -> Geometry {
        match self {
            Geometry::LineString(g) => Geometry::LineString(LineString {
                srid: g.srid,
                bbox: g.bbox,
                coords: g.coords.segmentize2d(max_length),
            }),
            Geometry::Polygon(g) => Geometry::Polygon(Polygon {
                srid: g.srid,
                bbox: g.bbox,
                dims: g.dims,
                rings: g.rings.iter().map(|r| r.segmentize2d(max_length)).collect(),
            }),
            Geometry::MultiLineString(g) => Geometry::MultiLineString(MultiLineString {
                srid: g.srid,
                bbox: g.bbox,
                dims: g.dims,
                lines: g
                    .lines
                    .iter()
                    .map(|l| LineString {
                        srid: l.srid,
                        bbox: l.bbox,
                        coords: l.coords.segmentize2d(max_length),
                    })
                    .collect(),
            }),
            Geometry::MultiPolygon(g) => Geometry::MultiPolygon(MultiPolygon {
                srid: g.srid,
                bbox: g.bbox,
                dims: g.dims,
                polygons: g
                    .polygons
                    .iter()
                    .map(|p| Polygon {
                        srid: p.srid,
                        bbox: p.bbox,
                        dims: p.dims,
                        rings: p.rings.iter().map(|r| r.segmentize2d(max_length)).collect(),
                    })
                    .collect(),
            }),
            Geometry::GeometryCollection(g) => Geometry::GeometryCollection(GeometryCollection {
                srid: g.srid,
                bbox: g.bbox,
                dims: g.dims,
                geoms: g.geoms.iter().map(|m| m.segmentize2d(max_length)).collect(),
            }),
            other => other.clone(),
        }
    }

    /// Wrap a leaf in its matching multi variant; collection variants
    /// pass through as clones.
    pub fn as_multi(&self) -> Geometry {
        let srid = self.srid();
        let mut out = match self {
            Geometry::Point(g) => Geometry::MultiPoint(MultiPoint {
                srid: None,
                bbox: None,
                dims: g.dims(),
                points: vec![g.clone()],
            }),
            Geometry::LineString(g) => Geometry::MultiLineString(MultiLineString {
                srid: None,
                bbox: None,
                dims: g.dims(),
                lines: vec![g.clone()],
            }),
            Geometry::CircularString(g) => Geometry::MultiCurve(MultiCurve {
                srid: None,
                bbox: None,
                dims: g.dims(),
                curves: vec![Curve::CircularString(g.clone())],
            }),
            Geometry::CompoundCurve(g) => Geometry::MultiCurve(MultiCurve {
                srid: None,
                bbox: None,
                dims: g.dims(),
                curves: vec![Curve::CompoundCurve(g.clone())],
            }),
            Geometry::Polygon(g) => Geometry::MultiPolygon(MultiPolygon {
                srid: None,
                bbox: None,
                dims: g.dims(),
                polygons: vec![g.clone()],
            }),
            Geometry::CurvePolygon(g) => Geometry::MultiSurface(MultiSurface {
                srid: None,
                bbox: None,
                dims: g.dims(),
                surfaces: vec![Surface::CurvePolygon(g.clone())],
            }),
            Geometry::Triangle(g) => Geometry::Tin(Tin {
                srid: None,
                bbox: None,
                dims: g.dims(),
                triangles: vec![g.clone()],
            }),
            other => other.clone(),
        };
        out.set_srid(srid);
        out
    }

    /// Collect clones of every nested sub-geometry whose leaf variant is
    /// `target`, recursing through collection variants.
    pub fn extract(&self, target: GeometryType) -> GeometryCollection {
        let mut found = Vec::new();
        extract_into(self, target, &mut found);
        let mut col = GeometryCollection::new(found);
        col.srid = self.srid();
        col
    }
}

fn reverse_compound(g: &mut CompoundCurve) {
    g.segments.reverse();
    for s in &mut g.segments {
        match s {
            CurveSegment::LineString(l) => l.coords.reverse(),
            CurveSegment::CircularString(c) => c.coords.reverse(),
        }
    }
}

fn reverse_curve(c: &mut Curve) {
    match c {
        Curve::LineString(g) => g.coords.reverse(),
        Curve::CircularString(g) => g.coords.reverse(),
        Curve::CompoundCurve(g) => reverse_compound(g),
    }
}

fn reverse_surface(s: &mut Surface) {
    match s {
        Surface::Polygon(g) => g.rings.iter_mut().for_each(PointArray::reverse),
        Surface::CurvePolygon(g) => g.rings.iter_mut().for_each(reverse_curve),
    }
}

fn collect_point_arrays<'a>(g: &'a Geometry, out: &mut Vec<&'a PointArray>) {
    match g {
        Geometry::Point(g) => out.push(&g.coords),
        Geometry::LineString(g) => out.push(&g.coords),
        Geometry::CircularString(g) => out.push(&g.coords),
        Geometry::Triangle(g) => out.push(&g.coords),
        Geometry::Polygon(g) => out.extend(g.rings.iter()),
        Geometry::CompoundCurve(g) => collect_compound(g, out),
        Geometry::CurvePolygon(g) => g.rings.iter().for_each(|r| collect_curve(r, out)),
        Geometry::MultiPoint(g) => out.extend(g.points.iter().map(|p| &p.coords)),
        Geometry::MultiLineString(g) => out.extend(g.lines.iter().map(|l| &l.coords)),
        Geometry::MultiCurve(g) => g.curves.iter().for_each(|c| collect_curve(c, out)),
        Geometry::MultiPolygon(g) => {
            g.polygons.iter().for_each(|p| out.extend(p.rings.iter()))
        }
        Geometry::MultiSurface(g) => g.surfaces.iter().for_each(|s| match s {
            Surface::Polygon(p) => out.extend(p.rings.iter()),
            Surface::CurvePolygon(cp) => cp.rings.iter().for_each(|r| collect_curve(r, out)),
        }),
        Geometry::PolyhedralSurface(g) => {
            g.patches.iter().for_each(|p| out.extend(p.rings.iter()))
        }
        Geometry::Tin(g) => out.extend(g.triangles.iter().map(|t| &t.coords)),
        Geometry::GeometryCollection(g) => {
            g.geoms.iter().for_each(|m| collect_point_arrays(m, out))
        }
    }
}

fn collect_compound<'a>(g: &'a CompoundCurve, out: &mut Vec<&'a PointArray>) {
    out.extend(g.segments.iter().map(CurveSegment::coords));
}

fn collect_curve<'a>(c: &'a Curve, out: &mut Vec<&'a PointArray>) {
    match c {
        Curve::LineString(g) => out.push(&g.coords),
        Curve::CircularString(g) => out.push(&g.coords),
        Curve::CompoundCurve(g) => collect_compound(g, out),
    }
}

fn collect_point_arrays_mut<'a>(g: &'a mut Geometry, out: &mut Vec<&'a mut PointArray>) {
    match g {
        Geometry::Point(g) => out.push(&mut g.coords),
        Geometry::LineString(g) => out.push(&mut g.coords),
        Geometry::CircularString(g) => out.push(&mut g.coords),
        Geometry::Triangle(g) => out.push(&mut g.coords),
        Geometry::Polygon(g) => out.extend(g.rings.iter_mut()),
        Geometry::CompoundCurve(g) => collect_compound_mut(g, out),
        Geometry::CurvePolygon(g) => g.rings.iter_mut().for_each(|r| collect_curve_mut(r, out)),
        Geometry::MultiPoint(g) => out.extend(g.points.iter_mut().map(|p| &mut p.coords)),
        Geometry::MultiLineString(g) => out.extend(g.lines.iter_mut().map(|l| &mut l.coords)),
        Geometry::MultiCurve(g) => g.curves.iter_mut().for_each(|c| collect_curve_mut(c, out)),
        Geometry::MultiPolygon(g) => g
            .polygons
            .iter_mut()
            .for_each(|p| out.extend(p.rings.iter_mut())),
        Geometry::MultiSurface(g) => g.surfaces.iter_mut().for_each(|s| match s {
            Surface::Polygon(p) => out.extend(p.rings.iter_mut()),
            Surface::CurvePolygon(cp) => {
                cp.rings.iter_mut().for_each(|r| collect_curve_mut(r, out))
            }
        }),
        Geometry::PolyhedralSurface(g) => g
            .patches
            .iter_mut()
            .for_each(|p| out.extend(p.rings.iter_mut())),
        Geometry::Tin(g) => out.extend(g.triangles.iter_mut().map(|t| &mut t.coords)),
        Geometry::GeometryCollection(g) => g
            .geoms
            .iter_mut()
            .for_each(|m| collect_point_arrays_mut(m, out)),
    }
}

fn collect_compound_mut<'a>(g: &'a mut CompoundCurve, out: &mut Vec<&'a mut PointArray>) {
    out.extend(g.segments.iter_mut().map(|s| match s {
        CurveSegment::LineString(l) => &mut l.coords,
        CurveSegment::CircularString(c) => &mut c.coords,
    }));
}

fn collect_curve_mut<'a>(c: &'a mut Curve, out: &mut Vec<&'a mut PointArray>) {
    match c {
        Curve::LineString(g) => out.push(&mut g.coords),
        Curve::CircularString(g) => out.push(&mut g.coords),
        Curve::CompoundCurve(g) => collect_compound_mut(g, out),
    }
}

fn extract_into(g: &Geometry, target: GeometryType, out: &mut Vec<Geometry>) {
    if g.geom_type() == target {
        out.push(g.clone());
        return;
    }
    match g {
        Geometry::MultiPoint(m) => {
            m.points
                .iter()
                .for_each(|p| extract_into(&Geometry::Point(p.clone()), target, out));
        }
        Geometry::MultiLineString(m) => {
            m.lines
                .iter()
                .for_each(|l| extract_into(&Geometry::LineString(l.clone()), target, out));
        }
        Geometry::MultiPolygon(m) => {
            m.polygons
                .iter()
                .for_each(|p| extract_into(&Geometry::Polygon(p.clone()), target, out));
        }
        Geometry::MultiCurve(m) => {
            m.curves
                .iter()
                .for_each(|c| extract_into(&c.clone().into(), target, out));
        }
        Geometry::MultiSurface(m) => {
            m.surfaces
                .iter()
                .for_each(|s| extract_into(&s.clone().into(), target, out));
        }
        Geometry::CompoundCurve(m) => {
            m.segments
                .iter()
                .for_each(|s| extract_into(&s.clone().into(), target, out));
        }
        Geometry::PolyhedralSurface(m) => {
            m.patches
                .iter()
                .for_each(|p| extract_into(&Geometry::Polygon(p.clone()), target, out));
        }
        Geometry::Tin(m) => {
            m.triangles
                .iter()
                .for_each(|t| extract_into(&Geometry::Triangle(t.clone()), target, out));
        }
        Geometry::GeometryCollection(m) => {
            m.geoms.iter().for_each(|g| extract_into(g, target, out));
        }
        _ => {}
    }
}

/// Dimensionality for a freshly built collection: the first member's, or
/// plain XY when there is none.
pub(crate) fn derive_dims(first: Option<Dims>) -> Dims {
    first.unwrap_or(Dims::XY)
}

/// Cached boxes only discriminate when both sides carry one.
pub(crate) fn bbox_compatible(a: &Option<Bbox>, b: &Option<Bbox>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Unordered member equality: every element of `a` must match exactly one
/// unused element of `b`.
pub(crate) fn unordered_same_by<T>(a: &[T], b: &[T], same: impl Fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for x in a {
        for (i, y) in b.iter().enumerate() {
            if !used[i] && same(x, y) {
                used[i] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

impl From<Point> for Geometry {
    fn from(g: Point) -> Geometry {
        Geometry::Point(g)
    }
}

impl From<LineString> for Geometry {
    fn from(g: LineString) -> Geometry {
        Geometry::LineString(g)
    }
}

impl From<CircularString> for Geometry {
    fn from(g: CircularString) -> Geometry {
        Geometry::CircularString(g)
    }
}

impl From<CompoundCurve> for Geometry {
    fn from(g: CompoundCurve) -> Geometry {
        Geometry::CompoundCurve(g)
    }
}

impl From<Triangle> for Geometry {
    fn from(g: Triangle) -> Geometry {
        Geometry::Triangle(g)
    }
}

impl From<Polygon> for Geometry {
    fn from(g: Polygon) -> Geometry {
        Geometry::Polygon(g)
    }
}

impl From<CurvePolygon> for Geometry {
    fn from(g: CurvePolygon) -> Geometry {
        Geometry::CurvePolygon(g)
    }
}

impl From<MultiPoint> for Geometry {
    fn from(g: MultiPoint) -> Geometry {
        Geometry::MultiPoint(g)
    }
}

impl From<MultiLineString> for Geometry {
    fn from(g: MultiLineString) -> Geometry {
        Geometry::MultiLineString(g)
    }
}

impl From<MultiCurve> for Geometry {
    fn from(g: MultiCurve) -> Geometry {
        Geometry::MultiCurve(g)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(g: MultiPolygon) -> Geometry {
        Geometry::MultiPolygon(g)
    }
}

impl From<MultiSurface> for Geometry {
    fn from(g: MultiSurface) -> Geometry {
        Geometry::MultiSurface(g)
    }
}

impl From<PolyhedralSurface> for Geometry {
    fn from(g: PolyhedralSurface) -> Geometry {
        Geometry::PolyhedralSurface(g)
    }
}

impl From<Tin> for Geometry {
    fn from(g: Tin) -> Geometry {
        Geometry::Tin(g)
    }
}

impl From<GeometryCollection> for Geometry {
    fn from(g: GeometryCollection) -> Geometry {
        Geometry::GeometryCollection(g)
    }
}

impl From<Curve> for Geometry {
    fn from(c: Curve) -> Geometry {
        match c {
            Curve::LineString(g) => Geometry::LineString(g),
            Curve::CircularString(g) => Geometry::CircularString(g),
            Curve::CompoundCurve(g) => Geometry::CompoundCurve(g),
        }
    }
}

impl From<CurveSegment> for Geometry {
    fn from(s: CurveSegment) -> Geometry {
        match s {
            CurveSegment::LineString(g) => Geometry::LineString(g),
            CurveSegment::CircularString(g) => Geometry::CircularString(g),
        }
    }
}

impl From<Surface> for Geometry {
    fn from(s: Surface) -> Geometry {
        match s {
            Surface::Polygon(g) => Geometry::Polygon(g),
            Surface::CurvePolygon(g) => Geometry::CurvePolygon(g),
        }
    }
}

macro_rules! impl_as_variant {
    ($method:ident, $method_mut:ident, $variant:ident, $ty:ty) => {
        impl Geometry {
            /// A typed reference when this is the matching variant.
            pub fn $method(&self) -> Option<&$ty> {
                match self {
                    Geometry::$variant(g) => Some(g),
                    _ => None,
                }
            }

            /// A typed mutable reference when this is the matching variant.
            pub fn $method_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    Geometry::$variant(g) => Some(g),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! impl_try_from_geometry {
    ($variant:ident, $ty:ty) => {
        impl TryFrom<Geometry> for $ty {
            type Error = crate::Error;

            fn try_from(geom: Geometry) -> Result<$ty, crate::Error> {
                match geom {
                    Geometry::$variant(g) => Ok(g),
                    other => Err(crate::Error::MismatchedGeometry {
                        expected: GeometryType::$variant.name(),
                        found: other.geom_type().name(),
                    }),
                }
            }
        }
    };
}

impl_try_from_geometry!(Point, Point);
impl_try_from_geometry!(LineString, LineString);
impl_try_from_geometry!(CircularString, CircularString);
impl_try_from_geometry!(CompoundCurve, CompoundCurve);
impl_try_from_geometry!(Triangle, Triangle);
impl_try_from_geometry!(Polygon, Polygon);
impl_try_from_geometry!(CurvePolygon, CurvePolygon);
impl_try_from_geometry!(MultiPoint, MultiPoint);
impl_try_from_geometry!(MultiLineString, MultiLineString);
impl_try_from_geometry!(MultiCurve, MultiCurve);
impl_try_from_geometry!(MultiPolygon, MultiPolygon);
impl_try_from_geometry!(MultiSurface, MultiSurface);
impl_try_from_geometry!(PolyhedralSurface, PolyhedralSurface);
impl_try_from_geometry!(Tin, Tin);
impl_try_from_geometry!(GeometryCollection, GeometryCollection);

impl_as_variant!(as_point, as_point_mut, Point, Point);
impl_as_variant!(as_line_string, as_line_string_mut, LineString, LineString);
impl_as_variant!(as_circular_string, as_circular_string_mut, CircularString, CircularString);
impl_as_variant!(as_compound_curve, as_compound_curve_mut, CompoundCurve, CompoundCurve);
impl_as_variant!(as_triangle, as_triangle_mut, Triangle, Triangle);
impl_as_variant!(as_polygon, as_polygon_mut, Polygon, Polygon);
impl_as_variant!(as_curve_polygon, as_curve_polygon_mut, CurvePolygon, CurvePolygon);
impl_as_variant!(as_multi_point, as_multi_point_mut, MultiPoint, MultiPoint);
impl_as_variant!(as_multi_line_string, as_multi_line_string_mut, MultiLineString, MultiLineString);
impl_as_variant!(as_multi_curve, as_multi_curve_mut, MultiCurve, MultiCurve);
impl_as_variant!(as_multi_polygon, as_multi_polygon_mut, MultiPolygon, MultiPolygon);
impl_as_variant!(as_multi_surface, as_multi_surface_mut, MultiSurface, MultiSurface);
impl_as_variant!(as_polyhedral_surface, as_polyhedral_surface_mut, PolyhedralSurface, PolyhedralSurface);
impl_as_variant!(as_tin, as_tin_mut, Tin, Tin);
impl_as_variant!(as_collection, as_collection_mut, GeometryCollection, GeometryCollection);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dims, Point4, PointArray};

    fn line(points: &[(f64, f64)]) -> Geometry {
        Geometry::LineString(LineString::new(PointArray::from_points(
            Dims::XY,
            &points.iter().map(|&(x, y)| Point4::new(x, y)).collect::<Vec<_>>(),
        )))
    }

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        Polygon::new(vec![PointArray::from_points(
            Dims::XY,
            &[
                Point4::new(x0, y0),
                Point4::new(x0 + size, y0),
                Point4::new(x0 + size, y0 + size),
                Point4::new(x0, y0 + size),
                Point4::new(x0, y0),
            ],
        )])
    }

    #[test]
    fn type_inspection() {
        let p = Geometry::Point(Point::from_xyz(1.0, 2.0, 3.0));
        assert_eq!(p.geom_type(), GeometryType::Point);
        assert_eq!(p.ndims(), 3);
        assert!(p.has_z());
        assert!(!p.has_m());
        assert!(!p.is_collection());
        assert_eq!(p.dimension(), Some(0));
        assert!(p.as_point().is_some());
        assert!(p.as_polygon().is_none());
    }

    #[test]
    fn empty_forms() {
        let empty_point = Geometry::Point(Point::empty(Dims::XYZM));
        assert!(empty_point.is_empty());
        assert_eq!(empty_point.ndims(), 4);

        let empty_col = Geometry::GeometryCollection(GeometryCollection::empty(Dims::XY));
        assert!(empty_col.is_empty());
        assert_eq!(empty_col.dimension(), None);
    }

    #[test]
    fn add_bbox_is_idempotent_and_changed_clears() {
        let mut g = line(&[(0.0, 0.0), (4.0, 2.0)]);
        assert!(g.bbox().is_none());
        g.add_bbox();
        let b = *g.bbox().unwrap();
        assert_eq!((b.xmin, b.ymin, b.xmax, b.ymax), (0.0, 0.0, 4.0, 2.0));
        g.add_bbox();
        assert_eq!(g.bbox().unwrap(), &b);
        g.changed();
        assert!(g.bbox().is_none());
    }

    #[test]
    fn bbox_carries_z_for_3d() {
        let mut g = Geometry::LineString(LineString::new(PointArray::from_points(
            Dims::XYZ,
            &[Point4::with_z(0.0, 0.0, -5.0), Point4::with_z(1.0, 1.0, 7.0)],
        )));
        g.add_bbox();
        let b = g.bbox().unwrap();
        assert!(b.has_z);
        assert_eq!((b.zmin, b.zmax), (-5.0, 7.0));
    }

    #[test]
    fn dimension_of_collection_is_max_of_members() {
        let col = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::Point(Point::from_xy(0.0, 0.0)),
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
        ]));
        assert_eq!(col.dimension(), Some(2));
    }

    #[test]
    fn same_collections_match_unordered() {
        let a = Geometry::GeometryCollection(GeometryCollection::new(vec![
            line(&[(0.0, 0.0), (1.0, 1.0)]),
            line(&[(5.0, 5.0), (6.0, 6.0)]),
        ]));
        let b = Geometry::GeometryCollection(GeometryCollection::new(vec![
            line(&[(5.0, 5.0), (6.0, 6.0)]),
            line(&[(0.0, 0.0), (1.0, 1.0)]),
        ]));
        assert!(a.same(&b));

        let c = Geometry::GeometryCollection(GeometryCollection::new(vec![
            line(&[(0.0, 0.0), (1.0, 1.0)]),
            line(&[(0.0, 0.0), (1.0, 1.0)]),
        ]));
        assert!(!a.same(&c));
    }

    #[test]
    fn same_distinguishes_dims_and_variant() {
        let xy = line(&[(0.0, 0.0), (1.0, 1.0)]);
        let xyz = Geometry::LineString(LineString::new(PointArray::from_points(
            Dims::XYZ,
            &[Point4::with_z(0.0, 0.0, 0.0), Point4::with_z(1.0, 1.0, 0.0)],
        )));
        assert!(!xy.same(&xyz));
        assert!(!xy.same(&Geometry::Point(Point::from_xy(0.0, 0.0))));
    }

    #[test]
    fn double_reverse_roundtrips() {
        let mut g = Geometry::Polygon(square(0.0, 0.0, 10.0));
        let orig = g.clone();
        g.reverse();
        assert!(!g.same(&orig));
        g.reverse();
        assert!(g.same(&orig));
    }

    #[test]
    fn force_rhr_orients_rings() {
        let mut poly = square(0.0, 0.0, 10.0); // counter-clockwise exterior
        let mut hole = PointArray::from_points(
            Dims::XY,
            &[
                Point4::new(2.0, 2.0),
                Point4::new(4.0, 2.0),
                Point4::new(4.0, 4.0),
                Point4::new(2.0, 2.0),
            ],
        );
        hole.reverse(); // clockwise hole
        poly.push_ring(hole);

        let mut g = Geometry::Polygon(poly);
        g.force_rhr();
        let poly = g.as_polygon().unwrap();
        assert!(poly.exterior().unwrap().signed_area2d() < 0.0);
        assert!(poly.rings[1].signed_area2d() > 0.0);
    }

    #[test]
    fn as_multi_wraps_leaves_and_keeps_collections() {
        let mut p = Point::from_xy(1.0, 2.0);
        p.srid = Some(4326);
        let m = Geometry::Point(p).as_multi();
        assert_eq!(m.geom_type(), GeometryType::MultiPoint);
        assert_eq!(m.srid(), Some(4326));
        assert_eq!(m.as_multi_point().unwrap().points.len(), 1);

        let mm = m.as_multi();
        assert!(mm.same(&m));
    }

    #[test]
    fn extract_recurses_through_nesting() {
        let nested = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::MultiPoint(MultiPoint::new(vec![
                Point::from_xy(0.0, 0.0),
                Point::from_xy(1.0, 1.0),
            ])),
            line(&[(0.0, 0.0), (1.0, 1.0)]),
            Geometry::GeometryCollection(GeometryCollection::new(vec![Geometry::Point(
                Point::from_xy(9.0, 9.0),
            )])),
        ]));
        let points = nested.extract(GeometryType::Point);
        assert_eq!(points.len(), 3);
        let lines = nested.extract(GeometryType::LineString);
        assert_eq!(lines.len(), 1);
        let polys = nested.extract(GeometryType::Polygon);
        assert_eq!(polys.len(), 0);
    }

    #[test]
    fn count_vertices_and_points_iterator() {
        let g = Geometry::GeometryCollection(GeometryCollection::new(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
            line(&[(0.0, 0.0), (1.0, 1.0)]),
        ]));
        assert_eq!(g.count_vertices(), 7);
        let xs: Vec<f64> = g.points().map(|p| p.x).collect();
        assert_eq!(xs.len(), 7);
        assert_eq!(xs[5], 0.0);
    }

    #[test]
    fn translate_shifts_everything() {
        let mut g = line(&[(0.0, 0.0), (1.0, 1.0)]);
        g.add_bbox();
        g.translate(10.0, -5.0);
        assert!(g.bbox().is_none());
        let p: Vec<Point4> = g.points().collect();
        assert_eq!((p[0].x, p[0].y), (10.0, -5.0));
        assert_eq!((p[1].x, p[1].y), (11.0, -4.0));
    }
}
