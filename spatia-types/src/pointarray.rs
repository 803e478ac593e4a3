use crate::{Bbox, Dims, Point4};

/// An ordered coordinate sequence sharing one [`Dims`] layout.
///
/// Storage is a contiguous `Vec<f64>` of `len() * dims().width()`
/// ordinates. Access is by index and always yields a canonical
/// [`Point4`]; ordinates the layout does not store read back as zero and
/// are ignored on write.
///
/// Operations on empty arrays return identity, empty or `None` results;
/// they never fail.
///
/// # Examples
///
/// ```
/// use spatia_types::{Dims, Point4, PointArray};
///
/// let mut pa = PointArray::new(Dims::XYZ);
/// pa.append(Point4::with_z(1.0, 2.0, 3.0));
/// let p = pa.point(0);
/// assert_eq!((p.x, p.y, p.z, p.m), (1.0, 2.0, 3.0, 0.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointArray {
    dims: Dims,
    data: Vec<f64>,
}

impl PointArray {
    pub fn new(dims: Dims) -> PointArray {
        PointArray { dims, data: Vec::new() }
    }

    pub fn with_capacity(dims: Dims, npoints: usize) -> PointArray {
        PointArray {
            dims,
            data: Vec::with_capacity(npoints * dims.width()),
        }
    }

    pub fn from_points(dims: Dims, points: &[Point4]) -> PointArray {
        let mut pa = PointArray::with_capacity(dims, points.len());
        for p in points {
            pa.append(*p);
        }
        pa
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn has_z(&self) -> bool {
        self.dims.has_z
    }

    pub fn has_m(&self) -> bool {
        self.dims.has_m
    }

    /// Number of logical points.
    pub fn len(&self) -> usize {
        self.data.len() / self.dims.width()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append a point, keeping only the ordinates the layout stores.
    pub fn append(&mut self, p: Point4) {
        self.data.push(p.x);
        self.data.push(p.y);
        if self.dims.has_z {
            self.data.push(p.z);
        }
        if self.dims.has_m {
            self.data.push(p.m);
        }
    }

    /// Append a point unless it repeats the last stored point in all four
    /// canonical ordinates (missing ordinates compare as zero).
    pub fn append_unique(&mut self, p: Point4) {
        if let Some(last) = self.last() {
            if last == p {
                return;
            }
        }
        self.append(p);
    }

    /// The point at `i` in canonical four-ordinate form.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn point(&self, i: usize) -> Point4 {
        let w = self.dims.width();
        let s = &self.data[i * w..(i + 1) * w];
        let mut p = Point4::new(s[0], s[1]);
        match (self.dims.has_z, self.dims.has_m) {
            (true, false) => p.z = s[2],
            (false, true) => p.m = s[2],
            (true, true) => {
                p.z = s[2];
                p.m = s[3];
            }
            (false, false) => {}
        }
        p
    }

    pub fn first(&self) -> Option<Point4> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(0))
        }
    }

    pub fn last(&self) -> Option<Point4> {
        if self.is_empty() {
            None
        } else {
            Some(self.point(self.len() - 1))
        }
    }

    /// Overwrite the point at an existing index.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn set_point(&mut self, i: usize, p: Point4) {
        let w = self.dims.width();
        let s = &mut self.data[i * w..(i + 1) * w];
        s[0] = p.x;
        s[1] = p.y;
        match (self.dims.has_z, self.dims.has_m) {
            (true, false) => s[2] = p.z,
            (false, true) => s[2] = p.m,
            (true, true) => {
                s[2] = p.z;
                s[3] = p.m;
            }
            (false, false) => {}
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Point4> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }

    /// Reverse the point order in place.
    pub fn reverse(&mut self) {
        let w = self.dims.width();
        let n = self.len();
        for i in 0..n / 2 {
            for k in 0..w {
                self.data.swap(i * w + k, (n - 1 - i) * w + k);
            }
        }
    }

    /// Move each point's longitude into the 0..360 frame: x < 0 gains 360,
    /// x > 180 loses 360.
    pub fn longitude_shift(&mut self) {
        let w = self.dims.width();
        for i in 0..self.len() {
            let x = self.data[i * w];
            if x < 0.0 {
                self.data[i * w] = x + 360.0;
            } else if x > 180.0 {
                self.data[i * w] = x - 360.0;
            }
        }
    }

    /// Shift every point by `(dx, dy)` in the plane.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let w = self.dims.width();
        for i in 0..self.len() {
            self.data[i * w] += dx;
            self.data[i * w + 1] += dy;
        }
    }

    /// Bitwise equality of layout and stored ordinates.
    ///
    /// NaN ordinates with identical payloads compare equal; `0.0` and
    /// `-0.0` do not.
    pub fn same(&self, other: &PointArray) -> bool {
        self.dims == other.dims
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Drop points that bitwise-repeat their immediate predecessor.
    pub fn remove_repeated_points(&mut self) {
        let w = self.dims.width();
        let n = self.len();
        if n < 2 {
            return;
        }
        let mut out = Vec::with_capacity(self.data.len());
        out.extend_from_slice(&self.data[..w]);
        for i in 1..n {
            let prev = &self.data[(i - 1) * w..i * w];
            let cur = &self.data[i * w..(i + 1) * w];
            if prev.iter().zip(cur).any(|(a, b)| a.to_bits() != b.to_bits()) {
                out.extend_from_slice(cur);
            }
        }
        self.data = out;
    }

    /// Total planar length of the segment chain.
    pub fn length2d(&self) -> f64 {
        let mut sum = 0.0;
        for i in 1..self.len() {
            sum += self.point(i - 1).distance2d(&self.point(i));
        }
        sum
    }

    /// True iff the first and last points coincide in x and y.
    pub fn is_closed_2d(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => a.x == b.x && a.y == b.y,
            _ => false,
        }
    }

    /// Signed shoelace area of the implied ring; positive for
    /// counter-clockwise winding.
    pub fn signed_area2d(&self) -> f64 {
        let n = self.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 1..n - 1 {
            let p0 = self.point(0);
            let p1 = self.point(i);
            let p2 = self.point(i + 1);
            sum += (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y);
        }
        sum / 2.0
    }

    /// The planar bounding box, or `None` when empty.
    pub fn compute_box2d(&self) -> Option<Bbox> {
        self.compute_bbox().map(Bbox::to2d)
    }

    /// The bounding box over the stored dimensions (Z range included when
    /// the layout has Z), or `None` when empty.
    pub fn compute_bbox(&self) -> Option<Bbox> {
        let first = self.first()?;
        let mut bbox = Bbox::from_point(&first, self.dims.has_z);
        for p in self.iter().skip(1) {
            bbox.add_point(&p);
        }
        Some(bbox)
    }

    /// A copy in which no consecutive pair is further than `max_length`
    /// apart in the plane; inserted points interpolate all four ordinates.
    pub fn segmentize2d(&self, max_length: f64) -> PointArray {
        if !(max_length > 0.0) || self.len() < 2 {
            return self.clone();
        }
        let mut out = PointArray::with_capacity(self.dims, self.len());
        out.append(self.point(0));
        for i in 1..self.len() {
            let a = self.point(i - 1);
            let b = self.point(i);
            let pieces = (a.distance2d(&b) / max_length).ceil().max(1.0) as usize;
            for k in 1..pieces {
                out.append(a.interpolate(&b, k as f64 / pieces as f64));
            }
            out.append(b);
        }
        out
    }

    /// The sub-chain between fractions `from` and `to` of the total planar
    /// length, interpolating the end points as needed.
    pub fn substring(&self, from: f64, to: f64) -> PointArray {
        let (mut from, mut to) = (from.clamp(0.0, 1.0), to.clamp(0.0, 1.0));
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }
        let total = self.length2d();
        if self.len() < 2 || total == 0.0 {
            return self.clone();
        }
        let d_from = from * total;
        let d_to = to * total;

        let mut out = PointArray::new(self.dims);
        let mut acc = 0.0;
        let mut started = false;
        for i in 1..self.len() {
            let a = self.point(i - 1);
            let b = self.point(i);
            let l = a.distance2d(&b);
            if acc + l < d_from && !started {
                acc += l;
                continue;
            }
            if !started {
                let t = if l > 0.0 { (d_from - acc) / l } else { 0.0 };
                out.append_unique(a.interpolate(&b, t.clamp(0.0, 1.0)));
                started = true;
            }
            if acc + l >= d_to {
                let t = if l > 0.0 { (d_to - acc) / l } else { 0.0 };
                out.append_unique(a.interpolate(&b, t.clamp(0.0, 1.0)));
                break;
            }
            out.append_unique(b);
            acc += l;
        }
        // A degenerate window collapses to one point; pad so the result is
        // still a drawable chain.
        if out.len() == 1 {
            let p = out.point(0);
            out.append(p);
        }
        out
    }

    /// Locate the closest position on the chain to `p`.
    ///
    /// Returns `(location, distance)`: the fraction of the total planar
    /// length at the closest position, and the perpendicular distance to
    /// the nearest segment. `None` when the array is empty.
    pub fn locate_point(&self, p: &Point4) -> Option<(f64, f64)> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some((0.0, self.point(0).distance2d(p)));
        }
        let total = self.length2d();
        let mut best_dist = f64::INFINITY;
        let mut best_along = 0.0;
        let mut acc = 0.0;
        for i in 1..n {
            let a = self.point(i - 1);
            let b = self.point(i);
            let l = a.distance2d(&b);
            let t = if l > 0.0 {
                (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / (l * l)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let c = a.interpolate(&b, t);
            let d = c.distance2d(p);
            if d < best_dist {
                best_dist = d;
                best_along = acc + t * l;
            }
            acc += l;
        }
        let location = if total > 0.0 { best_along / total } else { 0.0 };
        Some((location, best_dist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chain(points: &[(f64, f64)]) -> PointArray {
        PointArray::from_points(
            Dims::XY,
            &points.iter().map(|&(x, y)| Point4::new(x, y)).collect::<Vec<_>>(),
        )
    }

    #[test]
    fn append_respects_layout() {
        let mut pa = PointArray::new(Dims::XYM);
        pa.append(Point4::with_zm(1.0, 2.0, 3.0, 4.0));
        let p = pa.point(0);
        assert_eq!((p.x, p.y, p.z, p.m), (1.0, 2.0, 0.0, 4.0));
    }

    #[test]
    fn append_unique_rejects_duplicates() {
        let mut pa = PointArray::new(Dims::XY);
        pa.append_unique(Point4::new(1.0, 1.0));
        pa.append_unique(Point4::new(1.0, 1.0));
        pa.append_unique(Point4::new(2.0, 1.0));
        assert_eq!(pa.len(), 2);

        // The comparison is four-dimensional: a different Z on an XY array
        // is truncated away and still counts as a duplicate.
        let mut pa = PointArray::new(Dims::XY);
        pa.append_unique(Point4::new(1.0, 1.0));
        pa.append_unique(Point4::with_z(1.0, 1.0, 5.0));
        assert_eq!(pa.len(), 2);
    }

    #[test]
    fn double_reverse_is_identity() {
        let mut pa = PointArray::from_points(
            Dims::XYZM,
            &[
                Point4::with_zm(0.0, 1.0, 2.0, 3.0),
                Point4::with_zm(4.0, 5.0, 6.0, 7.0),
                Point4::with_zm(8.0, 9.0, 10.0, 11.0),
            ],
        );
        let orig = pa.clone();
        pa.reverse();
        assert_eq!(pa.point(0).x, 8.0);
        pa.reverse();
        assert!(pa.same(&orig));
    }

    #[test]
    fn longitude_shift_wraps_both_ways() {
        let mut pa = chain(&[(-10.0, 0.0), (190.0, 0.0), (90.0, 0.0)]);
        pa.longitude_shift();
        assert_eq!(pa.point(0).x, 350.0);
        assert_eq!(pa.point(1).x, -170.0);
        assert_eq!(pa.point(2).x, 90.0);
    }

    #[test]
    fn closed_and_area() {
        let ring = chain(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        assert!(ring.is_closed_2d());
        assert_relative_eq!(ring.signed_area2d(), 100.0);
        let mut cw = ring.clone();
        cw.reverse();
        assert_relative_eq!(cw.signed_area2d(), -100.0);
        assert!(!chain(&[(0.0, 0.0), (1.0, 1.0)]).is_closed_2d());
    }

    #[test]
    fn segmentize_caps_segment_length() {
        let pa = chain(&[(0.0, 0.0), (10.0, 0.0)]);
        let seg = pa.segmentize2d(3.0);
        assert_eq!(seg.len(), 5);
        for i in 1..seg.len() {
            assert!(seg.point(i - 1).distance2d(&seg.point(i)) <= 3.0 + 1e-12);
        }
        assert_eq!(seg.point(0).x, 0.0);
        assert_eq!(seg.last().unwrap().x, 10.0);
    }

    #[test]
    fn segmentize_interpolates_zm() {
        let pa = PointArray::from_points(
            Dims::XYZ,
            &[Point4::with_z(0.0, 0.0, 0.0), Point4::with_z(4.0, 0.0, 8.0)],
        );
        let seg = pa.segmentize2d(2.0);
        assert_eq!(seg.len(), 3);
        assert_relative_eq!(seg.point(1).z, 4.0);
    }

    #[test]
    fn substring_interpolates_endpoints() {
        let pa = chain(&[(0.0, 0.0), (10.0, 0.0)]);
        let sub = pa.substring(0.25, 0.75);
        assert_eq!(sub.len(), 2);
        assert_relative_eq!(sub.point(0).x, 2.5);
        assert_relative_eq!(sub.point(1).x, 7.5);
    }

    #[test]
    fn substring_keeps_interior_vertices() {
        let pa = chain(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let sub = pa.substring(0.25, 1.0);
        assert_eq!(sub.len(), 3);
        assert_relative_eq!(sub.point(0).x, 2.5);
        assert_relative_eq!(sub.point(1).x, 5.0);
        assert_relative_eq!(sub.point(2).x, 10.0);
    }

    #[test]
    fn locate_point_on_chain() {
        let pa = chain(&[(0.0, 0.0), (10.0, 0.0)]);
        let (loc, dist) = pa.locate_point(&Point4::new(2.5, 3.0)).unwrap();
        assert_relative_eq!(loc, 0.25);
        assert_relative_eq!(dist, 3.0);

        // Beyond the end the location clamps to the endpoint.
        let (loc, dist) = pa.locate_point(&Point4::new(12.0, 0.0)).unwrap();
        assert_relative_eq!(loc, 1.0);
        assert_relative_eq!(dist, 2.0);
    }

    #[test]
    fn empty_array_operations_are_total() {
        let mut pa = PointArray::new(Dims::XY);
        assert!(pa.compute_box2d().is_none());
        assert!(pa.locate_point(&Point4::new(0.0, 0.0)).is_none());
        assert!(!pa.is_closed_2d());
        pa.reverse();
        pa.longitude_shift();
        pa.remove_repeated_points();
        assert_eq!(pa.segmentize2d(1.0).len(), 0);
        assert!(pa.is_empty());
    }

    #[test]
    fn remove_repeated_points_collapses_runs() {
        let mut pa = chain(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        pa.remove_repeated_points();
        assert_eq!(pa.len(), 3);
    }
}
