use crate::Point4;

/// An axis-aligned bounding box, two- or three-dimensional depending on the
/// geometry it was computed from.
///
/// `zmin`/`zmax` are only meaningful while `has_z` is set.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bbox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
    pub has_z: bool,
}

impl Bbox {
    pub fn new2d(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Bbox {
        Bbox { xmin, ymin, xmax, ymax, zmin: 0.0, zmax: 0.0, has_z: false }
    }

    /// A degenerate box covering a single coordinate.
    pub fn from_point(p: &Point4, has_z: bool) -> Bbox {
        Bbox {
            xmin: p.x,
            ymin: p.y,
            xmax: p.x,
            ymax: p.y,
            zmin: if has_z { p.z } else { 0.0 },
            zmax: if has_z { p.z } else { 0.0 },
            has_z,
        }
    }

    /// Grow the box to cover `p`.
    pub fn add_point(&mut self, p: &Point4) {
        self.xmin = self.xmin.min(p.x);
        self.ymin = self.ymin.min(p.y);
        self.xmax = self.xmax.max(p.x);
        self.ymax = self.ymax.max(p.y);
        if self.has_z {
            self.zmin = self.zmin.min(p.z);
            self.zmax = self.zmax.max(p.z);
        }
    }

    /// Grow the box to cover `other`.
    pub fn merge(&mut self, other: &Bbox) {
        self.xmin = self.xmin.min(other.xmin);
        self.ymin = self.ymin.min(other.ymin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymax = self.ymax.max(other.ymax);
        if self.has_z && other.has_z {
            self.zmin = self.zmin.min(other.zmin);
            self.zmax = self.zmax.max(other.zmax);
        } else {
            self.has_z = false;
        }
    }

    /// Pad the planar extent by `d` on all four sides.
    pub fn expand2d(&mut self, d: f64) {
        self.xmin -= d;
        self.ymin -= d;
        self.xmax += d;
        self.ymax += d;
    }

    pub fn intersects2d(&self, other: &Bbox) -> bool {
        self.xmin <= other.xmax
            && self.xmax >= other.xmin
            && self.ymin <= other.ymax
            && self.ymax >= other.ymin
    }

    /// Strip the Z range, leaving a planar box.
    pub fn to2d(mut self) -> Bbox {
        self.zmin = 0.0;
        self.zmax = 0.0;
        self.has_z = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_drops_z_on_mixed_dimensionality() {
        let mut a = Bbox { zmin: 1.0, zmax: 2.0, has_z: true, ..Bbox::new2d(0.0, 0.0, 1.0, 1.0) };
        let b = Bbox::new2d(2.0, -1.0, 3.0, 0.5);
        a.merge(&b);
        assert!(!a.has_z);
        assert_eq!((a.xmin, a.ymin, a.xmax, a.ymax), (0.0, -1.0, 3.0, 1.0));
    }

    #[test]
    fn expand_and_intersect() {
        let mut a = Bbox::new2d(0.0, 0.0, 1.0, 1.0);
        let b = Bbox::new2d(2.0, 2.0, 3.0, 3.0);
        assert!(!a.intersects2d(&b));
        a.expand2d(1.0);
        assert!(a.intersects2d(&b));
    }
}
