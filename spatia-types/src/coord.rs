/// A coordinate in canonical four-ordinate form.
///
/// Every access to a [`PointArray`](crate::PointArray) goes through this
/// type; ordinates the array does not store read back as `0.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
}

impl Point4 {
    pub fn new(x: f64, y: f64) -> Point4 {
        Point4 { x, y, z: 0.0, m: 0.0 }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Point4 {
        Point4 { x, y, z, m: 0.0 }
    }

    pub fn with_m(x: f64, y: f64, m: f64) -> Point4 {
        Point4 { x, y, z: 0.0, m }
    }

    pub fn with_zm(x: f64, y: f64, z: f64, m: f64) -> Point4 {
        Point4 { x, y, z, m }
    }

    /// Planar distance to `other`, ignoring Z and M.
    pub fn distance2d(&self, other: &Point4) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation between `self` and `other` in all four
    /// ordinates, `t` in `[0, 1]`.
    pub fn interpolate(&self, other: &Point4, t: f64) -> Point4 {
        Point4 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
            m: self.m + (other.m - self.m) * t,
        }
    }
}

impl From<(f64, f64)> for Point4 {
    fn from((x, y): (f64, f64)) -> Point4 {
        Point4::new(x, y)
    }
}

impl From<(f64, f64, f64)> for Point4 {
    fn from((x, y, z): (f64, f64, f64)) -> Point4 {
        Point4::with_z(x, y, z)
    }
}

impl From<(f64, f64, f64, f64)> for Point4 {
    fn from((x, y, z, m): (f64, f64, f64, f64)) -> Point4 {
        Point4::with_zm(x, y, z, m)
    }
}
