use core::fmt;

/// The ordinate layout of a coordinate sequence: XY plus optional Z and M.
///
/// The two flags jointly define a width of 2, 3 or 4 ordinates per point.
///
/// # Examples
///
/// ```
/// use spatia_types::Dims;
///
/// assert_eq!(Dims::XY.width(), 2);
/// assert_eq!(Dims::XYM.width(), 3);
/// assert_eq!(Dims::XYZM.width(), 4);
/// assert!(Dims::XYZM.has_z && Dims::XYZM.has_m);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dims {
    pub has_z: bool,
    pub has_m: bool,
}

impl Dims {
    pub const XY: Dims = Dims { has_z: false, has_m: false };
    pub const XYZ: Dims = Dims { has_z: true, has_m: false };
    pub const XYM: Dims = Dims { has_z: false, has_m: true };
    pub const XYZM: Dims = Dims { has_z: true, has_m: true };

    pub fn new(has_z: bool, has_m: bool) -> Dims {
        Dims { has_z, has_m }
    }

    /// Number of ordinates per point: 2, 3 or 4.
    pub fn width(self) -> usize {
        2 + usize::from(self.has_z) + usize::from(self.has_m)
    }
}

impl Default for Dims {
    fn default() -> Dims {
        Dims::XY
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match (self.has_z, self.has_m) {
            (false, false) => "XY",
            (true, false) => "XYZ",
            (false, true) => "XYM",
            (true, true) => "XYZM",
        })
    }
}
