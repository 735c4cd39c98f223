use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// IAU 2000 Mars radii (meters).
pub const MARS_A: f64 = 3_396_190.0;
pub const MARS_B: f64 = 3_376_200.0;

/// IAU 2000 Moon radius (meters), spherical.
pub const MOON_R: f64 = 1_737_400.0;

/// Reference ellipsoid of a planetary body.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
}

impl Ellipsoid {
    pub const EARTH: Self = Self::new(WGS84_A, WGS84_B);
    pub const MARS: Self = Self::new(MARS_A, MARS_B);
    pub const MOON: Self = Self::new(MOON_R, MOON_R);

    pub const fn new(semi_major_axis: f64, semi_minor_axis: f64) -> Self {
        Self {
            semi_major_axis,
            semi_minor_axis,
        }
    }

    /// Look up a body by name (case-insensitive).
    pub fn for_body(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "earth" => Some(Self::EARTH),
            "mars" => Some(Self::MARS),
            "moon" => Some(Self::MOON),
            _ => None,
        }
    }
}
