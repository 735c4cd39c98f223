use serde::{Deserialize, Serialize};

/// Axis-aligned 2D bounding box.
///
/// For geographic bounds the axes are `[lon, lat]` in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn center_and_extent() {
        let b = Aabb2::new([-10.0, -20.0], [30.0, 40.0]);
        assert_eq!(b.center(), [10.0, 10.0]);
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 60.0);
    }
}
