use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Camera framing needed to restore a view besides its placement.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framing {
    pub fov_y_deg: f64,
    pub magnification: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            fov_y_deg: 45.0,
            magnification: 1.0,
            near: 1.0,
            far: 1.0e7,
        }
    }
}

impl Framing {
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            fov_y_deg: mix(self.fov_y_deg, other.fov_y_deg),
            magnification: mix(self.magnification, other.magnification),
            near: mix(self.near, other.near),
            far: mix(self.far, other.far),
        }
    }
}

/// A named, complete camera pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewpointPose {
    pub name: String,
    pub location: Vec3,
    pub look_at: Vec3,
    /// Unit view direction.
    pub direction: Vec3,
    #[serde(default)]
    pub framing: Framing,
}

impl ViewpointPose {
    /// Pose at `location` aimed at `look_at`.
    ///
    /// A coincident target leaves the camera looking straight down.
    pub fn looking_at(
        name: impl Into<String>,
        location: Vec3,
        look_at: Vec3,
        framing: Framing,
    ) -> Self {
        let direction = (look_at - location)
            .normalized()
            .unwrap_or(-Vec3::UNIT_Z);
        Self {
            name: name.into(),
            location,
            look_at,
            direction,
            framing,
        }
    }

    /// Distance from the camera to its look-at target.
    pub fn distance(&self) -> f64 {
        self.location.distance(self.look_at)
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::Vec3;

    use super::{Framing, ViewpointPose};

    #[test]
    fn looking_at_derives_unit_direction() {
        let p = ViewpointPose::looking_at(
            "a",
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 3.0, 6.0),
            Framing::default(),
        );
        assert_eq!(p.direction, Vec3::new(0.0, 0.6, -0.8));
        assert_eq!(p.distance(), 5.0);
    }

    #[test]
    fn coincident_target_looks_down() {
        let at = Vec3::new(1.0, 2.0, 3.0);
        let p = ViewpointPose::looking_at("a", at, at, Framing::default());
        assert_eq!(p.direction, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn framing_lerp_midpoint() {
        let a = Framing::default();
        let b = Framing {
            fov_y_deg: 15.0,
            magnification: 3.0,
            ..a
        };
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.fov_y_deg, 30.0);
        assert_eq!(mid.magnification, 2.0);
        assert_eq!(mid.near, a.near);
    }
}
