use crate::pose::ViewpointPose;

/// Produces the pose a fraction `t` of the way from `a` to `b`.
///
/// Flight resampling only decides *where* along the path each frame lies;
/// the blend decides what the camera looks like there.
pub trait PoseBlend {
    fn inbetween(&self, a: &ViewpointPose, b: &ViewpointPose, t: f64) -> ViewpointPose;
}

/// Per-field linear interpolation.
#[derive(Debug, Default, Copy, Clone)]
pub struct LinearBlend;

impl PoseBlend for LinearBlend {
    fn inbetween(&self, a: &ViewpointPose, b: &ViewpointPose, t: f64) -> ViewpointPose {
        let location = a.location.lerp(b.location, t);
        let look_at = a.look_at.lerp(b.look_at, t);
        let direction = a
            .direction
            .lerp(b.direction, t)
            .normalized()
            .or_else(|| (look_at - location).normalized())
            .unwrap_or(a.direction);

        ViewpointPose {
            name: a.name.clone(),
            location,
            look_at,
            direction,
            framing: a.framing.lerp(&b.framing, t),
        }
    }
}

impl<F> PoseBlend for F
where
    F: Fn(&ViewpointPose, &ViewpointPose, f64) -> ViewpointPose,
{
    fn inbetween(&self, a: &ViewpointPose, b: &ViewpointPose, t: f64) -> ViewpointPose {
        self(a, b, t)
    }
}
