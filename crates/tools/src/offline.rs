use std::path::{Path, PathBuf};

use foundation::math::Vec3;
use navigation::{CameraRig, Framing, SceneControl, ViewpointPose};
use tracing::debug;

/// Camera without a renderer: keeps a pose and moves it in world units.
#[derive(Debug, Clone)]
pub struct OfflineRig {
    pose: ViewpointPose,
    viewport: (f64, f64),
}

impl OfflineRig {
    pub fn new(pose: ViewpointPose, viewport: (f64, f64)) -> Self {
        Self { pose, viewport }
    }

    pub fn pose(&self) -> &ViewpointPose {
        &self.pose
    }

    fn shift(&mut self, offset: Vec3) {
        self.pose.location = self.pose.location + offset;
        self.pose.look_at = self.pose.look_at + offset;
    }
}

impl Default for OfflineRig {
    fn default() -> Self {
        Self::new(
            ViewpointPose::looking_at(
                "camera",
                Vec3::new(0.0, 0.0, 1000.0),
                Vec3::ZERO,
                Framing::default(),
            ),
            (1280.0, 720.0),
        )
    }
}

impl CameraRig for OfflineRig {
    fn drag(&mut self, dx: f64, dy: f64) {
        self.shift(Vec3::new(-dx, -dy, 0.0));
    }

    fn translate_in_screen_plane(&mut self, dx: f64, dy: f64) {
        self.shift(Vec3::new(dx, dy, 0.0));
    }

    fn rotate(&mut self, pitch: f64, yaw: f64) {
        // Only yaw about the vertical through the look-at is modelled.
        let (sin, cos) = yaw.to_radians().sin_cos();
        let arm = self.pose.location - self.pose.look_at;
        let turned = Vec3::new(arm.x * cos - arm.y * sin, arm.x * sin + arm.y * cos, arm.z);
        self.pose.location = self.pose.look_at + turned;
        self.pose.direction = (-turned).normalized().unwrap_or(self.pose.direction);
        debug!(pitch, yaw, "offline rotate");
    }

    fn magnify(&mut self, amount: f64) {
        let m = self.pose.framing.magnification + amount;
        self.pose.framing.magnification = m.max(1.0);
    }

    fn dolly(&mut self, amount: f64) {
        let step = self.pose.direction * amount;
        self.pose.location = self.pose.location + step;
    }

    fn set_look_at(&mut self, target: Vec3) {
        self.pose = ViewpointPose::looking_at(
            self.pose.name.clone(),
            self.pose.location,
            target,
            self.pose.framing,
        );
    }

    fn viewport_center(&self) -> (f64, f64) {
        (self.viewport.0 / 2.0, self.viewport.1 / 2.0)
    }

    fn capture(&self, name: &str) -> ViewpointPose {
        ViewpointPose {
            name: name.to_string(),
            ..self.pose.clone()
        }
    }

    fn apply(&mut self, pose: &ViewpointPose, _transition: bool) {
        self.pose = pose.clone();
    }
}

/// Scene stand-in that counts rendered frames and remembers the capture sink.
#[derive(Debug, Default)]
pub struct FrameLog {
    pub suspended: bool,
    pub capture: Option<PathBuf>,
    pub frames: usize,
}

impl SceneControl for FrameLog {
    fn suspend(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    fn set_frame_capture(&mut self, sink: Option<&Path>) {
        self.capture = sink.map(Path::to_path_buf);
    }

    fn render_frame(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::Vec3;
    use navigation::CameraRig;

    use super::OfflineRig;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn drag_moves_camera_and_target_together() {
        let mut rig = OfflineRig::default();
        rig.drag(10.0, -5.0);
        assert_eq!(rig.pose().location, Vec3::new(-10.0, 5.0, 1000.0));
        assert_eq!(rig.pose().look_at, Vec3::new(-10.0, 5.0, 0.0));
    }

    #[test]
    fn dolly_follows_view_direction() {
        let mut rig = OfflineRig::default();
        rig.dolly(250.0);
        assert_eq!(rig.pose().location, Vec3::new(0.0, 0.0, 750.0));
    }

    #[test]
    fn yaw_keeps_distance_to_target() {
        let mut rig = OfflineRig::default();
        rig.set_look_at(Vec3::new(0.0, 100.0, 0.0));
        let before = rig.pose().distance();
        rig.rotate(0.0, 90.0);
        assert_close(rig.pose().distance(), before, 1e-9);
    }

    #[test]
    fn capture_renames_current_pose() {
        let rig = OfflineRig::default();
        let pose = rig.capture("home");
        assert_eq!(pose.name, "home");
        assert_eq!(pose.location, rig.pose().location);
        assert_eq!(rig.viewport_center(), (640.0, 360.0));
    }
}
