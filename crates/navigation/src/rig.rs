//! Collaborators the navigator drives but does not own the implementation of:
//! the camera carried through the scene, terrain picking, scene scheduling
//! and the clock.

use std::cell::Cell;
use std::path::Path;
use std::time::Instant;

use foundation::math::Vec3;

use crate::pose::ViewpointPose;

/// The camera node moved by user input and flights.
pub trait CameraRig {
    /// Translate the terrain along its own plane.
    fn drag(&mut self, dx: f64, dy: f64);
    /// Translate the terrain in the screen plane.
    fn translate_in_screen_plane(&mut self, dx: f64, dy: f64);
    /// Rotate about the look-at target (`pitch` from vertical motion, `yaw`
    /// from horizontal motion).
    fn rotate(&mut self, pitch: f64, yaw: f64);
    fn magnify(&mut self, amount: f64);
    fn dolly(&mut self, amount: f64);
    fn set_look_at(&mut self, target: Vec3);
    /// Viewport center in device units.
    fn viewport_center(&self) -> (f64, f64);
    /// Snapshot the current camera as a named pose.
    fn capture(&self, name: &str) -> ViewpointPose;
    /// Move the camera to `pose`; `transition` requests an animated move.
    fn apply(&mut self, pose: &ViewpointPose, transition: bool);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Terrain picking at a viewport pixel.
pub trait TerrainPicker {
    fn pick(&self, x: f64, y: f64) -> Option<PickHit>;
}

impl<F> TerrainPicker for F
where
    F: Fn(f64, f64) -> Option<PickHit>,
{
    fn pick(&self, x: f64, y: f64) -> Option<PickHit> {
        self(x, y)
    }
}

/// Scene scheduling hooks toggled around flights.
pub trait SceneControl {
    /// Suspend (or resume) normal animation and redraw scheduling.
    fn suspend(&mut self, suspended: bool);
    /// Arm frame capture into `sink`, or disarm with `None`.
    fn set_frame_capture(&mut self, sink: Option<&Path>);
    /// Render the next frame now.
    fn render_frame(&mut self);
}

/// Millisecond timebase for velocity estimation and coasting.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock.
#[derive(Debug, Copy, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock advanced by hand, for replay and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::Vec3;

    use super::{Clock, ManualClock, PickHit, SystemClock, TerrainPicker};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(10.0);
        clock.advance(5.5);
        assert_eq!(clock.now_ms(), 15.5);
        clock.set(1.0);
        assert_eq!(clock.now_ms(), 1.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::default();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn closures_pick() {
        let picker = |x: f64, _y: f64| {
            (x > 0.0).then_some(PickHit {
                position: Vec3::new(x, 0.0, 0.0),
                normal: Vec3::UNIT_Z,
            })
        };
        assert!(picker.pick(-1.0, 0.0).is_none());
        assert_eq!(picker.pick(2.0, 0.0).map(|h| h.position.x), Some(2.0));
    }
}
