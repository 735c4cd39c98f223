use foundation::math::{Vec2, Vec3};
use tracing::{debug, info};

use crate::blend::{LinearBlend, PoseBlend};
use crate::config::NavigatorConfig;
use crate::flight::{
    FlightParams, FlightPlan, FlightStatus, PlaybackState, follow_curve, resample_viewpoints,
};
use crate::kinetic::{CoastStep, KineticScroll};
use crate::pose::ViewpointPose;
use crate::rig::{CameraRig, Clock, SceneControl, SystemClock, TerrainPicker};
use crate::viewpoints::ViewpointList;

/// What a pointer drag does, chosen by the caller from its button state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DragMode {
    /// No button held; the next move starts a fresh gesture.
    #[default]
    None,
    /// Translate the terrain along its plane (coasts on release).
    PanTerrain,
    /// Translate the terrain in the screen plane.
    PanScreen,
    Rotate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Turns pointer, keyboard and timer events into camera motion, keeps the
/// saved viewpoint list, and generates and plays flights.
pub struct ViewpointNavigator<R, P, S, K = SystemClock, B = LinearBlend> {
    rig: R,
    picker: P,
    scene: S,
    clock: K,
    blend: B,
    config: NavigatorConfig,
    last_pointer: Option<Vec2>,
    zoom: bool,
    kinetic: KineticScroll,
    viewpoints: ViewpointList,
    flight: Option<FlightPlan>,
}

impl<R, P, S> ViewpointNavigator<R, P, S>
where
    R: CameraRig,
    P: TerrainPicker,
    S: SceneControl,
{
    pub fn new(rig: R, picker: P, scene: S, config: NavigatorConfig) -> Self {
        Self {
            rig,
            picker,
            scene,
            clock: SystemClock::default(),
            blend: LinearBlend,
            kinetic: KineticScroll::new(&config),
            config,
            last_pointer: None,
            zoom: false,
            viewpoints: ViewpointList::default(),
            flight: None,
        }
    }
}

impl<R, P, S, K, B> ViewpointNavigator<R, P, S, K, B>
where
    R: CameraRig,
    P: TerrainPicker,
    S: SceneControl,
    K: Clock,
    B: PoseBlend,
{
    pub fn with_clock<K2: Clock>(self, clock: K2) -> ViewpointNavigator<R, P, S, K2, B> {
        ViewpointNavigator {
            rig: self.rig,
            picker: self.picker,
            scene: self.scene,
            clock,
            blend: self.blend,
            config: self.config,
            last_pointer: self.last_pointer,
            zoom: self.zoom,
            kinetic: self.kinetic,
            viewpoints: self.viewpoints,
            flight: self.flight,
        }
    }

    pub fn with_blend<B2: PoseBlend>(self, blend: B2) -> ViewpointNavigator<R, P, S, K, B2> {
        ViewpointNavigator {
            rig: self.rig,
            picker: self.picker,
            scene: self.scene,
            clock: self.clock,
            blend,
            config: self.config,
            last_pointer: self.last_pointer,
            zoom: self.zoom,
            kinetic: self.kinetic,
            viewpoints: self.viewpoints,
            flight: self.flight,
        }
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn kinetic(&self) -> &KineticScroll {
        &self.kinetic
    }

    pub fn enable_zoom(&mut self, enable: bool) {
        self.zoom = enable;
    }

    pub fn is_zoom(&self) -> bool {
        self.zoom
    }

    pub fn is_coasting(&self) -> bool {
        self.kinetic.is_coasting()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, mode: DragMode) {
        let position = Vec2::new(x, y);
        let jump = self.config.jump_threshold;
        let delta = match self.last_pointer {
            Some(prev) => {
                let d = position - prev;
                if d.x.abs() > jump || d.y.abs() > jump {
                    Vec2::ZERO
                } else {
                    d
                }
            }
            None => Vec2::ZERO,
        };
        self.last_pointer = Some(position);

        match mode {
            DragMode::None => self.last_pointer = None,
            DragMode::PanTerrain => {
                self.kinetic.sample(self.clock.now_ms(), delta);
                self.rig.drag(delta.x, delta.y);
            }
            DragMode::PanScreen => self.rig.translate_in_screen_plane(-delta.x, -delta.y),
            DragMode::Rotate => self.rig.rotate(delta.y, delta.x),
        }
    }

    pub fn pointer_scroll(&mut self, delta: f64) {
        let direction = self.config.scroll_direction.sign();
        if self.zoom {
            self.rig.magnify(-direction * delta);
        } else {
            self.rig.dolly(direction * self.config.dolly_gain * delta);
            self.update_look_at();
        }
    }

    pub fn pointer_press(&mut self, x: f64, y: f64) {
        self.last_pointer = Some(Vec2::new(x, y));
        self.kinetic.press(self.clock.now_ms());
    }

    pub fn pointer_release(&mut self, x: f64, y: f64) {
        self.last_pointer = Some(Vec2::new(x, y));
        if self.kinetic.release(self.clock.now_ms()) {
            debug!(amplitude = self.kinetic.amplitude(), "coast started");
        } else {
            self.update_look_at();
        }
    }

    /// Advance a coast in progress; call once per rendered frame.
    pub fn tick(&mut self) {
        match self.kinetic.tick(self.clock.now_ms()) {
            CoastStep::Idle => {}
            CoastStep::Drag(d) => self.rig.drag(d.x, d.y),
            CoastStep::Finished => {
                debug!("coast finished");
                self.update_look_at();
            }
        }
    }

    /// Re-center the look-at on the terrain under the viewport center.
    pub fn update_look_at(&mut self) {
        let (cx, cy) = self.rig.viewport_center();
        if let Some(hit) = self.picker.pick(cx, cy) {
            self.rig.set_look_at(hit.position);
        }
    }

    /// One arrow-key step: a terrain drag with the modifier held, otherwise
    /// a rotation.
    pub fn step(&mut self, direction: StepDirection, modifier: bool) {
        let s = self.config.step_size;
        match (direction, modifier) {
            (StepDirection::Left, true) => self.rig.drag(-s, 0.0),
            (StepDirection::Left, false) => self.rig.rotate(0.0, s),
            (StepDirection::Right, true) => self.rig.drag(s, 0.0),
            (StepDirection::Right, false) => self.rig.rotate(0.0, -s),
            (StepDirection::Up, true) => self.rig.drag(0.0, s),
            (StepDirection::Up, false) => self.rig.rotate(s, 0.0),
            (StepDirection::Down, true) => self.rig.drag(0.0, -s),
            (StepDirection::Down, false) => self.rig.rotate(-s, 0.0),
        }
    }

    /// Capture the camera as `name` and insert it at `index`.
    pub fn add_viewpoint(&mut self, index: usize, name: &str) {
        let pose = self.rig.capture(name);
        self.viewpoints.insert(index, pose);
    }

    /// Remove a batch of viewpoints; returns the new cursor.
    pub fn remove_viewpoints(&mut self, indices: &[usize]) -> Option<usize> {
        self.viewpoints.remove(indices);
        self.viewpoints.cursor()
    }

    pub fn set_viewpoints(&mut self, poses: Vec<ViewpointPose>) {
        self.viewpoints.replace(poses);
    }

    pub fn viewpoints(&self) -> &[ViewpointPose] {
        self.viewpoints.as_slice()
    }

    pub fn viewpoint_count(&self) -> usize {
        self.viewpoints.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.viewpoints.cursor()
    }

    pub fn next_viewpoint(&mut self) -> bool {
        match self.viewpoints.next() {
            Some(pose) => {
                self.rig.apply(pose, true);
                true
            }
            None => false,
        }
    }

    pub fn previous_viewpoint(&mut self) -> bool {
        match self.viewpoints.previous() {
            Some(pose) => {
                self.rig.apply(pose, true);
                true
            }
            None => false,
        }
    }

    pub fn goto_viewpoint(&mut self, pose: &ViewpointPose) -> bool {
        match self.viewpoints.goto(pose) {
            Some(found) => {
                self.rig.apply(found, true);
                true
            }
            None => false,
        }
    }

    /// Build a flight through the saved viewpoints. Leaves any existing plan
    /// in place and returns `false` when there is nothing to fly.
    pub fn fly_viewpoints(&mut self, params: FlightParams) -> bool {
        let Some(poses) =
            resample_viewpoints(self.viewpoints.as_slice(), params.num_frames, &self.blend)
        else {
            debug!(
                frames = params.num_frames,
                viewpoints = self.viewpoints.len(),
                "viewpoint flight skipped"
            );
            return false;
        };
        info!(poses = poses.len(), "viewpoint flight planned");
        self.install_flight(FlightPlan::new(params, poses));
        true
    }

    /// Build a flight following `curve` at `params.path_height`, framed like
    /// the current camera. The final pose rests on the last curve point.
    pub fn fly_path(&mut self, curve: &[Vec3], params: FlightParams) -> bool {
        let template = self.rig.capture("camera");
        let Some(poses) = follow_curve(curve, params.path_height, &template) else {
            debug!("path flight skipped: empty curve");
            return false;
        };
        info!(poses = poses.len(), height = params.path_height, "path flight planned");
        self.install_flight(FlightPlan::new(params, poses));
        true
    }

    fn install_flight(&mut self, plan: FlightPlan) {
        if self.flight_state() != PlaybackState::Idle {
            self.stop_flight();
        }
        self.flight = Some(plan);
    }

    pub fn flight_plan(&self) -> Option<&FlightPlan> {
        self.flight.as_ref()
    }

    pub fn flight_state(&self) -> PlaybackState {
        self.flight
            .as_ref()
            .map_or(PlaybackState::Idle, FlightPlan::state)
    }

    /// A flight plan is open, playing or not.
    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    pub fn start_flight(&mut self) -> bool {
        let Some(plan) = self.flight.as_mut() else {
            return false;
        };
        if plan.is_empty() {
            return false;
        }
        let params = plan.params();
        if params.grab {
            self.scene
                .set_frame_capture(params.image_sequence_path.as_deref());
        }
        self.scene.suspend(true);
        plan.play();
        info!(frame = plan.frame(), poses = plan.len(), "flight started");
        true
    }

    pub fn pause_flight(&mut self) {
        if let Some(plan) = self.flight.as_mut() {
            plan.pause();
            debug!(frame = plan.frame(), "flight paused");
        }
    }

    pub fn stop_flight(&mut self) {
        if let Some(plan) = self.flight.as_mut() {
            plan.rewind();
        }
        self.scene.set_frame_capture(None);
        self.scene.suspend(false);
        info!("flight stopped");
    }

    pub fn close_flight(&mut self) {
        self.stop_flight();
        self.flight = None;
    }

    /// Show the next flight frame; call every `millis_per_frame`.
    pub fn flight_tick(&mut self) -> Option<FlightStatus> {
        let plan = self.flight.as_mut()?;
        let frame = plan.advance()?;
        if let Some(pose) = plan.pose(frame.index) {
            self.rig.apply(pose, false);
        }
        self.scene.render_frame();
        if frame.ended {
            self.scene.set_frame_capture(None);
            self.scene.suspend(false);
            info!(frames = frame.index + 1, "flight finished");
        }
        Some(frame.status)
    }
}
