//! Inertial ("kinetic") scrolling after a terrain drag is released.
//!
//! While dragging, a smoothed speed estimate is kept. On release above a
//! threshold the drag keeps going along the last direction with amplitude
//! `A * exp(-t / tau)` until the per-tick step is negligible.

use foundation::math::Vec2;

use crate::config::NavigatorConfig;

/// Scale from device units per millisecond to the velocity estimate.
const SPEED_SCALE: f64 = 100.0;

/// Outcome of one coasting tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CoastStep {
    /// No coast in progress.
    Idle,
    /// Apply this terrain drag.
    Drag(Vec2),
    /// The coast just ended.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KineticScroll {
    timestamp_ms: f64,
    velocity: f64,
    amplitude: f64,
    last_delta: Vec2,
    time_constant_ms: f64,
    smoothing: f64,
    velocity_threshold: f64,
    gain: f64,
    stop_delta: f64,
}

impl KineticScroll {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            timestamp_ms: 0.0,
            velocity: 0.0,
            amplitude: 0.0,
            last_delta: Vec2::ZERO,
            time_constant_ms: config.time_constant_ms,
            smoothing: config.velocity_smoothing,
            velocity_threshold: config.coast_velocity_threshold,
            gain: config.coast_gain,
            stop_delta: config.stop_delta,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn is_coasting(&self) -> bool {
        self.amplitude != 0.0
    }

    /// Pointer pressed: forget any previous gesture.
    pub fn press(&mut self, now_ms: f64) {
        self.timestamp_ms = now_ms;
        self.velocity = 0.0;
        self.amplitude = 0.0;
    }

    /// Record one terrain-drag sample.
    pub fn sample(&mut self, now_ms: f64, delta: Vec2) {
        let elapsed = (now_ms - self.timestamp_ms).max(0.0);
        self.timestamp_ms = now_ms;
        let speed = SPEED_SCALE * delta.length() / (1.0 + elapsed);
        self.velocity = self.smoothing * speed + (1.0 - self.smoothing) * self.velocity;
        self.last_delta = delta;
    }

    /// Pointer released. Returns `true` if a coast started.
    pub fn release(&mut self, now_ms: f64) -> bool {
        if self.velocity.abs() <= self.velocity_threshold {
            self.amplitude = 0.0;
            return false;
        }
        let Some(unit) = self.last_delta.normalized() else {
            self.amplitude = 0.0;
            return false;
        };
        self.amplitude = self.gain * self.velocity;
        self.timestamp_ms = now_ms;
        self.last_delta = unit;
        true
    }

    /// Magnitude of the drag a tick at `now_ms` would apply.
    pub fn delta_at(&self, now_ms: f64) -> f64 {
        let elapsed = (now_ms - self.timestamp_ms).max(0.0);
        self.amplitude * (-elapsed / self.time_constant_ms).exp()
    }

    pub fn tick(&mut self, now_ms: f64) -> CoastStep {
        if !self.is_coasting() {
            return CoastStep::Idle;
        }
        let delta = self.delta_at(now_ms);
        if delta.abs() > self.stop_delta {
            CoastStep::Drag(self.last_delta * delta)
        } else {
            self.amplitude = 0.0;
            CoastStep::Finished
        }
    }
}
