//! Flight plans: pose sequences generated from the viewpoint list or a
//! curve, and the frame-by-frame playback state over them.

use std::fmt;
use std::path::PathBuf;

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::blend::PoseBlend;
use crate::pose::ViewpointPose;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    /// Number of resampling steps; a pose-list flight has one more pose.
    pub num_frames: usize,
    pub millis_per_frame: u64,
    pub looping: bool,
    /// Capture every rendered frame into `image_sequence_path`.
    pub grab: bool,
    pub image_sequence_path: Option<PathBuf>,
    /// Camera height above a followed curve.
    pub path_height: f64,
}

impl Default for FlightParams {
    fn default() -> Self {
        Self {
            num_frames: 100,
            millis_per_frame: 100,
            looping: false,
            grab: false,
            image_sequence_path: None,
            path_height: 0.0,
        }
    }
}

/// Arc-length resample a pose list into `frames + 1` poses.
///
/// Segments are weighted by location distance and skipped when that weight
/// is zero; if every location coincides each segment weighs one. The first
/// and last input poses are emitted unchanged. Returns `None` for
/// `frames <= 1` or fewer than two poses.
pub fn resample_viewpoints<B: PoseBlend + ?Sized>(
    poses: &[ViewpointPose],
    frames: usize,
    blend: &B,
) -> Option<Vec<ViewpointPose>> {
    if frames <= 1 || poses.len() < 2 {
        return None;
    }
    let (first, last) = (poses.first()?, poses.last()?);

    let mut weights: Vec<f64> = poses
        .windows(2)
        .map(|w| w[0].location.distance(w[1].location))
        .collect();
    if weights.iter().all(|&w| w == 0.0) {
        weights.iter_mut().for_each(|w| *w = 1.0);
    }
    let total: f64 = weights.iter().sum();
    let step = total / frames as f64;

    let mut out = Vec::with_capacity(frames + 1);
    out.push(first.clone());

    let mut segment = 0;
    let mut segment_start = 0.0;
    for k in 1..frames {
        let s = k as f64 * step;
        while segment + 1 < weights.len()
            && (weights[segment] == 0.0 || s >= segment_start + weights[segment])
        {
            segment_start += weights[segment];
            segment += 1;
        }
        let w = weights[segment];
        let t = if w > 0.0 {
            ((s - segment_start) / w).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut pose = blend.inbetween(&poses[segment], &poses[segment + 1], t);
        pose.name = k.to_string();
        out.push(pose);
    }

    out.push(last.clone());
    Some(out)
}

/// One pose per curve segment, `height` above it and aimed at the next
/// point, plus a terminal pose at the last point itself.
///
/// Zero-length segments are skipped. The terminal pose keeps the last
/// emitted direction, or `template`'s when none was emitted. Framing comes
/// from `template`. Returns `None` for an empty curve.
pub fn follow_curve(
    curve: &[Vec3],
    height: f64,
    template: &ViewpointPose,
) -> Option<Vec<ViewpointPose>> {
    let end = *curve.last()?;
    let lift = Vec3::new(0.0, 0.0, height);

    let mut out = Vec::with_capacity(curve.len());
    let mut direction = template.direction;
    for (i, w) in curve.windows(2).enumerate() {
        let Some(d) = (w[1] - w[0]).normalized() else {
            continue;
        };
        direction = d;
        out.push(ViewpointPose {
            name: i.to_string(),
            location: w[0] + lift,
            look_at: w[1] + lift,
            direction: d,
            framing: template.framing,
        });
    }

    out.push(ViewpointPose {
        name: (curve.len() - 1).to_string(),
        location: end,
        look_at: end + direction,
        direction,
        framing: template.framing,
    });
    Some(out)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Playback position report: frame index and the flight time it stands for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlightStatus {
    pub frame: usize,
    pub elapsed_ms: f64,
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = self.elapsed_ms / 1000.0;
        let hours = (t / 3600.0).floor();
        t -= hours * 3600.0;
        let minutes = (t / 60.0).floor();
        let seconds = t - minutes * 60.0;
        write!(
            f,
            "{:02}:{:02}:{:06.3}    Frame {}",
            hours as u64, minutes as u64, seconds, self.frame
        )
    }
}

/// One played frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlightFrame {
    /// Index of the pose to show.
    pub index: usize,
    pub status: FlightStatus,
    /// A non-looping flight just played its last pose and stopped.
    pub ended: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlan {
    params: FlightParams,
    poses: Vec<ViewpointPose>,
    frame: usize,
    state: PlaybackState,
}

impl FlightPlan {
    pub fn new(params: FlightParams, poses: Vec<ViewpointPose>) -> Self {
        Self {
            params,
            poses,
            frame: 0,
            state: PlaybackState::Idle,
        }
    }

    pub fn params(&self) -> &FlightParams {
        &self.params
    }

    pub fn poses(&self) -> &[ViewpointPose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Index of the next pose to play.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn play(&mut self) {
        if !self.poses.is_empty() {
            self.state = PlaybackState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn rewind(&mut self) {
        self.state = PlaybackState::Idle;
        self.frame = 0;
    }

    pub fn status(&self) -> FlightStatus {
        FlightStatus {
            frame: self.frame,
            elapsed_ms: self.frame as f64 * self.params.millis_per_frame as f64,
        }
    }

    /// Play the current frame and move on; `None` unless playing.
    pub fn advance(&mut self) -> Option<FlightFrame> {
        if self.state != PlaybackState::Playing || self.poses.is_empty() {
            return None;
        }
        let index = self.frame.min(self.poses.len() - 1);
        let status = FlightStatus {
            frame: index,
            elapsed_ms: index as f64 * self.params.millis_per_frame as f64,
        };
        self.frame = index + 1;
        let mut ended = false;
        if self.frame == self.poses.len() {
            self.frame = 0;
            if !self.params.looping {
                self.state = PlaybackState::Idle;
                ended = true;
            }
        }
        Some(FlightFrame {
            index,
            status,
            ended,
        })
    }

    pub fn pose(&self, index: usize) -> Option<&ViewpointPose> {
        self.poses.get(index)
    }
}
