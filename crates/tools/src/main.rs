use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use foundation::math::Vec3;
use navigation::{
    FlightParams, FlightPlan, NavigatorConfig, PickHit, ViewpointNavigator, ViewpointPose,
};
use projection::{CoordinateProjector, ProjectionMetadata};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod offline;

use offline::{FrameLog, OfflineRig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terrain georeferencing and viewpoint flight tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a local render point to world and lon/lat coordinates
    #[command(allow_negative_numbers = true)]
    Locate {
        /// Raster projection metadata (JSON)
        #[arg(long)]
        metadata: PathBuf,

        x: f64,
        y: f64,
        #[arg(default_value_t = 0.0)]
        z: f64,
    },

    /// Plan an arc-length flight through saved viewpoints
    FlyViewpoints {
        /// Viewpoint list (JSON array of poses)
        #[arg(long)]
        viewpoints: PathBuf,

        #[command(flatten)]
        flight: FlightArgs,
    },

    /// Plan a flight following a curve of [x, y, z] points
    FlyPath {
        /// Curve points (JSON array of [x, y, z])
        #[arg(long)]
        curve: PathBuf,

        /// Camera height above the curve
        #[arg(long, default_value_t = 0.0)]
        height: f64,

        #[command(flatten)]
        flight: FlightArgs,
    },
}

#[derive(Args, Debug)]
struct FlightArgs {
    #[arg(long, default_value_t = 100)]
    frames: usize,

    #[arg(long, default_value_t = 100)]
    millis_per_frame: u64,

    #[arg(long = "loop")]
    looping: bool,

    /// Capture frames into this directory during playback
    #[arg(long)]
    grab: Option<PathBuf>,

    /// Write the flight here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Play the flight once offline, logging each frame status
    #[arg(long)]
    play: bool,
}

impl FlightArgs {
    fn params(&self, path_height: f64) -> FlightParams {
        FlightParams {
            num_frames: self.frames,
            millis_per_frame: self.millis_per_frame,
            looping: self.looping,
            grab: self.grab.is_some(),
            image_sequence_path: self.grab.clone(),
            path_height,
        }
    }
}

#[derive(Serialize, Debug)]
struct LocateReport {
    transform: String,
    transform_code: Option<u16>,
    globe: String,
    local: [f64; 3],
    world: [f64; 3],
    lon: f64,
    lat: f64,
}

#[derive(Serialize, Debug)]
struct FlightDocument<'a> {
    params: &'a FlightParams,
    poses: &'a [ViewpointPose],
}

type OfflineNavigator = ViewpointNavigator<OfflineRig, fn(f64, f64) -> Option<PickHit>, FrameLog>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Locate { metadata, x, y, z } => cmd_locate(&metadata, Vec3::new(x, y, z)),
        Command::FlyViewpoints { viewpoints, flight } => cmd_fly_viewpoints(&viewpoints, &flight),
        Command::FlyPath {
            curve,
            height,
            flight,
        } => cmd_fly_path(&curve, height, &flight),
    }
}

fn cmd_locate(metadata_path: &Path, local: Vec3) -> Result<(), String> {
    let payload = read_text(metadata_path)?;
    let metadata = ProjectionMetadata::from_json_str(&payload)
        .map_err(|e| format!("{}: {e}", metadata_path.display()))?;
    let report = locate(metadata, local)?;
    let json = serde_json::to_string_pretty(&report).map_err(|e| format!("json: {e}"))?;
    println!("{json}");
    Ok(())
}

fn locate(metadata: ProjectionMetadata, local: Vec3) -> Result<LocateReport, String> {
    let mut projector = CoordinateProjector::new(metadata);
    let mut world = local;
    projector.local_to_world(&mut world);
    let mut spherical = world;
    projector
        .world_to_spherical(&mut spherical)
        .map_err(|e| format!("locate: {e}"))?;
    Ok(LocateReport {
        transform: projector.transform_name().to_string(),
        transform_code: projector.metadata().coord_transform_code(),
        globe: projector.globe_name().to_string(),
        local: local.as_array(),
        world: world.as_array(),
        lon: spherical.x,
        lat: spherical.y,
    })
}

fn cmd_fly_viewpoints(viewpoints_path: &Path, args: &FlightArgs) -> Result<(), String> {
    let payload = read_text(viewpoints_path)?;
    let poses: Vec<ViewpointPose> = serde_json::from_str(&payload)
        .map_err(|e| format!("{}: {e}", viewpoints_path.display()))?;

    let mut nav = offline_navigator()?;
    nav.set_viewpoints(poses);
    if !nav.fly_viewpoints(args.params(0.0)) {
        return Err(format!(
            "nothing to fly: need at least 2 viewpoints and 2 frames (got {} and {})",
            nav.viewpoint_count(),
            args.frames
        ));
    }
    finish_flight(&mut nav, args)
}

fn cmd_fly_path(curve_path: &Path, height: f64, args: &FlightArgs) -> Result<(), String> {
    let payload = read_text(curve_path)?;
    let points: Vec<[f64; 3]> = serde_json::from_str(&payload)
        .map_err(|e| format!("{}: {e}", curve_path.display()))?;
    let curve: Vec<Vec3> = points.into_iter().map(Vec3::from_array).collect();

    let mut nav = offline_navigator()?;
    if !nav.fly_path(&curve, args.params(height)) {
        return Err(format!("{}: curve has no points", curve_path.display()));
    }
    finish_flight(&mut nav, args)
}

fn offline_navigator() -> Result<OfflineNavigator, String> {
    let config = NavigatorConfig::from_env().map_err(|e| e.to_string())?;
    let no_terrain: fn(f64, f64) -> Option<PickHit> = |_, _| None;
    Ok(ViewpointNavigator::new(
        OfflineRig::default(),
        no_terrain,
        FrameLog::default(),
        config,
    ))
}

fn finish_flight(nav: &mut OfflineNavigator, args: &FlightArgs) -> Result<(), String> {
    if args.play {
        play_once(nav);
    }
    let plan = nav
        .flight_plan()
        .ok_or_else(|| "flight plan missing".to_string())?;
    write_flight(plan, args.out.as_deref())
}

/// Tick through every pose of the plan once.
fn play_once(nav: &mut OfflineNavigator) {
    let len = nav.flight_plan().map_or(0, FlightPlan::len);
    if !nav.start_flight() {
        return;
    }
    for _ in 0..len {
        match nav.flight_tick() {
            Some(status) => info!("{status}"),
            None => break,
        }
    }
    nav.stop_flight();
    info!(frames = nav.scene().frames, "offline playback done");
}

fn write_flight(plan: &FlightPlan, out: Option<&Path>) -> Result<(), String> {
    let doc = FlightDocument {
        params: plan.params(),
        poses: plan.poses(),
    };
    let json = serde_json::to_string_pretty(&doc).map_err(|e| format!("json: {e}"))?;
    match out {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("write {path:?}: {e}"))?;
            eprintln!("wrote {} ({} poses)", path.display(), plan.len());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))
}
