use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use rs_arm_motion::arm::{ArmInterface, ArmLinks, MoveOptions};
use rs_arm_motion::config::ArmConfig;
use rs_arm_motion::path_plan::cartesian::CartesianRequest;
use rs_arm_motion::simulated::SimulatedArm;
use rs_arm_motion::utils::{dump_joints, dump_pose};

/// Plans and runs a Cartesian displacement on a simulated arm.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Robot model (px100, wx200, wx250s, vx300s). Overrides the configuration file.
    #[arg(long)]
    model: Option<String>,

    /// YAML file with the arm configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Joint positions to start from, in degrees, comma separated.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    start: Option<Vec<f64>>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dx: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dy: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dz: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    droll: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dpitch: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dyaw: f64,

    /// Duration of the displacement (s). Defaults to the moving time of the arm.
    #[arg(long)]
    moving_time: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ArmConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => ArmConfig::default(),
    };
    if let Some(model) = &args.model {
        config.robot_model = model.clone();
    }

    let sim = Arc::new(SimulatedArm::for_model(&config.robot_model)
        .with_context(|| format!("No simulated arm for model '{}'", config.robot_model))?);
    let mut arm = ArmInterface::initialize(config, ArmLinks::from_single(sim))?;

    let start: Vec<f64> = match &args.start {
        Some(degrees) => degrees.iter().map(|d| d.to_radians()).collect(),
        None => arm.group_info().joint_names.iter().map(|_| 0.0).collect(),
    };
    arm.set_joint_positions(&start, MoveOptions::default())?;

    println!("Starting from:");
    dump_joints(arm.joint_commands());
    dump_pose(arm.ee_pose_command());

    let request = CartesianRequest {
        x: args.dx,
        y: args.dy,
        z: args.dz,
        roll: args.droll,
        pitch: args.dpitch,
        yaw: args.dyaw,
        moving_time: args.moving_time,
        ..arm.config().cartesian_request()
    };
    match arm.set_ee_cartesian_trajectory(&request, true) {
        Ok(joints) => {
            println!("Arrived at:");
            dump_joints(&joints);
            dump_pose(arm.ee_pose_command());
        }
        Err(error) => {
            println!("Trajectory not executed: {}", error);
            if let Some(fraction) = error.completed_fraction() {
                println!("Planned {:.1}% before failing", fraction * 100.0);
            }
        }
    }
    Ok(())
}
