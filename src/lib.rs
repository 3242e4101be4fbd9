//! Motion planning core for serial-link arms driven by time based motion profiles.
//!
//! The arm is described in product of exponentials form: the end effector pose at zero and
//! one screw axis per joint, all in the fixed space frame. On top of this description the
//! crate provides
//!
//! - Forward kinematics, and Newton-Raphson inverse kinematics that tries several seeds in a
//!   fixed order until it finds a solution that converges and stays within the joint limits.
//! - Full-turn normalization of revolute joint solutions before the limit checks.
//! - Joint position and velocity limit checks, made at milliradian precision.
//! - Bookkeeping of the moving and acceleration time that only writes the drive registers
//!   when a value really changes.
//! - Cartesian trajectories: a straight line displacement of the end effector split into
//!   waypoints, each solved from the previous one. The trajectory is either fully planned and
//!   dispatched, or not dispatched at all and the planned share reported.
//!
//! The motor layer is not part of this crate. [`arm::ArmInterface`] talks to it through the
//! traits of [`transport`], and [`simulated::SimulatedArm`] stands in for it in the demo
//! binary and in tests.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use rs_arm_motion::arm::{ArmInterface, ArmLinks, MoveOptions};
//! use rs_arm_motion::config::ArmConfig;
//! use rs_arm_motion::path_plan::cartesian::CartesianRequest;
//! use rs_arm_motion::simulated::SimulatedArm;
//!
//! let sim = Arc::new(SimulatedArm::wx200());
//! let mut arm = ArmInterface::initialize(ArmConfig::default(), ArmLinks::from_single(sim)).unwrap();
//! arm.set_joint_positions(&[0.0, -0.3, 0.5, 0.3, 0.0], MoveOptions::default()).unwrap();
//! let request = CartesianRequest { z: -0.03, moving_time: Some(1.0), ..Default::default() };
//! let joints = arm.set_ee_cartesian_trajectory(&request, true).unwrap();
//! assert_eq!(joints.len(), 5);
//! ```

pub mod kinematic_traits;
pub mod kinematics_impl;
pub mod description;
pub mod description_robots;

#[cfg(feature = "allow_filesystem")]
pub mod description_from_file;

#[path = "utils/utils.rs"]
pub mod utils;

pub mod jacobian;
pub mod arm_error;
pub mod group_info;
pub mod limits;
pub mod seeds;
pub mod pose_solver;
pub mod command_state;
pub mod transport;
pub mod timing;
pub mod config;

pub mod path_plan {
    #[path = "cartesian.rs"]
    pub mod cartesian;
}

pub mod arm;
pub mod simulated;

#[cfg(test)]
mod tests;
