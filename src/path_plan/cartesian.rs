//! Cartesian trajectory planning

use std::time::Duration;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::arm_error::ArmError;
use crate::kinematic_traits::{Joints, Pose};
use crate::pose_solver::PoseSolver;
use crate::seeds::SeedSequence;
use crate::transport::TrajectoryWaypoint;
use crate::utils::screw::{rotation_to_rpy, rpy_to_rotation};

/// Chains with fewer joints than this cannot move sideways or yaw without also changing
/// something else.
pub const FULL_DOF: usize = 6;

/// Displacement of the end effector, relative to the frame that sits at the current end
/// effector position with its z axis vertical and its x axis along the current yaw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianRequest {
    /// Displacement along the yaw aligned x axis (m).
    pub x: f64,
    /// Displacement along the yaw aligned y axis (m). Needs a 6 joint chain.
    pub y: f64,
    /// Displacement along the vertical axis (m).
    pub z: f64,
    /// Change of roll (rad).
    pub roll: f64,
    /// Change of pitch (rad).
    pub pitch: f64,
    /// Change of yaw (rad). Needs a 6 joint chain.
    pub yaw: f64,

    /// Duration of the whole trajectory (s). If not set, the current moving time of the arm.
    pub moving_time: Option<f64>,

    /// Moving time of the profile used while the trajectory executes (s).
    pub wp_moving_time: f64,

    /// Acceleration time of the profile used while the trajectory executes (s).
    pub wp_accel_time: f64,

    /// Time between waypoints (s).
    pub wp_period: f64,
}

impl Default for CartesianRequest {
    fn default() -> Self {
        CartesianRequest {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            moving_time: None,
            wp_moving_time: 0.2,
            wp_accel_time: 0.1,
            wp_period: 0.05,
        }
    }
}

/// Upper bound on the number of waypoints of one trajectory.
pub const MAX_STEPS: usize = 100_000;

impl CartesianRequest {
    /// Number of planned steps for the given total duration.
    pub fn steps(&self, moving_time: f64) -> Result<usize, ArmError> {
        let positive = |t: f64| t.is_finite() && t > 0.0;
        if !positive(self.wp_period) || !positive(moving_time) {
            return Err(ArmError::InvalidTiming(format!(
                "moving time {} and waypoint period {} must both be positive and finite",
                moving_time, self.wp_period
            )));
        }
        // Tolerance so that 2.0 / 0.05 yields 40 steps and not 39
        let ratio = (moving_time / self.wp_period + 1e-9).floor();
        if ratio > MAX_STEPS as f64 {
            return Err(ArmError::InvalidTiming(format!(
                "moving time {} needs more than {} waypoints of {} s",
                moving_time, MAX_STEPS, self.wp_period
            )));
        }
        let steps = ratio as usize;
        if steps == 0 {
            return Err(ArmError::InvalidTiming(format!(
                "moving time {} is shorter than waypoint period {}",
                moving_time, self.wp_period
            )));
        }
        Ok(steps)
    }
}

/// Fully solved trajectory that has not been dispatched yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrajectory {
    /// Starts with the starting joints at time 0, then one waypoint per step.
    pub waypoints: Vec<TrajectoryWaypoint>,

    /// Joints of the last waypoint.
    pub final_joints: Joints,

    /// End effector target of the last step.
    pub final_pose: Pose,

    /// Total duration (s).
    pub moving_time: f64,
}

/// Turns a Cartesian displacement into joint waypoints, each solved from the previous one.
pub struct CartesianPlanner<'a> {
    pub solver: &'a PoseSolver,

    /// Moving time the limit checks use for the velocity bound.
    pub check_moving_time: f64,
}

impl CartesianPlanner<'_> {
    /// Rejects displacements along axes the chain cannot actuate independently. Runs before
    /// anything is solved.
    pub fn check_dof(dof: usize, request: &CartesianRequest) -> Result<(), ArmError> {
        if dof < FULL_DOF {
            if request.y != 0.0 {
                return Err(ArmError::UnsupportedDof { dof, axis: "y" });
            }
            if request.yaw != 0.0 {
                return Err(ArmError::UnsupportedDof { dof, axis: "yaw" });
            }
        }
        Ok(())
    }

    /// Plan the displacement from the given start. Limit checks are made against
    /// `start_joints`, which is also the seed of the first step.
    ///
    /// If step `i` of `N` cannot be solved, the plan is abandoned and
    /// [`ArmError::PartialPlan`] reports `i` of `N`.
    pub fn plan(
        &self,
        request: &CartesianRequest,
        start_joints: &[f64],
        start_pose: &Pose,
        default_moving_time: f64,
    ) -> Result<PlannedTrajectory, ArmError> {
        let dof = self.solver.kinematics.dof();
        if let Err(error) = Self::check_dof(dof, request) {
            warn!("{}", error);
            return Err(error);
        }

        let moving_time = request.moving_time.unwrap_or(default_moving_time);
        let steps = request.steps(moving_time)?;
        debug!("Planning Cartesian trajectory {:?} in {} steps", request, steps);

        // Yaw is applied in the space frame, everything else relative to the yaw aligned frame
        let (mut roll, mut pitch, yaw) = rotation_to_rpy(&start_pose.rotation);
        let t_sy = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw),
        );
        let mut t_yb = t_sy.inverse() * start_pose;
        let mut relative_yaw = 0.0;

        let increment = 1.0 / steps as f64;
        let delta = Vector3::new(request.x, request.y, request.z) * increment;

        let mut waypoints = Vec::with_capacity(steps + 1);
        waypoints.push(TrajectoryWaypoint {
            positions: start_joints.to_vec(),
            time_from_start: Duration::ZERO,
        });
        let mut previous: Joints = start_joints.to_vec();
        let mut target = *start_pose;

        for step in 0..steps {
            t_yb.translation.vector += delta;
            roll += increment * request.roll;
            pitch += increment * request.pitch;
            relative_yaw += increment * request.yaw;
            t_yb.rotation = rpy_to_rotation(roll, pitch, relative_yaw);
            target = t_sy * t_yb;

            match self.solver.solve(&target, SeedSequence::continuing(&previous),
                                    start_joints, self.check_moving_time) {
                Ok(joints) => {
                    previous = joints;
                    waypoints.push(TrajectoryWaypoint {
                        positions: previous.clone(),
                        time_from_start: Duration::from_secs_f64((step + 1) as f64 * request.wp_period),
                    });
                }
                Err(failure) => {
                    let error = ArmError::PartialPlan { completed: step, planned: steps };
                    warn!("{} ({})", error, failure);
                    return Err(error);
                }
            }
        }

        Ok(PlannedTrajectory {
            waypoints,
            final_joints: previous,
            final_pose: target,
            moving_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::RobotDescription;
    use crate::kinematic_traits::Kinematics;
    use crate::kinematics_impl::PoeKinematics;
    use crate::limits::LimitValidator;
    use crate::utils::assert_pose_eq;
    use std::f64::consts::PI;
    use std::sync::Arc;

    fn solver(description: RobotDescription) -> PoseSolver {
        let dof = description.dof();
        PoseSolver::new(
            Arc::new(PoeKinematics::new(description)),
            LimitValidator::new(vec![-PI; dof], vec![PI; dof], vec![PI; dof]),
        )
    }

    #[test]
    fn test_steps() {
        let request = CartesianRequest::default();
        assert_eq!(request.steps(2.0).unwrap(), 40);
        assert_eq!(request.steps(0.5).unwrap(), 10);
        assert!(matches!(request.steps(0.01), Err(ArmError::InvalidTiming(_))));
        let broken = CartesianRequest { wp_period: 0.0, ..Default::default() };
        assert!(matches!(broken.steps(2.0), Err(ArmError::InvalidTiming(_))));
    }

    #[test]
    fn test_steps_reject_unbounded_times() {
        let request = CartesianRequest::default();
        assert!(matches!(request.steps(f64::INFINITY), Err(ArmError::InvalidTiming(_))));
        assert!(matches!(request.steps(f64::NAN), Err(ArmError::InvalidTiming(_))));
        assert!(matches!(request.steps(1.0e9), Err(ArmError::InvalidTiming(_))));
        assert_eq!(request.steps(MAX_STEPS as f64 * 0.05).unwrap(), MAX_STEPS);
        let broken = CartesianRequest { wp_period: f64::INFINITY, ..Default::default() };
        assert!(matches!(broken.steps(2.0), Err(ArmError::InvalidTiming(_))));
    }

    #[test]
    fn test_five_joint_dof_guard() {
        let sideways = CartesianRequest { y: 0.01, ..Default::default() };
        let turning = CartesianRequest { yaw: 0.1, ..Default::default() };
        assert!(matches!(CartesianPlanner::check_dof(5, &sideways),
            Err(ArmError::UnsupportedDof { dof: 5, axis: "y" })));
        assert!(matches!(CartesianPlanner::check_dof(5, &turning),
            Err(ArmError::UnsupportedDof { dof: 5, axis: "yaw" })));
        assert!(CartesianPlanner::check_dof(6, &sideways).is_ok());
        assert!(CartesianPlanner::check_dof(4, &CartesianRequest { z: 0.1, ..Default::default() }).is_ok());
    }

    #[test]
    fn test_vertical_move_wx200() {
        let solver = solver(RobotDescription::wx200());
        let start = vec![0.0, -0.3, 0.5, 0.3, 0.0];
        let start_pose = solver.kinematics.forward(&start);
        let planner = CartesianPlanner { solver: &solver, check_moving_time: 2.0 };
        let request = CartesianRequest { z: -0.05, moving_time: Some(1.0), ..Default::default() };

        let plan = planner.plan(&request, &start, &start_pose, 2.0).unwrap();
        assert_eq!(plan.waypoints.len(), 21);
        assert_eq!(plan.waypoints[0].positions, start);
        assert_eq!(plan.waypoints[20].time_from_start, Duration::from_secs_f64(1.0));

        let expected = Isometry3::from_parts(
            Translation3::from(start_pose.translation.vector + Vector3::new(0.0, 0.0, -0.05)),
            start_pose.rotation,
        );
        assert_pose_eq(&plan.final_pose, &expected, 1e-9, 1e-9);
        assert_pose_eq(&solver.kinematics.forward(&plan.final_joints), &expected, 0.002, 0.002);
    }

    #[test]
    fn test_forward_move_follows_yaw() {
        // Waist turned by 90°: moving "forward" goes along the space y axis
        let solver = solver(RobotDescription::wx250s());
        let start = vec![PI / 2.0, -0.2, 0.4, 0.0, 0.3, 0.0];
        let start_pose = solver.kinematics.forward(&start);
        let planner = CartesianPlanner { solver: &solver, check_moving_time: 2.0 };
        let request = CartesianRequest { x: 0.04, moving_time: Some(0.5), ..Default::default() };

        let plan = planner.plan(&request, &start, &start_pose, 2.0).unwrap();
        let moved = plan.final_pose.translation.vector - start_pose.translation.vector;
        assert!((moved - Vector3::new(0.0, 0.04, 0.0)).norm() < 1e-9, "{:?}", moved);
        assert!(crate::utils::pose_distance(&start_pose, &plan.final_pose).1 < 1e-9);
    }
}
