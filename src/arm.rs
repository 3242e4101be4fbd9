//! Arm interface: joint, pose and Cartesian commands for one joint group.
//!
//! [`ArmInterface`] owns the command state and the timing profile of the group, and talks to
//! the motor layer only through the collaborator traits of [`crate::transport`]. Every motion
//! command runs to completion before returning. With `blocking` set, it also waits until the
//! motion is reported complete (or the commanded time has elapsed, depending on the
//! [`MotionWaiter`] in use). Without it, the command state already holds the planned end state
//! while the joints are still moving.

use std::sync::Arc;
use std::time::Duration;

use nalgebra::{Isometry3, Translation3};
use tracing::{debug, error, info, warn};

use crate::arm_error::ArmError;
use crate::command_state::CommandState;
use crate::config::ArmConfig;
use crate::description::RobotDescription;
use crate::group_info::GroupInfo;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::kinematics_impl::PoeKinematics;
use crate::limits::LimitValidator;
use crate::path_plan::cartesian::{CartesianPlanner, CartesianRequest, FULL_DOF};
use crate::pose_solver::PoseSolver;
use crate::seeds::SeedSequence;
use crate::timing::{TimingProfile, TimingProfileManager};
use crate::transport::{ArmTransport, GroupCommand, JointFeedback, MetadataSource, MotionWaiter,
                       NoWait, SingleJointCommand, TrajectoryCommand};
use crate::utils::screw::rpy_to_rotation;

/// The motor layer as seen by the arm interface.
#[derive(Clone)]
pub struct ArmLinks {
    pub transport: Arc<dyn ArmTransport>,
    pub metadata: Arc<dyn MetadataSource>,
    pub feedback: Arc<dyn JointFeedback>,
    pub waiter: Arc<dyn MotionWaiter>,
}

impl ArmLinks {
    /// All collaborators served by the same object, not waiting for motion completion.
    pub fn from_single<T>(arm: Arc<T>) -> Self
    where
        T: ArmTransport + MetadataSource + JointFeedback + 'static,
    {
        ArmLinks {
            transport: arm.clone(),
            metadata: arm.clone(),
            feedback: arm,
            waiter: Arc::new(NoWait),
        }
    }

    pub fn with_waiter(mut self, waiter: Arc<dyn MotionWaiter>) -> Self {
        self.waiter = waiter;
        self
    }
}

/// Timing and waiting options shared by the motion commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOptions {
    /// New moving time (s). Applies to this and all following moves.
    pub moving_time: Option<f64>,

    /// New acceleration time (s). Applies to this and all following moves.
    pub accel_time: Option<f64>,

    /// Wait until the motion completes before returning.
    pub blocking: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        MoveOptions { moving_time: None, accel_time: None, blocking: true }
    }
}

impl MoveOptions {
    /// Keep the current timing, return as soon as the command is sent.
    pub fn non_blocking() -> Self {
        MoveOptions { blocking: false, ..Default::default() }
    }

    pub fn timed(moving_time: f64, accel_time: f64) -> Self {
        MoveOptions { moving_time: Some(moving_time), accel_time: Some(accel_time), blocking: true }
    }
}

pub struct ArmInterface {
    config: ArmConfig,
    group: GroupInfo,
    kinematics: Arc<dyn Kinematics>,
    solver: PoseSolver,
    timing: TimingProfileManager,
    state: CommandState,
    links: ArmLinks,
    configuration_error: Option<ArmError>,
}

impl ArmInterface {
    /// Initialize with the built-in description of `config.robot_model`.
    pub fn initialize(config: ArmConfig, links: ArmLinks) -> Result<Self, ArmError> {
        let description = RobotDescription::by_model(&config.robot_model)
            .ok_or_else(|| ArmError::UnknownModel(config.robot_model.clone()))?;
        let kinematics = PoeKinematics::with_parameters(description, config.ik_parameters());
        Self::initialize_with(config, Arc::new(kinematics), links)
    }

    /// Initialize with the given kinematics. Waits for the group metadata, then seeds the
    /// command state from live feedback and writes the configured timing profile.
    ///
    /// A drive mode the planning does not support is logged and kept as
    /// [`ArmInterface::configuration_error`]; the interface is still constructed.
    pub fn initialize_with(config: ArmConfig, kinematics: Arc<dyn Kinematics>, links: ArmLinks)
                           -> Result<Self, ArmError> {
        let group = Self::fetch_group_info(&config, links.metadata.as_ref())?;
        group.check_lengths()?;
        if kinematics.dof() != group.num_joints() {
            return Err(ArmError::InvalidLength { expected: group.num_joints(), found: kinematics.dof() });
        }

        let configuration_error = group.check_drive_mode().err();
        if let Some(problem) = &configuration_error {
            error!("{}", problem);
        }

        let live = links.feedback.snapshot().ordered(&group.joint_names)?;
        let state = CommandState::new(live, kinematics.as_ref());

        let mut timing = TimingProfileManager::new(links.transport.clone(), &config.group_name, config.timing());
        timing.push_all()?;

        info!(
            "Arm group '{}' initialized: {} joints, moving time {:.2} s, acceleration time {:.2} s",
            config.group_name, group.num_joints(), timing.moving_time(), timing.accel_time()
        );

        let solver = PoseSolver::new(kinematics.clone(), LimitValidator::from_group(&group));
        Ok(ArmInterface { config, group, kinematics, solver, timing, state, links, configuration_error })
    }

    fn fetch_group_info(config: &ArmConfig, metadata: &dyn MetadataSource) -> Result<GroupInfo, ArmError> {
        let mut polls = 0;
        loop {
            if let Some(group) = metadata.poll_group_info(&config.group_name) {
                return Ok(group);
            }
            polls += 1;
            if config.metadata_max_polls.is_some_and(|max| polls >= max) {
                return Err(ArmError::MetadataUnavailable(config.group_name.clone()));
            }
            debug!("Waiting for group info of '{}' ({} polls)", config.group_name, polls);
            std::thread::sleep(config.poll_interval());
        }
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn group_info(&self) -> &GroupInfo {
        &self.group
    }

    pub fn kinematics(&self) -> &Arc<dyn Kinematics> {
        &self.kinematics
    }

    pub fn timing(&self) -> &TimingProfileManager {
        &self.timing
    }

    /// Drive configuration problem found during initialization, if any.
    pub fn configuration_error(&self) -> Option<&ArmError> {
        self.configuration_error.as_ref()
    }

    /// Update moving and acceleration time. Registers are only written for changed values.
    pub fn set_trajectory_time(&mut self, moving_time: Option<f64>, accel_time: Option<f64>)
                               -> Result<(), ArmError> {
        self.timing.set(moving_time, accel_time)
    }

    fn effective_moving_time(&self, options: &MoveOptions) -> f64 {
        options.moving_time.unwrap_or(self.timing.moving_time())
    }

    fn wait(&self, seconds: f64, blocking: bool) {
        if blocking {
            self.links.waiter.wait_for_motion(Duration::from_secs_f64(seconds.max(0.0)));
        }
    }

    fn publish_positions(&mut self, positions: Joints, options: &MoveOptions) -> Result<(), ArmError> {
        debug!("Publishing positions={:?}", positions);
        self.timing.set(options.moving_time, options.accel_time)?;
        let command = GroupCommand { group: self.config.group_name.clone(), positions };
        self.links.waiter.before_dispatch();
        self.links.transport.publish_group(&command);
        self.state.commit(command.positions, self.kinematics.as_ref());
        self.wait(self.timing.moving_time(), options.blocking);
        Ok(())
    }

    fn check_length(&self, found: usize) -> Result<(), ArmError> {
        let expected = self.group.num_joints();
        if found != expected {
            return Err(ArmError::InvalidLength { expected, found });
        }
        Ok(())
    }

    /// Command all joints. Rejected without publishing if any position or the implied
    /// velocity is outside the limits.
    pub fn set_joint_positions(&mut self, positions: &[f64], options: MoveOptions) -> Result<(), ArmError> {
        debug!("Setting joint positions={:?}", positions);
        self.check_length(positions.len())?;
        let moving_time = self.effective_moving_time(&options);
        if !self.solver.limits.compliant(positions, self.state.joints(), moving_time) {
            return Err(ArmError::LimitViolation { last: positions.to_vec() });
        }
        self.publish_positions(positions.to_vec(), &options)
    }

    /// All joints to zero. Not limit checked.
    pub fn go_to_home_pose(&mut self, options: MoveOptions) -> Result<(), ArmError> {
        debug!("Going to home pose");
        self.publish_positions(vec![0.0; self.group.num_joints()], &options)
    }

    /// All joints to the sleep positions of the group. Not limit checked.
    pub fn go_to_sleep_pose(&mut self, options: MoveOptions) -> Result<(), ArmError> {
        debug!("Going to sleep pose");
        self.publish_positions(self.group.joint_sleep_positions.clone(), &options)
    }

    /// Command one joint, the others keep their commanded positions. A changed moving or
    /// acceleration time applies to all joints of the group.
    pub fn set_single_joint_position(&mut self, joint_name: &str, position: f64, options: MoveOptions)
                                     -> Result<(), ArmError> {
        debug!("Setting joint {} to position={}", joint_name, position);
        let joint = self.group.joint_index(joint_name)?;
        let moving_time = self.effective_moving_time(&options);
        if !self.solver.limits.single_compliant(joint, position, self.state.joints(), moving_time)? {
            let mut last = self.state.joints().clone();
            last[joint] = position;
            return Err(ArmError::LimitViolation { last });
        }
        self.timing.set(options.moving_time, options.accel_time)?;
        let command = SingleJointCommand { joint: joint_name.to_string(), position };
        self.links.waiter.before_dispatch();
        self.links.transport.publish_single(&command);
        self.state.commit_single(joint, position, self.kinematics.as_ref());
        self.wait(self.timing.moving_time(), options.blocking);
        Ok(())
    }

    /// Solve for the end effector pose `t_sd` in the space frame and, if `execute` is set,
    /// move there. Seeds are tried in order home, base turned -120°, base turned +120°,
    /// then `custom_guess`. Returns the joints of the solution.
    pub fn set_ee_pose_matrix(&mut self, t_sd: &Pose, custom_guess: Option<&[f64]>, execute: bool,
                              options: MoveOptions) -> Result<Joints, ArmError> {
        debug!("Setting ee_pose to {:?}", t_sd);
        if let Some(guess) = custom_guess {
            self.check_length(guess.len())?;
        }
        let seeds = SeedSequence::canonical(self.group.num_joints(), custom_guess);
        let moving_time = self.effective_moving_time(&options);
        let joints = match self.solver.solve(t_sd, seeds, self.state.joints(), moving_time) {
            Ok(joints) => joints,
            Err(failure) => {
                warn!("No valid pose could be found. Will not execute ({})", failure);
                return Err(failure);
            }
        };
        if execute {
            self.publish_positions(joints.clone(), &options)?;
        }
        Ok(joints)
    }

    /// Same as [`ArmInterface::set_ee_pose_matrix`] for a pose given as position and roll,
    /// pitch, yaw about the fixed axes. Chains with fewer than 6 joints cannot choose their
    /// yaw freely, so it is always `atan2(y, x)` for them, and also when `yaw` is not given.
    #[allow(clippy::too_many_arguments)]
    pub fn set_ee_pose_components(&mut self, x: f64, y: f64, z: f64, roll: f64, pitch: f64,
                                  yaw: Option<f64>, custom_guess: Option<&[f64]>, execute: bool,
                                  options: MoveOptions) -> Result<Joints, ArmError> {
        let yaw = match yaw {
            Some(yaw) if self.group.num_joints() >= FULL_DOF => yaw,
            _ => y.atan2(x),
        };
        let t_sd = Isometry3::from_parts(Translation3::new(x, y, z), rpy_to_rotation(roll, pitch, yaw));
        self.set_ee_pose_matrix(&t_sd, custom_guess, execute, options)
    }

    /// Move the end effector along a straight line (and rotate it) by the displacement of the
    /// request, relative to the current yaw. Nothing moves unless every waypoint is solved.
    ///
    /// The trajectory runs with the waypoint timing of the request; the previous timing
    /// profile is restored afterwards. Its first waypoint is replaced by the live joint
    /// positions, so the motion starts from where the joints really are.
    pub fn set_ee_cartesian_trajectory(&mut self, request: &CartesianRequest, blocking: bool)
                                       -> Result<Joints, ArmError> {
        debug!("Setting ee trajectory to components {:?}", request);
        let planner = CartesianPlanner { solver: &self.solver, check_moving_time: self.timing.moving_time() };
        let mut plan = planner.plan(request, self.state.joints(), self.state.pose(), self.timing.moving_time())?;

        let live = self.links.feedback.snapshot().ordered(&self.group.joint_names)?;
        if let Some(first) = plan.waypoints.first_mut() {
            first.positions = live;
        }

        let restore = self.timing.current();
        if let Err(failure) = self.timing.set(Some(request.wp_moving_time), Some(request.wp_accel_time)) {
            warn!("Could not switch to waypoint timing, trajectory not dispatched ({})", failure);
            self.restore_timing(restore);
            return Err(failure);
        }
        let command = TrajectoryCommand {
            group: self.config.group_name.clone(),
            joint_names: self.group.joint_names.clone(),
            waypoints: plan.waypoints,
        };
        self.links.waiter.before_dispatch();
        self.links.transport.publish_trajectory(&command);
        self.wait(plan.moving_time + request.wp_moving_time, blocking);

        self.state.commit_with_pose(plan.final_joints.clone(), plan.final_pose);
        self.restore_timing(restore);
        Ok(plan.final_joints)
    }

    /// Best effort return to an earlier profile. On failure the timing manager keeps the
    /// profile the drives still use, and the next move with explicit timing rewrites it.
    fn restore_timing(&mut self, restore: TimingProfile) {
        if let Err(failure) = self.timing.set(Some(restore.moving_time), Some(restore.accel_time)) {
            error!("Could not restore timing {:?}: {}", restore, failure);
        }
    }

    /// Latest commanded joint positions.
    pub fn joint_commands(&self) -> &Joints {
        self.state.joints()
    }

    pub fn single_joint_command(&self, joint_name: &str) -> Result<f64, ArmError> {
        let joint = self.group.joint_index(joint_name)?;
        Ok(self.state.joints()[joint])
    }

    /// Latest commanded end effector pose.
    pub fn ee_pose_command(&self) -> &Pose {
        self.state.pose()
    }

    /// End effector pose computed from the live joint positions.
    pub fn live_ee_pose(&self) -> Result<Pose, ArmError> {
        let live = self.links.feedback.snapshot().ordered(&self.group.joint_names)?;
        Ok(self.kinematics.forward(&live))
    }

    /// Reset the commanded joints to the live positions, for example after the motors were
    /// torqued off and on again.
    pub fn capture_joint_positions(&mut self) -> Result<(), ArmError> {
        debug!("Capturing joint positions");
        let live = self.links.feedback.snapshot().ordered(&self.group.joint_names)?;
        self.state.commit(live, self.kinematics.as_ref());
        Ok(())
    }
}
