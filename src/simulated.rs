//! In-process stand-in for the motor layer. Commands take effect instantly on the simulated
//! encoders, and everything received is recorded so it can be inspected afterwards.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::arm_error::ArmError;
use crate::group_info::{GroupInfo, POSITION_MODE, TIME_PROFILE};
use crate::transport::{ArmTransport, GroupCommand, JointFeedback, JointStates, MetadataSource,
                       RegisterWrite, SharedJointStates, SingleJointCommand, TrajectoryCommand};

/// Anything published to the simulated arm, in order of arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    Single(SingleJointCommand),
    Group(GroupCommand),
    Trajectory(TrajectoryCommand),
}

pub struct SimulatedArm {
    group: GroupInfo,
    states: SharedJointStates,
    register_writes: Mutex<Vec<RegisterWrite>>,
    published: Mutex<Vec<Published>>,

    /// Number of metadata polls answered with "pending" before the group info is returned.
    pending_polls: AtomicUsize,

    /// If cleared, commands are recorded but the encoders do not move.
    apply_commands: AtomicBool,

    /// Number of upcoming register writes that time out.
    failing_writes: AtomicUsize,
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl SimulatedArm {
    /// Simulated group with all joints resting at the given positions.
    pub fn new(group: GroupInfo, initial: &[f64]) -> Self {
        let states = SharedJointStates::new();
        states.update_all(group.joint_names.iter().map(|n| n.as_str()).zip(initial.iter().copied()));
        SimulatedArm {
            group,
            states,
            register_writes: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            pending_polls: AtomicUsize::new(0),
            apply_commands: AtomicBool::new(true),
            failing_writes: AtomicUsize::new(0),
        }
    }

    pub fn px100() -> Self {
        let group = GroupInfo {
            joint_names: names(&["waist", "shoulder", "elbow", "wrist_angle"]),
            joint_lower_limits: vec![-PI, -1.94, -2.11, -1.75],
            joint_upper_limits: vec![PI, 1.87, 1.6, 2.15],
            joint_velocity_limits: vec![PI; 4],
            joint_sleep_positions: vec![0.0, -1.88, 1.5, 0.8],
            mode: POSITION_MODE.to_string(),
            profile_type: TIME_PROFILE.to_string(),
        };
        Self::new(group, &[0.0; 4])
    }

    pub fn wx200() -> Self {
        let group = GroupInfo {
            joint_names: names(&["waist", "shoulder", "elbow", "wrist_angle", "wrist_rotate"]),
            joint_lower_limits: vec![-PI, -1.88, -1.88, -1.75, -PI],
            joint_upper_limits: vec![PI, 1.99, 1.6, 2.15, PI],
            joint_velocity_limits: vec![PI; 5],
            joint_sleep_positions: vec![0.0, -1.80, 1.55, 0.8, 0.0],
            mode: POSITION_MODE.to_string(),
            profile_type: TIME_PROFILE.to_string(),
        };
        Self::new(group, &[0.0; 5])
    }

    /// Six joint group, matching both wx250s and vx300s descriptions.
    pub fn six_joint() -> Self {
        let group = GroupInfo {
            joint_names: names(&["waist", "shoulder", "elbow", "forearm_roll", "wrist_angle", "wrist_rotate"]),
            joint_lower_limits: vec![-PI, -1.85, -1.76, -PI, -1.75, -PI],
            joint_upper_limits: vec![PI, 1.96, 1.61, PI, 2.15, PI],
            joint_velocity_limits: vec![PI; 6],
            joint_sleep_positions: vec![0.0, -1.80, 1.55, 0.0, 0.8, 0.0],
            mode: POSITION_MODE.to_string(),
            profile_type: TIME_PROFILE.to_string(),
        };
        Self::new(group, &[0.0; 6])
    }

    /// Simulated group for the robot model name, if it is one of the built-in ones.
    pub fn for_model(model: &str) -> Option<Self> {
        match model {
            "px100" => Some(Self::px100()),
            "wx200" => Some(Self::wx200()),
            "wx250s" | "vx300s" => Some(Self::six_joint()),
            _ => None,
        }
    }

    /// Answer the next `polls` metadata requests with "pending".
    pub fn with_pending_polls(self, polls: usize) -> Self {
        self.pending_polls.store(polls, Ordering::SeqCst);
        self
    }

    /// Stop (or resume) moving the simulated encoders when commands arrive.
    pub fn set_apply_commands(&self, apply: bool) {
        self.apply_commands.store(apply, Ordering::SeqCst);
    }

    /// Let the next `count` register writes fail without reaching the drives.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub fn group_info(&self) -> &GroupInfo {
        &self.group
    }

    /// Telemetry side of the simulated encoders.
    pub fn states(&self) -> &SharedJointStates {
        &self.states
    }

    pub fn register_writes(&self) -> Vec<RegisterWrite> {
        self.register_writes.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn trajectories(&self) -> Vec<TrajectoryCommand> {
        self.published().into_iter().filter_map(|p| match p {
            Published::Trajectory(trajectory) => Some(trajectory),
            _ => None,
        }).collect()
    }

    fn record(&self, published: Published) {
        self.published.lock().unwrap_or_else(|p| p.into_inner()).push(published);
    }

    fn applies(&self) -> bool {
        self.apply_commands.load(Ordering::SeqCst)
    }
}

impl ArmTransport for SimulatedArm {
    fn write_register(&self, request: &RegisterWrite) -> Result<(), ArmError> {
        if request.value < 0 {
            return Err(ArmError::Transport(format!("Negative {} value {}", request.register.name(), request.value)));
        }
        let failing = self.failing_writes.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(ArmError::Transport(format!("Timeout writing {}", request.register.name())));
        }
        self.register_writes.lock().unwrap_or_else(|p| p.into_inner()).push(request.clone());
        Ok(())
    }

    fn publish_single(&self, command: &SingleJointCommand) {
        if self.applies() {
            self.states.update(&command.joint, command.position);
        }
        self.record(Published::Single(command.clone()));
    }

    fn publish_group(&self, command: &GroupCommand) {
        if self.applies() {
            self.states.update_all(self.group.joint_names.iter().map(|n| n.as_str())
                .zip(command.positions.iter().copied()));
        }
        self.record(Published::Group(command.clone()));
    }

    fn publish_trajectory(&self, command: &TrajectoryCommand) {
        if self.applies() {
            if let Some(last) = command.waypoints.last() {
                self.states.update_all(command.joint_names.iter().map(|n| n.as_str())
                    .zip(last.positions.iter().copied()));
            }
        }
        self.record(Published::Trajectory(command.clone()));
    }
}

impl MetadataSource for SimulatedArm {
    fn poll_group_info(&self, _group: &str) -> Option<GroupInfo> {
        let pending = self.pending_polls.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_polls.store(pending - 1, Ordering::SeqCst);
            return None;
        }
        Some(self.group.clone())
    }
}

impl JointFeedback for SimulatedArm {
    fn snapshot(&self) -> JointStates {
        self.states.snapshot()
    }
}
