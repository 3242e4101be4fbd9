//! Interfaces of the motor layer the motion core talks to.
//!
//! The core never drives motors itself. It writes profile registers and publishes commands
//! through [`ArmTransport`], reads the group metadata through [`MetadataSource`], samples
//! encoder feedback through [`JointFeedback`] and learns that a motion has finished through
//! a [`MotionWaiter`].

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::arm_error::ArmError;
use crate::group_info::GroupInfo;
use crate::kinematic_traits::Joints;

/// Motor registers the timing profile is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileRegister {
    /// Moving time in milliseconds when the drive runs a time based profile.
    ProfileVelocity,
    /// Acceleration time in milliseconds when the drive runs a time based profile.
    ProfileAcceleration,
}

impl ProfileRegister {
    /// Register name as known by the motor layer.
    pub fn name(&self) -> &'static str {
        match self {
            ProfileRegister::ProfileVelocity => "Profile_Velocity",
            ProfileRegister::ProfileAcceleration => "Profile_Acceleration",
        }
    }
}

/// Request to write a profile register of the whole group.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterWrite {
    pub group: String,
    pub register: ProfileRegister,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleJointCommand {
    pub joint: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupCommand {
    pub group: String,
    pub positions: Joints,
}

/// One point of a joint trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryWaypoint {
    pub positions: Joints,
    pub time_from_start: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryCommand {
    pub group: String,
    pub joint_names: Vec<String>,
    pub waypoints: Vec<TrajectoryWaypoint>,
}

/// Command side of the motor layer. Register writes are request/response, the
/// rest is fire-and-forget.
pub trait ArmTransport: Send + Sync {
    fn write_register(&self, request: &RegisterWrite) -> Result<(), ArmError>;
    fn publish_single(&self, command: &SingleJointCommand);
    fn publish_group(&self, command: &GroupCommand);
    fn publish_trajectory(&self, command: &TrajectoryCommand);
}

/// One-time asynchronous group metadata query.
pub trait MetadataSource: Send + Sync {
    /// Returns the group information once available, `None` while the request is pending.
    fn poll_group_info(&self, group: &str) -> Option<GroupInfo>;
}

/// Immutable copy of the measured joint positions, by joint name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointStates {
    positions: HashMap<String, f64>,
}

impl JointStates {
    pub fn new(positions: HashMap<String, f64>) -> Self {
        JointStates { positions }
    }

    pub fn position(&self, joint: &str) -> Option<f64> {
        self.positions.get(joint).copied()
    }

    /// Positions of the named joints in the given order.
    pub fn ordered(&self, names: &[String]) -> Result<Joints, ArmError> {
        names.iter()
            .map(|name| self.position(name).ok_or_else(|| ArmError::MissingJointState(name.clone())))
            .collect()
    }
}

/// Access to live encoder feedback that an independent producer keeps updating.
pub trait JointFeedback: Send + Sync {
    fn snapshot(&self) -> JointStates;
}

/// Mutex guarded joint states. The telemetry side calls [`SharedJointStates::update`],
/// the motion core only ever sees copies.
#[derive(Debug, Default, Clone)]
pub struct SharedJointStates {
    inner: Arc<Mutex<HashMap<String, f64>>>,
}

impl SharedJointStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, joint: &str, position: f64) {
        let mut positions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        positions.insert(joint.to_string(), position);
    }

    pub fn update_all<'a>(&self, states: impl IntoIterator<Item=(&'a str, f64)>) {
        let mut positions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for (joint, position) in states {
            positions.insert(joint.to_string(), position);
        }
    }
}

impl JointFeedback for SharedJointStates {
    fn snapshot(&self) -> JointStates {
        let positions = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        JointStates::new(positions.clone())
    }
}

/// How a blocking command learns that the physical motion has finished.
pub trait MotionWaiter: Send + Sync {
    /// Called right before a command is published, so completions of earlier motions are
    /// not mistaken for the one about to start.
    fn before_dispatch(&self) {}

    /// Block until the motion commanded for `duration` is complete.
    fn wait_for_motion(&self, duration: Duration);
}

/// Returns immediately. For simulation and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWait;

impl MotionWaiter for NoWait {
    fn wait_for_motion(&self, _duration: Duration) {}
}

/// Sleeps for the commanded duration.
#[deprecated(note = "Blind sleeping; prefer CompletionSignal notified by the motor layer")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepWaiter;

#[allow(deprecated)]
impl MotionWaiter for SleepWaiter {
    fn wait_for_motion(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct SignalState {
    completions: u64,
    dispatched_at: u64,
}

/// Completion notification satisfied by the motor layer when a move truly finishes.
/// The commanded duration times `ceiling_factor` is the timeout ceiling of each wait.
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    state: Arc<(Mutex<SignalState>, Condvar)>,
    ceiling_factor: f64,
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CompletionSignal {
    pub fn new(ceiling_factor: f64) -> Self {
        CompletionSignal {
            state: Arc::new((Mutex::new(SignalState::default()), Condvar::new())),
            ceiling_factor,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SignalState> {
        self.state.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called by the motor layer when the motion in progress has completed.
    pub fn notify(&self) {
        let mut state = self.lock();
        state.completions += 1;
        self.state.1.notify_all();
    }

    /// Number of completions reported so far.
    pub fn completions(&self) -> u64 {
        self.lock().completions
    }

    /// Waits for a completion reported after the last dispatch. Returns false on timeout.
    fn wait_until_completed(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.completions <= state.dispatched_at {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self.state.1
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state = guard;
        }
        true
    }
}

impl MotionWaiter for CompletionSignal {
    fn before_dispatch(&self) {
        let mut state = self.lock();
        state.dispatched_at = state.completions;
    }

    fn wait_for_motion(&self, duration: Duration) {
        let ceiling = duration.mul_f64(self.ceiling_factor);
        if !self.wait_until_completed(ceiling) {
            tracing::debug!("Motion completion not signalled within {:?}", ceiling);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_a_copy() {
        let states = SharedJointStates::new();
        states.update_all([("waist", 0.1), ("shoulder", -0.2)]);
        let snapshot = states.snapshot();
        states.update("waist", 0.5);
        assert_eq!(snapshot.position("waist"), Some(0.1));
        assert_eq!(states.snapshot().position("waist"), Some(0.5));
    }

    #[test]
    fn test_ordered_positions() {
        let states = SharedJointStates::new();
        states.update_all([("waist", 0.1), ("shoulder", -0.2)]);
        let names = vec!["shoulder".to_string(), "waist".to_string()];
        assert_eq!(states.snapshot().ordered(&names).unwrap(), vec![-0.2, 0.1]);

        let missing = vec!["elbow".to_string()];
        assert!(matches!(states.snapshot().ordered(&missing), Err(ArmError::MissingJointState(_))));
    }

    #[test]
    fn test_completion_signal_wakes_waiter() {
        let signal = CompletionSignal::new(100.0);
        let notifier = signal.clone();
        signal.before_dispatch();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            notifier.notify();
        });
        let started = Instant::now();
        signal.wait_for_motion(Duration::from_secs(1));
        handle.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(50));
        assert_eq!(signal.completions(), 1);
    }

    #[test]
    fn test_completion_signal_times_out() {
        let signal = CompletionSignal::new(1.0);
        signal.notify(); // belongs to an earlier motion
        signal.before_dispatch();
        let started = Instant::now();
        signal.wait_for_motion(Duration::from_millis(30));
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(signal.completions(), 1);
    }
}
