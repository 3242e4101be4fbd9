//! Helpers shared by the pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nalgebra::{Isometry3, Translation3};

use crate::group_info::{GroupInfo, POSITION_MODE, TIME_PROFILE};
use crate::kinematic_traits::{IkSolution, Joints, Kinematics, Pose};
use crate::transport::MotionWaiter;
use crate::utils::pose_distance;
use crate::utils::screw::{rotation_to_rpy, rpy_to_rotation};

/// Panics with both vectors printed if any joint differs by more than `tolerance` (rad).
pub fn assert_joints_approx_eq(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "Joint count differs: {:?} vs {:?}", actual, expected);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        if (a - e).abs() > tolerance {
            panic!("Joint {} differs: {:?} vs expected {:?}", i, actual, expected);
        }
    }
}

/// Wraps other kinematics and counts the inverse kinematics calls.
pub struct CountingKinematics {
    inner: Arc<dyn Kinematics>,
    inverse_calls: AtomicUsize,
}

impl CountingKinematics {
    pub fn new(inner: Arc<dyn Kinematics>) -> Self {
        CountingKinematics { inner, inverse_calls: AtomicUsize::new(0) }
    }

    pub fn inverse_calls(&self) -> usize {
        self.inverse_calls.load(Ordering::SeqCst)
    }
}

impl Kinematics for CountingKinematics {
    fn dof(&self) -> usize {
        self.inner.dof()
    }

    fn forward(&self, qs: &[f64]) -> Pose {
        self.inner.forward(qs)
    }

    fn inverse(&self, pose: &Pose, seed: &[f64]) -> IkSolution {
        self.inverse_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.inverse(pose, seed)
    }
}

/// Cartesian gantry: the first three joints are x, y and z of the end effector (m), the
/// remaining ones roll, pitch and yaw (rad). Inverse kinematics is exact, which makes the
/// limits alone decide where a Cartesian plan fails.
pub struct GantryKinematics {
    pub dof: usize,
}

impl Kinematics for GantryKinematics {
    fn dof(&self) -> usize {
        self.dof
    }

    fn forward(&self, qs: &[f64]) -> Pose {
        let mut all = [0.0; 6];
        for (slot, q) in all.iter_mut().zip(qs.iter()) {
            *slot = *q;
        }
        Isometry3::from_parts(
            Translation3::new(all[0], all[1], all[2]),
            rpy_to_rotation(all[3], all[4], all[5]),
        )
    }

    fn inverse(&self, pose: &Pose, _seed: &[f64]) -> IkSolution {
        let t = pose.translation.vector;
        let (roll, pitch, yaw) = rotation_to_rpy(&pose.rotation);
        let joints: Joints = [t.x, t.y, t.z, roll, pitch, yaw][..self.dof].to_vec();
        let (distance, angle) = pose_distance(&self.forward(&joints), pose);
        IkSolution { converged: distance < 1e-9 && angle < 1e-9, joints }
    }
}

/// Group matching [`GantryKinematics`]: joints `j0`.., all within ±1 and 1 unit per second.
pub fn gantry_group(dof: usize) -> GroupInfo {
    GroupInfo {
        joint_names: (0..dof).map(|i| format!("j{}", i)).collect(),
        joint_lower_limits: vec![-1.0; dof],
        joint_upper_limits: vec![1.0; dof],
        joint_velocity_limits: vec![1.0; dof],
        joint_sleep_positions: vec![0.0; dof],
        mode: POSITION_MODE.to_string(),
        profile_type: TIME_PROFILE.to_string(),
    }
}

/// Returns at once and remembers how long each motion was commanded for.
#[derive(Default)]
pub struct RecordingWaiter {
    pub dispatches: AtomicUsize,
    pub waits: Mutex<Vec<Duration>>,
}

impl RecordingWaiter {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl MotionWaiter for RecordingWaiter {
    fn before_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
    }

    fn wait_for_motion(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
