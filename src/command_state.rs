//! Last commanded joint positions and the end effector pose they imply.

use crate::kinematic_traits::{Joints, Kinematics, Pose};

/// Owned exclusively by the arm interface, replaced wholesale after every successful move.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandState {
    joints: Joints,
    pose: Pose,
}

impl CommandState {
    pub fn new(joints: Joints, kinematics: &dyn Kinematics) -> Self {
        let pose = kinematics.forward(&joints);
        CommandState { joints, pose }
    }

    pub fn joints(&self) -> &Joints {
        &self.joints
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Replace the commanded joints and recompute the pose from them.
    pub fn commit(&mut self, joints: Joints, kinematics: &dyn Kinematics) {
        self.pose = kinematics.forward(&joints);
        self.joints = joints;
    }

    /// Replace the commanded joints with a pose that is already known, for example the last
    /// target of a planned Cartesian trajectory.
    pub fn commit_with_pose(&mut self, joints: Joints, pose: Pose) {
        self.joints = joints;
        self.pose = pose;
    }

    /// Update one joint, leaving the others as they are.
    pub fn commit_single(&mut self, joint: usize, position: f64, kinematics: &dyn Kinematics) {
        let mut joints = self.joints.clone();
        joints[joint] = position;
        self.commit(joints, kinematics);
    }
}
