//! Joint group metadata, fetched once from the motor layer.

use crate::arm_error::ArmError;
use crate::kinematic_traits::Joints;

/// Operating mode the motion core relies on: joints take position commands.
pub const POSITION_MODE: &str = "position";

/// Profile type the motion core relies on: moving and acceleration times, not velocities.
pub const TIME_PROFILE: &str = "time";

/// Immutable description of the joint group as reported by the metadata query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    /// Joint names in group order. All per-joint vectors follow this order.
    pub joint_names: Vec<String>,

    /// Lower position limits (rad).
    pub joint_lower_limits: Joints,

    /// Upper position limits (rad).
    pub joint_upper_limits: Joints,

    /// Velocity limits (rad/s).
    pub joint_velocity_limits: Joints,

    /// Joint positions of the resting "sleep" pose (rad).
    pub joint_sleep_positions: Joints,

    /// Operating mode, expected to be [`POSITION_MODE`].
    pub mode: String,

    /// Drive profile type, expected to be [`TIME_PROFILE`].
    pub profile_type: String,
}

impl GroupInfo {
    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// Index of the joint in group order.
    pub fn joint_index(&self, name: &str) -> Result<usize, ArmError> {
        self.joint_names.iter()
            .position(|n| n == name)
            .ok_or_else(|| ArmError::UnknownJoint(name.to_string()))
    }

    /// Checks that all per-joint tables have one entry per joint.
    pub fn check_lengths(&self) -> Result<(), ArmError> {
        let expected = self.num_joints();
        for found in [
            self.joint_lower_limits.len(),
            self.joint_upper_limits.len(),
            self.joint_velocity_limits.len(),
            self.joint_sleep_positions.len(),
        ] {
            if found != expected {
                return Err(ArmError::InvalidLength { expected, found });
            }
        }
        Ok(())
    }

    /// Checks the drive configuration that position planning with time based profiles
    /// requires. All problems are reported together.
    pub fn check_drive_mode(&self) -> Result<(), ArmError> {
        let mut problems = Vec::new();
        if self.profile_type != TIME_PROFILE {
            problems.push(format!(
                "profile type is '{}', please set the group's 'profile type' to '{}'",
                self.profile_type, TIME_PROFILE
            ));
        }
        if self.mode != POSITION_MODE {
            problems.push(format!(
                "operating mode is '{}', please set the group's 'operating mode' to '{}'",
                self.mode, POSITION_MODE
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ArmError::Configuration(problems.join("; ")))
        }
    }
}
