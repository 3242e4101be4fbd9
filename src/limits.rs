use crate::arm_error::ArmError;
use crate::group_info::GroupInfo;
use crate::kinematic_traits::Joints;
use crate::utils::round3;
use tracing::debug;

/// Position and velocity limits of the joint group. Checks are pure predicates.
#[derive(Clone, Debug, PartialEq)]
pub struct LimitValidator {
    /// Lower position limits (rad), in group order.
    pub lower: Joints,

    /// Upper position limits (rad), in group order.
    pub upper: Joints,

    /// Velocity limits (rad/s), in group order.
    pub velocity: Joints,
}

impl LimitValidator {
    pub fn new(lower: Joints, upper: Joints, velocity: Joints) -> Self {
        LimitValidator { lower, upper, velocity }
    }

    pub fn from_group(group: &GroupInfo) -> Self {
        Self::new(
            group.joint_lower_limits.clone(),
            group.joint_upper_limits.clone(),
            group.joint_velocity_limits.clone(),
        )
    }

    /// Check a single joint. The candidate is rounded to 3 decimals before comparing with the
    /// position limits, and the implied speed `|candidate - current| / moving_time` must not
    /// exceed the velocity limit.
    pub fn joint_compliant(&self, joint: usize, candidate: f64, current: f64, moving_time: f64) -> bool {
        let theta = round3(candidate);
        if !(self.lower[joint] <= theta && theta <= self.upper[joint]) {
            return false;
        }
        let speed = (theta - current).abs() / moving_time;
        speed <= self.velocity[joint]
    }

    /// True if all joints of the candidate are within position limits and can be reached from
    /// `current` within `moving_time` without exceeding the velocity limits.
    pub fn compliant(&self, candidate: &[f64], current: &[f64], moving_time: f64) -> bool {
        debug!("Checking joint limits for positions={:?}", candidate);
        candidate.len() == self.lower.len()
            && current.len() == self.lower.len()
            && (0..candidate.len())
            .all(|i| self.joint_compliant(i, candidate[i], current[i], moving_time))
    }

    /// Same rule as [`LimitValidator::compliant`] restricted to one joint, for commands that
    /// move a single joint and leave the others as they are.
    pub fn single_compliant(&self, joint: usize, candidate: f64, current: &[f64], moving_time: f64)
                            -> Result<bool, ArmError> {
        debug!("Checking joint {} limits for position={}", joint, candidate);
        if joint >= self.lower.len() || joint >= current.len() {
            return Err(ArmError::InvalidLength { expected: self.lower.len(), found: joint + 1 });
        }
        Ok(self.joint_compliant(joint, candidate, current[joint], moving_time))
    }
}
