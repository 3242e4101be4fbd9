use std::sync::Arc;
use tracing::{debug, trace};

use crate::arm_error::ArmError;
use crate::kinematic_traits::{Joints, Kinematics, Pose};
use crate::limits::LimitValidator;
use crate::seeds::SeedSequence;
use crate::utils::angles::normalize_joints;

/// Single pose pipeline: inverse kinematics from each seed in turn, full turn normalization
/// of the converged solution, then position and velocity limit checks. Nothing is dispatched.
#[derive(Clone)]
pub struct PoseSolver {
    pub kinematics: Arc<dyn Kinematics>,
    pub limits: LimitValidator,
}

impl PoseSolver {
    pub fn new(kinematics: Arc<dyn Kinematics>, limits: LimitValidator) -> Self {
        PoseSolver { kinematics, limits }
    }

    /// Returns the first solution that converges and passes the limit checks against `current`
    /// within `moving_time`. Seeds after the first valid solution are never evaluated.
    ///
    /// When no seed succeeds, the error is [`ArmError::LimitViolation`] if at least one seed
    /// converged, [`ArmError::ConvergenceFailure`] otherwise. Either way it carries the joints
    /// of the last attempt.
    pub fn solve(&self, target: &Pose, seeds: SeedSequence, current: &[f64], moving_time: f64)
                 -> Result<Joints, ArmError> {
        let mut last: Joints = current.to_vec();
        let mut any_converged = false;

        for (attempt, seed) in seeds.enumerate() {
            let solution = self.kinematics.inverse(target, &seed);
            if !solution.converged {
                trace!("Seed {} did not converge", attempt);
                last = solution.joints;
                continue;
            }
            any_converged = true;
            let normalized = normalize_joints(&solution.joints, &self.limits.lower, &self.limits.upper);
            if self.limits.compliant(&normalized, current, moving_time) {
                debug!("Seed {} produced a valid solution {:?}", attempt, normalized);
                return Ok(normalized);
            }
            trace!("Seed {} converged outside the limits: {:?}", attempt, normalized);
            last = normalized;
        }

        if any_converged {
            Err(ArmError::LimitViolation { last })
        } else {
            Err(ArmError::ConvergenceFailure { last })
        }
    }
}
