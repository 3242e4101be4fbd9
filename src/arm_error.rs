//! Errors reported by the motion core. All of them are recoverable by the caller.

use std::io;
use thiserror::Error;
use crate::kinematic_traits::Joints;

#[derive(Debug, Error)]
pub enum ArmError {
    /// No seed produced an inverse kinematics solution within tolerance. Carries the joints of
    /// the last attempt for diagnostics; they are not valid for dispatch.
    #[error("No inverse kinematics solution converged, last attempt {last:?}")]
    ConvergenceFailure { last: Joints },

    /// A solution converged, but it violates position or velocity limits.
    #[error("Solution violates joint position or velocity limits: {last:?}")]
    LimitViolation { last: Joints },

    /// The Cartesian request moves along an axis the chain cannot actuate independently.
    #[error("Arm with {dof} joints cannot move along '{axis}' independently, leave it at 0")]
    UnsupportedDof { dof: usize, axis: &'static str },

    /// Waypoint `completed` of `planned` could not be solved; nothing was dispatched.
    #[error("{:.2}% of trajectory successfully planned, trajectory will not be executed", percent(.completed, .planned))]
    PartialPlan { completed: usize, planned: usize },

    /// Group metadata reports a drive configuration this core does not support.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    #[error("Live joint state missing for joint {0}")]
    MissingJointState(String),

    #[error("Invalid length: expected {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Invalid timing: {0}")]
    InvalidTiming(String),

    #[error("Unknown robot model: {0}")]
    UnknownModel(String),

    /// Group metadata never became available.
    #[error("Group metadata for '{0}' is not available")]
    MetadataUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse Error: {0}")]
    Parse(String),
}

fn percent(completed: &usize, planned: &usize) -> f64 {
    if *planned == 0 {
        return 0.0;
    }
    100.0 * *completed as f64 / *planned as f64
}

impl ArmError {
    /// Fraction of the trajectory planned before failure, for partial plan errors.
    pub fn completed_fraction(&self) -> Option<f64> {
        match self {
            ArmError::PartialPlan { completed, planned } if *planned > 0 => {
                Some(*completed as f64 / *planned as f64)
            }
            _ => None,
        }
    }

    /// Joints of the last attempted solution, for failures of the pose solver.
    pub fn last_attempt(&self) -> Option<&Joints> {
        match self {
            ArmError::ConvergenceFailure { last } | ArmError::LimitViolation { last } => Some(last),
            _ => None,
        }
    }
}
