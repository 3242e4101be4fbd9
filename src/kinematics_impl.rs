use nalgebra::Vector3;
use tracing::trace;
use crate::description::RobotDescription;
use crate::jacobian::Jacobian;
use crate::kinematic_traits::{IkSolution, Joints, Kinematics, Pose};
use crate::utils::is_valid;
use crate::utils::screw::{adjoint, log6};

/// Singular values of the Jacobian below this are dropped from the Newton step.
const PSEUDO_INVERSE_EPSILON: f64 = 1e-10;

/// Termination settings of the Newton-Raphson inverse kinematics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkParameters {
    /// Allowed angular error (rad), norm of the angular part of the error twist.
    pub rotation_tolerance: f64,

    /// Allowed linear error (m), norm of the linear part of the error twist.
    pub position_tolerance: f64,

    /// Maximum number of Newton steps per seed.
    pub max_iterations: usize,
}

impl Default for IkParameters {
    fn default() -> Self {
        IkParameters {
            rotation_tolerance: 0.001,
            position_tolerance: 0.001,
            max_iterations: 20,
        }
    }
}

/// Forward and inverse kinematics of the product of exponentials chain.
#[derive(Debug, Clone)]
pub struct PoeKinematics {
    description: RobotDescription,
    parameters: IkParameters,
}

impl PoeKinematics {
    /// Creates a new `PoeKinematics` instance with default solver settings.
    pub fn new(description: RobotDescription) -> Self {
        Self::with_parameters(description, IkParameters::default())
    }

    pub fn with_parameters(description: RobotDescription, parameters: IkParameters) -> Self {
        PoeKinematics { description, parameters }
    }

    pub fn description(&self) -> &RobotDescription {
        &self.description
    }

    pub fn parameters(&self) -> &IkParameters {
        &self.parameters
    }

    /// Space frame error twist that would carry `current` onto `target`, with the flag telling
    /// if it is still outside the tolerances.
    fn error_twist(&self, current: &Pose, target: &Pose) -> (nalgebra::Vector6<f64>, bool) {
        let body_error = log6(&(current.inverse() * target));
        let space_error = adjoint(current) * body_error;
        let angular = Vector3::new(space_error[0], space_error[1], space_error[2]).norm();
        let linear = Vector3::new(space_error[3], space_error[4], space_error[5]).norm();
        let outside = angular > self.parameters.rotation_tolerance
            || linear > self.parameters.position_tolerance;
        (space_error, outside)
    }
}

impl Kinematics for PoeKinematics {
    fn dof(&self) -> usize {
        self.description.dof()
    }

    fn forward(&self, qs: &[f64]) -> Pose {
        self.description.partial_product(qs, self.description.dof()) * self.description.home
    }

    fn inverse(&self, pose: &Pose, seed: &[f64]) -> IkSolution {
        let mut qs: Joints = seed.to_vec();
        if qs.len() != self.description.dof() {
            trace!("Seed of {} values for {} joints, not iterating", qs.len(), self.description.dof());
            return IkSolution { joints: qs, converged: false };
        }
        let (mut error, mut outside) = self.error_twist(&self.forward(&qs), pose);
        let mut iteration = 0;

        while outside && iteration < self.parameters.max_iterations {
            let jacobian = Jacobian::space(&self.description, &qs, PSEUDO_INVERSE_EPSILON);
            let step = match jacobian.velocities_from_twist(&error) {
                Ok(step) => step,
                Err(msg) => {
                    trace!("Newton step failed at iteration {}: {}", iteration, msg);
                    break;
                }
            };
            for (q, dq) in qs.iter_mut().zip(step.iter()) {
                *q += dq;
            }
            if !is_valid(&qs) {
                break;
            }
            iteration += 1;
            (error, outside) = self.error_twist(&self.forward(&qs), pose);
        }

        trace!("IK finished after {} iterations, converged: {}", iteration, !outside);
        IkSolution {
            converged: !outside && is_valid(&qs),
            joints: qs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::assert_pose_eq;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};

    #[test]
    fn test_forward_at_zero_is_home() {
        for description in [RobotDescription::px100(), RobotDescription::wx200(),
            RobotDescription::wx250s(), RobotDescription::vx300s()] {
            let robot = PoeKinematics::new(description.clone());
            let zeros = vec![0.0; robot.dof()];
            assert_pose_eq(&robot.forward(&zeros), &description.home, 1e-12, 1e-12);
        }
    }

    #[test]
    fn test_forward_waist_rotation() {
        // Turning only the waist by 90 degrees swings the end effector from +x to +y
        let robot = PoeKinematics::new(RobotDescription::wx200());
        let pose = robot.forward(&[std::f64::consts::FRAC_PI_2, 0.0, 0.0, 0.0, 0.0]);
        let expected = Isometry3::from_parts(
            Translation3::new(0.0, 0.408575, 0.31065),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        assert_pose_eq(&pose, &expected, 1e-9, 1e-9);
    }

    #[test]
    fn test_inverse_from_exact_seed_needs_no_iteration() {
        let robot = PoeKinematics::new(RobotDescription::vx300s());
        let joints = vec![0.2, -0.5, 0.4, 0.1, 0.7, -0.3];
        let pose = robot.forward(&joints);
        let solution = robot.inverse(&pose, &joints);
        assert!(solution.converged);
        assert_eq!(solution.joints, joints);
    }

    #[test]
    fn test_inverse_with_short_seed_does_not_converge() {
        let robot = PoeKinematics::new(RobotDescription::wx200());
        let pose = Isometry3::translation(1.5, 0.0, 0.3);
        let solution = robot.inverse(&pose, &[0.0, 0.0]);
        assert!(!solution.converged);
        assert_eq!(solution.joints, vec![0.0, 0.0]);
    }

    #[test]
    fn test_inverse_from_nearby_seed() {
        let robot = PoeKinematics::new(RobotDescription::wx250s());
        let joints = vec![0.3, -0.2, 0.3, 0.2, 0.5, -0.4];
        let pose = robot.forward(&joints);
        let seed: Vec<f64> = joints.iter().map(|q| q + 0.05).collect();
        let solution = robot.inverse(&pose, &seed);
        assert!(solution.converged);
        assert_pose_eq(&robot.forward(&solution.joints), &pose, 0.002, 0.002);
        for (found, expected) in solution.joints.iter().zip(joints.iter()) {
            assert!((found - expected).abs() < 0.01, "{:?} vs {:?}", solution.joints, joints);
        }
    }

    #[test]
    fn test_inverse_unreachable_does_not_converge() {
        let robot = PoeKinematics::new(RobotDescription::px100());
        let far_away = Isometry3::translation(3.0, 0.0, 0.2);
        let solution = robot.inverse(&far_away, &[0.0; 4]);
        assert!(!solution.converged);
        assert_eq!(solution.joints.len(), 4);
    }
}
