extern crate nalgebra as na;

use na::{DMatrix, DVector, Vector6};
use crate::description::RobotDescription;
use crate::kinematic_traits::{Joints, Kinematics};
use crate::utils::screw::{adjoint, log6};

/// Struct representing the Jacobian matrix
pub struct Jacobian {
    /// A 6 x n matrix, one column per joint. Rows are ordered `[ω; v]`, the same as
    /// the screw axes. Each column is the twist produced by unit velocity of that joint.
    matrix: DMatrix<f64>,

    /// Singular values below this are treated as zero when computing the pseudo-inverse.
    epsilon: f64,
}

impl Jacobian {
    /// Space Jacobian of the product of exponentials chain at the given joint values.
    ///
    /// Column i is `Ad(exp([S1]θ1) … exp([S(i-1)]θ(i-1))) S_i`, the i-th screw axis moved
    /// to where the preceding joints have carried it. Joints without a value in `qs` are
    /// taken as zero.
    pub fn space(description: &RobotDescription, qs: &[f64], epsilon: f64) -> Self {
        let dof = description.dof();
        let mut matrix = DMatrix::zeros(6, dof);
        let mut carried = na::Isometry3::identity();
        for (i, s) in description.screw_axes.iter().enumerate() {
            let column = adjoint(&carried) * s;
            matrix.fixed_view_mut::<6, 1>(0, i).copy_from(&column);
            let q = qs.get(i).copied().unwrap_or(0.0);
            carried *= crate::utils::screw::exp6(&(s * q));
        }
        Self { matrix, epsilon }
    }

    /// Jacobian obtained by finite differences of forward kinematics, usable with any
    /// implementation of [`Kinematics`]. Columns are space frame twists, like [`Jacobian::space`].
    pub fn numeric(robot: &impl Kinematics, qs: &[f64], epsilon: f64) -> Self {
        let dof = robot.dof();
        let current = robot.forward(qs);
        let current_inverse = current.inverse();
        let mut matrix = DMatrix::zeros(6, dof);

        for i in 0..dof {
            let mut perturbed: Joints = qs.to_vec();
            perturbed[i] += epsilon;
            let perturbed_pose = robot.forward(&perturbed);
            // Space frame twist taking the current pose to the perturbed one
            let column = log6(&(perturbed_pose * current_inverse)) / epsilon;
            matrix.fixed_view_mut::<6, 1>(0, i).copy_from(&column);
        }
        Self { matrix, epsilon }
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Joint velocities (or, for a Newton step, joint increments) producing the given space
    /// twist in the least squares sense. Uses the pseudo-inverse so it also works for arms
    /// with fewer than 6 joints and near singularities.
    pub fn velocities_from_twist(&self, twist: &Vector6<f64>) -> Result<Joints, &'static str> {
        let svd = self.matrix.clone().svd(true, true);
        let pseudo_inverse = svd.pseudo_inverse(self.epsilon)?;
        let joint_velocities: DVector<f64> = pseudo_inverse * DVector::from_column_slice(twist.as_slice());
        Ok(joint_velocities.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics_impl::PoeKinematics;

    const EPSILON: f64 = 1e-6;

    fn assert_matrix_approx_eq(left: &DMatrix<f64>, right: &DMatrix<f64>, epsilon: f64) {
        assert_eq!(left.shape(), right.shape());
        for i in 0..left.nrows() {
            for j in 0..left.ncols() {
                assert!((left[(i, j)] - right[(i, j)]).abs() < epsilon,
                        "left[{0},{1}] = {2} is not approximately equal to right[{0},{1}] = {3}",
                        i, j, left[(i, j)], right[(i, j)]);
            }
        }
    }

    #[test]
    fn test_space_jacobian_at_zero_is_screw_list() {
        let description = RobotDescription::wx200();
        let jacobian = Jacobian::space(&description, &[0.0; 5], EPSILON);
        for (i, s) in description.screw_axes.iter().enumerate() {
            for row in 0..6 {
                assert_eq!(jacobian.matrix()[(row, i)], s[row]);
            }
        }
    }

    #[test]
    fn test_space_jacobian_missing_values_are_zero() {
        let description = RobotDescription::wx200();
        let short = Jacobian::space(&description, &[0.4, -0.2], EPSILON);
        let full = Jacobian::space(&description, &[0.4, -0.2, 0.0, 0.0, 0.0], EPSILON);
        assert_eq!(short.matrix(), full.matrix());
    }

    #[test]
    fn test_space_jacobian_matches_numeric() {
        let robot = PoeKinematics::new(RobotDescription::wx250s());
        let qs = [0.3, -0.4, 0.5, 0.2, 0.6, -0.1];
        let analytic = Jacobian::space(robot.description(), &qs, EPSILON);
        let numeric = Jacobian::numeric(&robot, &qs, 1e-7);
        assert_matrix_approx_eq(analytic.matrix(), numeric.matrix(), 1e-5);
    }

    #[test]
    fn test_velocities_from_twist_of_single_joint() {
        // Twist of the waist joint at unit speed must map back to unit waist velocity only
        let description = RobotDescription::vx300s();
        let qs = [0.1, 0.2, -0.3, 0.0, 0.4, 0.0];
        let jacobian = Jacobian::space(&description, &qs, 1e-10);
        let twist = description.screw_axes[0];
        let velocities = jacobian.velocities_from_twist(&twist).expect("pseudo-inverse");
        assert!((velocities[0] - 1.0).abs() < 1e-9);
        for v in &velocities[1..] {
            assert!(v.abs() < 1e-9, "{:?}", velocities);
        }
    }
}
