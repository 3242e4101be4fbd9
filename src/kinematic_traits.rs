extern crate nalgebra as na;

use na::Isometry3;

/// Pose is used a pose of the end effector in the fixed space frame. It contains both Cartesian
/// position and rotation quaternion.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(0.3, 0.0, 0.2);
/// let rotation = UnitQuaternion::from_euler_angles(0.0, 0.5, 0.0);
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Joint positions in radians, one per joint in group order. Arms of this family have
/// between 4 and 6 joints so this is not a fixed size array.
pub type Joints = Vec<f64>;

/// Outcome of a single numeric inverse kinematics attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution {
    /// Joint values where the iteration stopped. Only meaningful for dispatch when `converged`.
    pub joints: Joints,

    /// True if the pose error dropped below both tolerances within the iteration budget.
    pub converged: bool,
}

pub trait Kinematics {
    /// Number of joints in the kinematic chain.
    fn dof(&self) -> usize;

    /// Space frame pose of the end effector for the given joint values.
    fn forward(&self, qs: &[f64]) -> Pose;

    /// Iterative inverse kinematics starting from the given seed. A seed that does not
    /// have exactly `dof` values never converges.
    fn inverse(&self, pose: &Pose, seed: &[f64]) -> IkSolution;
}
