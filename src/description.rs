//! Defines the product of exponentials robot description

use nalgebra::{Isometry3, Vector6};
use crate::utils::screw::exp6;

/// Static description of a serial kinematic chain in product of exponentials form.
/// See [description_robots.rs](description_robots.rs) for concrete arm models.
///
/// The end effector pose for joint values θ is `exp([S1]θ1) · … · exp([Sn]θn) · M`.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotDescription {
    /// Pose of the end effector in the space frame when all joints are at zero (M).
    pub home: Isometry3<f64>,

    /// Screw axes in the space frame, base joint first, each ordered `[ω; v]`.
    pub screw_axes: Vec<Vector6<f64>>,
}

impl RobotDescription {
    pub fn new(home: Isometry3<f64>, screw_axes: Vec<Vector6<f64>>) -> Self {
        RobotDescription { home, screw_axes }
    }

    /// Build the description for a revolute-only chain from joint axis directions and
    /// a point on each axis, as they can be read from the drawing of the arm at zero.
    pub fn from_revolute_axes(home: Isometry3<f64>, axes: &[([f64; 3], [f64; 3])]) -> Self {
        let screw_axes = axes.iter().map(|(w, q)| {
            let w = nalgebra::Vector3::from(*w);
            let q = nalgebra::Vector3::from(*q);
            let v = -w.cross(&q);
            Vector6::new(w.x, w.y, w.z, v.x, v.y, v.z)
        }).collect();
        RobotDescription { home, screw_axes }
    }

    /// Number of joints in the chain.
    pub fn dof(&self) -> usize {
        self.screw_axes.len()
    }

    /// Product of exponentials of the first `count` joints, without the home pose.
    /// Used both by forward kinematics and to place the space Jacobian columns.
    pub(crate) fn partial_product(&self, qs: &[f64], count: usize) -> Isometry3<f64> {
        self.screw_axes.iter()
            .zip(qs.iter())
            .take(count)
            .fold(Isometry3::identity(), |acc, (s, &q)| acc * exp6(&(s * q)))
    }
}
