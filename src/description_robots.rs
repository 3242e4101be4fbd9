//! Hardcoded descriptions for a few desktop arms of the X-series family.
//! Dimensions are in meters, joint axes as seen with all joints at zero (arm stretched
//! forward along x, first joint rotating about z).

use nalgebra::{Isometry3, Vector3};
use crate::description::RobotDescription;

const Z: [f64; 3] = [0.0, 0.0, 1.0];
const Y: [f64; 3] = [0.0, 1.0, 0.0];
const X: [f64; 3] = [1.0, 0.0, 0.0];

fn home_at(x: f64, z: f64) -> Isometry3<f64> {
    Isometry3::new(Vector3::new(x, 0.0, z), Vector3::zeros())
}

impl RobotDescription {
    /// 4 joint arm: waist, shoulder, elbow, wrist angle.
    pub fn px100() -> Self {
        Self::from_revolute_axes(home_at(0.248575, 0.1931), &[
            (Z, [0.0, 0.0, 0.0]),
            (Y, [0.0, 0.0, 0.0931]),
            (Y, [0.035, 0.0, 0.1931]),
            (Y, [0.135, 0.0, 0.1931]),
        ])
    }

    /// 5 joint arm: waist, shoulder, elbow, wrist angle, wrist rotate.
    pub fn wx200() -> Self {
        Self::from_revolute_axes(home_at(0.408575, 0.31065), &[
            (Z, [0.0, 0.0, 0.0]),
            (Y, [0.0, 0.0, 0.11065]),
            (Y, [0.05, 0.0, 0.31065]),
            (Y, [0.25, 0.0, 0.31065]),
            (X, [0.0, 0.0, 0.31065]),
        ])
    }

    /// 6 joint arm with forearm roll: waist, shoulder, elbow, forearm roll, wrist angle,
    /// wrist rotate.
    pub fn wx250s() -> Self {
        Self::from_revolute_axes(home_at(0.458325, 0.36065), &[
            (Z, [0.0, 0.0, 0.0]),
            (Y, [0.0, 0.0, 0.11065]),
            (Y, [0.04975, 0.0, 0.36065]),
            (X, [0.0, 0.0, 0.36065]),
            (Y, [0.29975, 0.0, 0.36065]),
            (X, [0.0, 0.0, 0.36065]),
        ])
    }

    /// 6 joint arm, larger variant of [`RobotDescription::wx250s`].
    pub fn vx300s() -> Self {
        Self::from_revolute_axes(home_at(0.536494, 0.42705), &[
            (Z, [0.0, 0.0, 0.0]),
            (Y, [0.0, 0.0, 0.12705]),
            (Y, [0.05955, 0.0, 0.42705]),
            (X, [0.0, 0.0, 0.42705]),
            (Y, [0.35955, 0.0, 0.42705]),
            (X, [0.0, 0.0, 0.42705]),
        ])
    }

    /// Look up the description by the model name used in arm configuration.
    pub fn by_model(model: &str) -> Option<Self> {
        match model {
            "px100" => Some(Self::px100()),
            "wx200" => Some(Self::wx200()),
            "wx250s" => Some(Self::wx250s()),
            "vx300s" => Some(Self::vx300s()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector6;

    #[test]
    fn test_model_lookup() {
        assert_eq!(RobotDescription::by_model("px100").map(|d| d.dof()), Some(4));
        assert_eq!(RobotDescription::by_model("wx200").map(|d| d.dof()), Some(5));
        assert_eq!(RobotDescription::by_model("wx250s").map(|d| d.dof()), Some(6));
        assert_eq!(RobotDescription::by_model("vx300s").map(|d| d.dof()), Some(6));
        assert!(RobotDescription::by_model("ur5").is_none());
    }

    #[test]
    fn test_screw_axis_from_point_on_axis() {
        // Shoulder of wx200: rotation about y through (0, 0, 0.11065)
        let description = RobotDescription::wx200();
        let expected = Vector6::new(0.0, 1.0, 0.0, -0.11065, 0.0, 0.0);
        assert!((description.screw_axes[1] - expected).norm() < 1e-12);

        // Wrist rotate: rotation about x through (0, 0, 0.31065)
        let expected = Vector6::new(1.0, 0.0, 0.0, 0.0, 0.31065, 0.0);
        assert!((description.screw_axes[4] - expected).norm() < 1e-12);
    }
}
