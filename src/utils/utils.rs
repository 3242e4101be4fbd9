//! Helper functions

pub mod screw;
pub mod angles;

use crate::kinematic_traits::Joints;
use nalgebra::{Isometry3, UnitQuaternion};

/// Checks if all joint values are finite. Newton iterations that run into a singular
/// Jacobian may leave NaN behind.
pub fn is_valid(qs: &[f64]) -> bool {
    qs.iter().all(|&q| q.is_finite())
}

/// Rounds to 3 decimal places (milliradians). Joint limits are compared at this precision
/// so numeric noise from the solver does not reject positions that are within limits.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Allows to specify joint values in degrees (converts to radians)
pub fn as_radians(degrees: &[i32]) -> Joints {
    degrees.iter().map(|&d| (d as f64).to_radians()).collect()
}

/// Print joint values, converting radians to degrees.
pub fn dump_joints(joints: &[f64]) {
    let mut row_str = String::new();
    for computed in joints {
        row_str.push_str(&format!("{:5.2} ", computed.to_degrees()));
    }
    println!("[{}]", row_str.trim_end());
}

pub fn dump_pose(isometry: &Isometry3<f64>) {
    let translation = isometry.translation.vector;
    let rotation: UnitQuaternion<f64> = isometry.rotation;
    let (roll, pitch, yaw) = rotation.euler_angles();

    println!(
        "x: {:.5}, y: {:.5}, z: {:.5},  rpy: {:.2},{:.2},{:.2}",
        translation.x, translation.y, translation.z,
        roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees()
    );
}

/// Translation and angular distance between two poses. The angle is taken from the vector part
/// of the relative quaternion, which stays accurate for nearly equal rotations.
pub fn pose_distance(ta: &Isometry3<f64>, tb: &Isometry3<f64>) -> (f64, f64) {
    let translation_distance = (ta.translation.vector - tb.translation.vector).norm();
    let relative = (ta.rotation.inverse() * tb.rotation).into_inner();
    let angular_distance = 2.0 * relative.imag().norm().atan2(relative.scalar().abs());
    (translation_distance, angular_distance)
}

pub fn assert_pose_eq(ta: &Isometry3<f64>, tb: &Isometry3<f64>,
                      distance_tolerance: f64, angular_tolerance: f64) -> bool {
    fn bad(ta: &Isometry3<f64>, tb: &Isometry3<f64>) {
        dump_pose(ta);
        dump_pose(tb);
    }

    let (translation_distance, angular_distance) = pose_distance(ta, tb);

    if translation_distance > distance_tolerance {
        bad(ta, tb);
        panic!("Poses have too different translations");
    }

    if angular_distance > angular_tolerance {
        bad(ta, tb);
        panic!("Poses have too different angles");
    }
    true
}
