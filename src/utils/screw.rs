//! Screw motion algebra on rigid transforms.
//!
//! Twists and screw axes are 6-vectors ordered `[ω; v]`: angular part first, linear part
//! second. This is the ordering used by product of exponentials descriptions of the arm,
//! not the `[v; ω]` ordering often used for end effector velocities.

use nalgebra::{Isometry3, Matrix3, Matrix4, Matrix6, Rotation3, Translation3, UnitQuaternion, Vector3, Vector6};

/// Angles or distances below this are treated as zero.
const NEAR_ZERO: f64 = 1e-9;

pub fn skew(w: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -w.z, w.y,
        w.z, 0.0, -w.x,
        -w.y, w.x, 0.0,
    )
}

/// Rigid transform of the screw motion `exp([S] θ)`. The argument is the screw axis
/// already scaled by θ. Pure translations (prismatic joints) are supported.
pub fn exp6(twist: &Vector6<f64>) -> Isometry3<f64> {
    let omega_theta = Vector3::new(twist[0], twist[1], twist[2]);
    let v_theta = Vector3::new(twist[3], twist[4], twist[5]);
    let theta = omega_theta.norm();

    if theta < NEAR_ZERO {
        return Isometry3::from_parts(Translation3::from(v_theta), UnitQuaternion::identity());
    }

    let w_hat = skew(&(omega_theta / theta));
    let v = v_theta / theta;
    let g = Matrix3::identity() * theta
        + w_hat * (1.0 - theta.cos())
        + w_hat * w_hat * (theta - theta.sin());

    Isometry3::from_parts(
        Translation3::from(g * v),
        UnitQuaternion::from_scaled_axis(omega_theta),
    )
}

/// Inverse of [`exp6`]: the scaled twist `[S] θ` that moves identity onto the transform.
pub fn log6(transform: &Isometry3<f64>) -> Vector6<f64> {
    let p = transform.translation.vector;
    let omega_theta = transform.rotation.scaled_axis();
    let theta = omega_theta.norm();

    if theta < NEAR_ZERO {
        return Vector6::new(0.0, 0.0, 0.0, p.x, p.y, p.z);
    }

    let w_hat = skew(&(omega_theta / theta));
    let g_inv = Matrix3::identity() / theta - w_hat * 0.5
        + w_hat * w_hat * (1.0 / theta - 0.5 / (theta / 2.0).tan());
    let v_theta = g_inv * p * theta;

    Vector6::new(
        omega_theta.x, omega_theta.y, omega_theta.z,
        v_theta.x, v_theta.y, v_theta.z,
    )
}

/// 6x6 adjoint representation, maps twists between frames: `V_a = Ad(T_ab) V_b`.
pub fn adjoint(transform: &Isometry3<f64>) -> Matrix6<f64> {
    let r = transform.rotation.to_rotation_matrix().into_inner();
    let p_hat = skew(&transform.translation.vector);

    let mut ad = Matrix6::zeros();
    ad.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    ad.fixed_view_mut::<3, 3>(3, 0).copy_from(&(p_hat * r));
    ad.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    ad
}

/// Rotation from roll, pitch and yaw about the fixed x, y, z axes (R = Rz · Ry · Rx).
pub fn rpy_to_rotation(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll, pitch, yaw)
}

/// Roll, pitch and yaw of the rotation, inverse of [`rpy_to_rotation`].
pub fn rotation_to_rpy(rotation: &UnitQuaternion<f64>) -> (f64, f64, f64) {
    rotation.euler_angles()
}

/// Build a rigid transform from a homogeneous 4x4 matrix. Only the rotation and translation
/// blocks are read, the rotation is re-orthonormalized.
pub fn from_homogeneous(matrix: &Matrix4<f64>) -> Isometry3<f64> {
    let r: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix(&r));
    let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);
    Isometry3::from_parts(Translation3::from(translation), rotation)
}
