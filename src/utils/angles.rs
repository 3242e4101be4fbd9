//! Full-turn normalization of revolute joint solutions.
//!
//! Numeric inverse kinematics happily returns a joint value that is a whole number of turns
//! away from the one inside the configured range. Each joint is handled independently:
//! values beyond ±2π are reduced into (-2π, 2π), then a single full turn is added or
//! subtracted if that brings a value below the lower (above the upper) limit back into range.
//! Limits are compared at 3 decimal places, the same precision the limit checks use.

use std::f64::consts::PI;
use crate::kinematic_traits::Joints;
use crate::utils::round3;

/// One full turn.
pub const REV: f64 = 2.0 * PI;

/// Normalize a single joint value against its limits. Limits are expected to lie within ±2π.
///
/// The turn correction is only applied when the shifted value lands inside the limits. A value
/// without any in-range equivalent is returned as reduced, and will be rejected by the limit
/// check. This keeps the normalization idempotent.
pub fn normalize_joint(raw: f64, lower: f64, upper: f64) -> f64 {
    let mut angle = raw;
    if angle.abs() > REV {
        // Sign follows the dividend, so the result stays in (-2π, 2π) on the same side of 0.
        angle %= REV;
    }

    let lower = round3(lower);
    let upper = round3(upper);
    if round3(angle) < lower {
        let shifted = angle + REV;
        if round3(shifted) <= upper {
            angle = shifted;
        }
    } else if round3(angle) > upper {
        let shifted = angle - REV;
        if round3(shifted) >= lower {
            angle = shifted;
        }
    }
    angle
}

/// Normalize all joints of a solution. Slices must be of equal length.
pub fn normalize_joints(raw: &[f64], lower: &[f64], upper: &[f64]) -> Joints {
    raw.iter()
        .zip(lower.iter().zip(upper.iter()))
        .map(|(&q, (&lo, &hi))| normalize_joint(q, lo, hi))
        .collect()
}
