//! Supports reading the product of exponentials description from YAML file (optional)

use std::path::Path;
use nalgebra::{Matrix4, Vector6};
use serde::Deserialize;
use serde_saphyr::Options;

use crate::arm_error::ArmError;
use crate::description::RobotDescription;
use crate::utils::screw::from_homogeneous;

#[derive(Deserialize)]
struct Root {
    /// Home configuration as 4 rows of the homogeneous matrix
    #[serde(rename = "M")]
    pub home: Vec<Vec<f64>>,
    /// One `[wx, wy, wz, vx, vy, vz]` row per joint, base first
    #[serde(rename = "Slist")]
    pub screw_axes: Vec<Vec<f64>>,
}

impl RobotDescription {
    /// Read the robot description from YAML file. YAML file like this is supported:
    /// ```yaml
    /// # px100
    /// M:
    ///   - [1.0, 0.0, 0.0, 0.248575]
    ///   - [0.0, 1.0, 0.0, 0.0]
    ///   - [0.0, 0.0, 1.0, 0.1931]
    ///   - [0.0, 0.0, 0.0, 1.0]
    /// Slist:
    ///   - [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
    ///   - [0.0, 1.0, 0.0, -0.0931, 0.0, 0.0]
    ///   - [0.0, 1.0, 0.0, -0.1931, 0.0, 0.035]
    ///   - [0.0, 1.0, 0.0, -0.1931, 0.0, 0.135]
    /// ```
    /// The rotation block of `M` is re-orthonormalized, the last row is not checked.
    ///
    /// YAML extension to parse the deg(angle) function is supported (serde_saphyr).
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ArmError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Same as [`RobotDescription::from_yaml_file`] for already loaded text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ArmError> {
        let root: Root = serde_saphyr::from_str_with_options(
            contents,
            Options { angle_conversions: true, ..Default::default() },
        ).map_err(|e| ArmError::Parse(format!("{}", e)))?;

        if root.home.len() != 4 {
            return Err(ArmError::InvalidLength { expected: 4, found: root.home.len() });
        }
        let mut home = Matrix4::zeros();
        for (r, row) in root.home.iter().enumerate() {
            if row.len() != 4 {
                return Err(ArmError::InvalidLength { expected: 4, found: row.len() });
            }
            for (c, &value) in row.iter().enumerate() {
                home[(r, c)] = finite(value, "M")?;
            }
        }

        if root.screw_axes.is_empty() {
            return Err(ArmError::Parse("Slist must name at least one joint".into()));
        }
        let mut screw_axes = Vec::with_capacity(root.screw_axes.len());
        for row in &root.screw_axes {
            if row.len() != 6 {
                return Err(ArmError::InvalidLength { expected: 6, found: row.len() });
            }
            for &value in row {
                finite(value, "Slist")?;
            }
            screw_axes.push(Vector6::from_column_slice(row));
        }

        Ok(RobotDescription::new(from_homogeneous(&home), screw_axes))
    }
}

fn finite(value: f64, field: &str) -> Result<f64, ArmError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArmError::Parse(format!("{} must be finite (got {})", field, value)))
    }
}
