//! Runtime configuration of the arm interface.

use std::time::Duration;

use crate::kinematics_impl::IkParameters;
use crate::path_plan::cartesian::CartesianRequest;
use crate::timing::TimingProfile;

/// Settings of an [`crate::arm::ArmInterface`]. All fields have defaults, so a configuration
/// file only needs to list what differs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "allow_filesystem", derive(serde::Deserialize))]
#[cfg_attr(feature = "allow_filesystem", serde(default))]
pub struct ArmConfig {
    /// Model name, used to pick the built-in robot description.
    pub robot_model: String,

    /// Name of the joint group in the motor layer.
    pub group_name: String,

    /// Default moving time (s).
    pub moving_time: f64,

    /// Default acceleration time (s).
    pub accel_time: f64,

    /// Allowed angular error of inverse kinematics (rad).
    pub rotation_tolerance: f64,

    /// Allowed linear error of inverse kinematics (m).
    pub position_tolerance: f64,

    /// Newton steps per seed.
    pub max_iterations: usize,

    /// Default moving time of each Cartesian trajectory waypoint (s).
    pub wp_moving_time: f64,

    /// Default acceleration time of each Cartesian trajectory waypoint (s).
    pub wp_accel_time: f64,

    /// Default time between Cartesian trajectory waypoints (s).
    pub wp_period: f64,

    /// Delay between two metadata polls during initialization (ms).
    pub metadata_poll_interval_ms: u64,

    /// Polls before initialization gives up. Keeps polling forever if not set.
    pub metadata_max_polls: Option<usize>,
}

impl Default for ArmConfig {
    fn default() -> Self {
        let request = CartesianRequest::default();
        let timing = TimingProfile::default();
        let ik = IkParameters::default();
        ArmConfig {
            robot_model: "wx200".to_string(),
            group_name: "arm".to_string(),
            moving_time: timing.moving_time,
            accel_time: timing.accel_time,
            rotation_tolerance: ik.rotation_tolerance,
            position_tolerance: ik.position_tolerance,
            max_iterations: ik.max_iterations,
            wp_moving_time: request.wp_moving_time,
            wp_accel_time: request.wp_accel_time,
            wp_period: request.wp_period,
            metadata_poll_interval_ms: 100,
            metadata_max_polls: None,
        }
    }
}

impl ArmConfig {
    pub fn timing(&self) -> TimingProfile {
        TimingProfile { moving_time: self.moving_time, accel_time: self.accel_time }
    }

    pub fn ik_parameters(&self) -> IkParameters {
        IkParameters {
            rotation_tolerance: self.rotation_tolerance,
            position_tolerance: self.position_tolerance,
            max_iterations: self.max_iterations,
        }
    }

    /// Cartesian request without displacement, carrying the configured waypoint settings.
    pub fn cartesian_request(&self) -> CartesianRequest {
        CartesianRequest {
            wp_moving_time: self.wp_moving_time,
            wp_accel_time: self.wp_accel_time,
            wp_period: self.wp_period,
            ..Default::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.metadata_poll_interval_ms)
    }
}

#[cfg(feature = "allow_filesystem")]
impl ArmConfig {
    /// Read the configuration from YAML file. Fields not present keep their defaults:
    /// ```yaml
    /// robot_model: wx250s
    /// moving_time: 1.5
    /// metadata_max_polls: 50
    /// ```
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, crate::arm_error::ArmError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, crate::arm_error::ArmError> {
        serde_saphyr::from_str(contents)
            .map_err(|e| crate::arm_error::ArmError::Parse(format!("{}", e)))
    }
}
