#[cfg(test)]
mod tests {
    use crate::arm_error::ArmError;
    use crate::config::ArmConfig;
    use crate::description::RobotDescription;
    use crate::utils::assert_pose_eq;

    const READ_ERROR: &'static str = "Failed to load robot description from file";

    #[test]
    fn test_description_from_yaml() {
        let loaded = RobotDescription::from_yaml_file("src/tests/data/px100.yaml").expect(READ_ERROR);
        let expected = RobotDescription::px100();

        assert_eq!(loaded.dof(), 4);
        assert_pose_eq(&loaded.home, &expected.home, 1e-12, 1e-12);
        for (found, wanted) in loaded.screw_axes.iter().zip(expected.screw_axes.iter()) {
            assert!((found - wanted).norm() < 1e-12, "{:?} vs {:?}", found, wanted);
        }
    }

    #[test]
    fn test_description_wrong_row_length() {
        match RobotDescription::from_yaml_file("src/tests/data/bad_screw.yaml") {
            Err(ArmError::InvalidLength { expected: 6, found: 5 }) => {}
            other => panic!("Expected invalid length, got {:?}", other),
        }
    }

    #[test]
    fn test_description_missing_file() {
        let result = RobotDescription::from_yaml_file("src/tests/data/no_such_robot.yaml");
        assert!(matches!(result, Err(ArmError::Io(_))));
    }

    #[test]
    fn test_description_not_yaml_of_robot() {
        let result = RobotDescription::from_yaml_str("robot: px100\n");
        assert!(matches!(result, Err(ArmError::Parse(_))));
    }

    #[test]
    fn test_config_from_yaml() {
        let loaded = ArmConfig::from_yaml_file("src/tests/data/arm_config.yaml").expect(READ_ERROR);
        let expected = ArmConfig {
            robot_model: "wx250s".into(),
            moving_time: 1.5,
            accel_time: 0.4,
            wp_period: 0.1,
            metadata_max_polls: Some(50),
            ..Default::default()
        };
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ArmConfig::from_yaml_str("{}").unwrap(), ArmConfig::default());
    }
}
