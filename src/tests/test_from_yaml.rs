#[cfg(test)]
mod tests {
    use crate::constraints::JointLimits;
    use crate::parameter_error::ParameterError;
    use crate::parameters::ChainParameters;
    use crate::settings::SimulationSettings;

    const READ_ERROR: &str = "Failed to load parameters from file";

    #[test]
    fn test_chain_from_yaml() {
        let loaded = ChainParameters::from_yaml_file("src/tests/data/desktop_arm.yaml").expect(READ_ERROR);
        assert_eq!(loaded, ChainParameters::desktop_arm());
    }

    #[test]
    fn test_chain_yaml_defaults() {
        let loaded = ChainParameters::from_yaml_file("src/tests/data/planar_no_limits.yaml").expect(READ_ERROR);
        assert_eq!(loaded.joints.len(), 2);
        assert_eq!(loaded.joints[0].limits, JointLimits::FULL_TURN);
        assert_eq!(loaded.scale, 1.0);
        // Axis is kept as written, the chain normalizes it
        assert_eq!(loaded.joints[0].axis.z, 2.0);
    }

    #[test]
    fn test_to_yaml_reads_back() {
        let parameters = ChainParameters::planar_arm();
        let yaml = parameters.to_yaml();
        let loaded = ChainParameters::from_yaml_str(&yaml).expect(READ_ERROR);
        assert_eq!(loaded, parameters);
    }

    #[test]
    fn test_chain_yaml_errors() {
        match ChainParameters::from_yaml_file("src/tests/data/bad_tip.yaml") {
            Err(ParameterError::InvalidLength { expected: 3, found: 2 }) => {}
            other => panic!("Unexpected result {:?}", other),
        }
        match ChainParameters::from_yaml_file("src/tests/data/does_not_exist.yaml") {
            Err(ParameterError::IoError(_)) => {}
            other => panic!("Unexpected result {:?}", other),
        }
        assert!(matches!(
            ChainParameters::from_yaml_str("arm_tip: [0, 1, 0]"),
            Err(ParameterError::MissingField(_))
        ));
        assert!(matches!(
            ChainParameters::from_yaml_str("arm_joints:\n  - pivot: [0, 0, 0]\n    axis: [0, 0, 0]\narm_tip: [0, 1, 0]"),
            Err(ParameterError::InvalidValue(_))
        ));
        assert!(matches!(
            ChainParameters::from_yaml_str("arm_joints: [[[["),
            Err(ParameterError::ParseError(_))
        ));
    }

    #[test]
    fn test_settings_from_yaml() {
        let settings = SimulationSettings::from_yaml_file("src/tests/data/settings.yaml").expect(READ_ERROR);
        let defaults = SimulationSettings::default();
        assert_eq!(settings.ik.max_iterations, 50);
        assert_eq!(settings.ik.damping, 0.8);
        assert_eq!(settings.ik.tolerance, defaults.ik.tolerance);
        assert_eq!(settings.ik.max_restarts, 0);
        assert_eq!(settings.ik.min_improvement, defaults.ik.min_improvement);
        assert_eq!(settings.trajectory.intervals, 20);
        assert_eq!(settings.trajectory.arc_height_ratio, defaults.trajectory.arc_height_ratio);
        assert_eq!(settings.animation_duration, 2.5);
        assert_eq!(settings.grip_settle_seconds, 0.25);
        assert_eq!(settings.gripper, defaults.gripper);
    }

    #[test]
    fn test_settings_yaml_errors() {
        assert!(SimulationSettings::from_yaml_str("ik:\n  damping: 0").is_err());
        assert!(SimulationSettings::from_yaml_str("trajectory:\n  intervals: -3").is_err());
        assert!(SimulationSettings::from_yaml_str("trajectory:\n  intervals: 0").is_err());
        assert!(SimulationSettings::from_yaml_str("ik:\n  max_restarts: -1").is_err());
        assert!(SimulationSettings::from_yaml_str("animation_duration: fast").is_err());
        assert!(SimulationSettings::from_yaml_str("grip_settle_seconds: -1").is_err());
        assert_eq!(
            SimulationSettings::from_yaml_str("# nothing but a comment\n{}").expect(READ_ERROR),
            SimulationSettings::default()
        );
    }
}
