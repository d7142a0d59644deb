#[cfg(test)]
mod tests {
    use clap::Parser;
    use log::LevelFilter;
    use midibridge::*;
    use std::path::PathBuf;

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_device_list() {
        let devices = handle_device_list();
        assert_eq!(devices.len(), 4);
        assert_eq!(devices[0], "Mock Device 1 [Input]");
        assert_eq!(devices[3], "Mock Device 2 [Output]");
    }

    #[test]
    fn test_args_with_devices() {
        let args = Args::parse_from(["test", "--input", "Keystep", "--output", "UM-ONE"]);
        assert_eq!(args.input, Some("Keystep".to_string()));
        assert_eq!(args.output, Some("UM-ONE".to_string()));
        assert!(!args.device_list);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test"]);
        assert_eq!(args.input, None);
        assert_eq!(args.output, None);
        assert_eq!(args.config, None);
        assert_eq!(args.demo_interval_ms, None);
        assert_eq!(args.log_level, None);
        assert!(!args.device_list);
    }

    #[test]
    fn test_args_config_and_levels() {
        let args = Args::parse_from([
            "test",
            "--config",
            "bridge.toml",
            "--log-level",
            "debug",
            "--demo-interval-ms",
            "0",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("bridge.toml")));
        assert_eq!(args.log_level, Some(LevelFilter::Debug));
        assert_eq!(args.demo_interval_ms, Some(0));
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        assert!(Args::try_parse_from(["test", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_valid_device_binding() {
        let devices = vec![
            "Arturia KeyStep 32 [Input]".to_string(),
            "UM-ONE [Output]".to_string(),
        ];
        assert!(validate_device("KeyStep", &devices).is_ok());
        assert!(validate_device("UM-ONE", &devices).is_ok());
    }

    #[test]
    fn test_invalid_device_binding() {
        let devices = vec!["UM-ONE [Output]".to_string()];
        let error_msg = validate_device("Nonexistent Device", &devices).unwrap_err();
        assert!(error_msg.contains("Nonexistent Device"));
        assert!(error_msg.contains("  - UM-ONE [Output]"));
    }

    #[test]
    fn test_bindings_checked_per_direction() {
        let inputs = vec!["Arturia KeyStep 32".to_string()];
        let outputs = vec!["UM-ONE".to_string()];
        assert!(validate_bindings("KeyStep", "UM-ONE", &inputs, &outputs).is_ok());

        // an output-only port cannot be bound as the input
        let error_msg = validate_bindings("UM-ONE", "UM-ONE", &inputs, &outputs).unwrap_err();
        assert!(error_msg.contains("Device 'UM-ONE' not found"));
        assert!(error_msg.contains("  - Arturia KeyStep 32"));

        let error_msg = validate_bindings("KeyStep", "KeyStep", &inputs, &outputs).unwrap_err();
        assert!(error_msg.contains("  - UM-ONE"));
    }
}
