//! Integration tests for logging functionality

use padkit::config::LoggingConfig;
use padkit::logging::init_logging;
use padkit::{log_export_complete, log_export_start, log_item_failure};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_logging_directory_not_created_up_front() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "daily".to_string(),
    };

    // The directory is created by init_logging, not by the config
    assert!(config.local_enabled);
    assert!(!log_path.exists());
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let result = init_logging("verbose", &LoggingConfig::default());
    assert!(result.is_err());
}

// The global subscriber can be installed once per process, so every
// successful initialization lives in this single test.
#[test]
fn test_file_logging_and_macros() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(guard.has_file_output());
    assert!(log_path.is_dir());

    log_export_start!("batch", 3);
    log_item_failure!(2, "conversion_failed", "decoder rejected stream");
    log_export_complete!("batch", 2, 1, Duration::from_millis(40));

    // A second install fails instead of replacing the first
    assert!(init_logging("info", &LoggingConfig::default()).is_err());

    drop(guard);
    let entries: Vec<_> = std::fs::read_dir(&log_path).unwrap().collect();
    assert!(!entries.is_empty());
}
