//! Integration tests for logging setup

use core_runtime::logging::{
    file_label, init_logging, redact_if_sensitive, LogFormat, LogLevel, LoggingConfig,
};
use std::path::Path;

#[test]
fn test_init_logging_only_once() {
    // The global subscriber can be installed once per process
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_filter("warn");

    assert!(init_logging(config.clone()).is_ok());

    let second = init_logging(config);
    assert!(second.is_err());
    assert!(second
        .unwrap_err()
        .to_string()
        .contains("Failed to initialize logging"));
}

#[test]
fn test_credentials_never_logged() {
    for field in ["api_key", "RAGFLOW_API_KEY", "bearer_token", "authorization"] {
        assert_eq!(redact_if_sensitive(field, "ragflow-XYZ"), "[REDACTED]");
    }
}

#[test]
fn test_normal_values_pass_through() {
    assert_eq!(redact_if_sensitive("dataset_name", "logseq_dataset"), "logseq_dataset");
    assert_eq!(redact_if_sensitive("sha1", "a9993e36"), "a9993e36");
}

#[test]
fn test_file_label_strips_directories() {
    assert_eq!(file_label(Path::new("journals/2024_01_01.md")), "2024_01_01.md");
    assert_eq!(file_label(Path::new("report.pdf")), "report.pdf");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Pretty)
        .with_level(LogLevel::Trace)
        .with_spans(true)
        .with_target(false);

    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.level, LogLevel::Trace);
    assert!(config.enable_spans);
    assert!(!config.display_target);
}
