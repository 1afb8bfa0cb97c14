//! Integration tests for logging and configuration

use bridge_traits::log::LogLevel;
use core_runtime::config::{BridgeTimings, KinestexConfig};
use core_runtime::logging::{redact_if_sensitive, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::time::Duration;

#[test]
fn test_logging_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_secret_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_secrets);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_credential_redaction() {
    assert_eq!(redact_if_sensitive("api_key", "live_abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("X-API-KEY", "live_abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("user_id", "user_123"), "user_123");
    assert_eq!(redact_if_sensitive("exercise", "Squats"), "Squats");
}

#[test]
fn test_filter_configuration() {
    let config = LoggingConfig::default().with_filter("core_bridge=debug,core_content=trace");

    assert_eq!(
        config.filter,
        Some("core_bridge=debug,core_content=trace".to_string())
    );
}

#[test]
fn test_config_rejects_poll_longer_than_timeout() {
    let timings = BridgeTimings {
        ready_timeout: Duration::from_millis(10),
        ready_poll_interval: Duration::from_millis(50),
        ..BridgeTimings::default()
    };

    let result = KinestexConfig::builder()
        .credentials("key", "Acme", "user-1")
        .timings(timings)
        .build();

    // Either the capability check or the timing check fails; both are Config-level
    // rejections and neither produces a usable config.
    assert!(matches!(
        result,
        Err(Error::Config(_)) | Err(Error::CapabilityMissing { .. })
    ));
}

#[test]
fn test_config_requires_user_id() {
    let result = KinestexConfig::builder()
        .api_key("key")
        .company_name("Acme")
        .build();

    assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("User id")));
}
