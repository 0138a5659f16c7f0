//! Unit tests for config.rs module

use std::io::Write;

use motivation_board::config::AppConfig;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn test_default_storage_config() {
    let config = AppConfig::default();

    assert_eq!(config.storage.backend, "sled");
    assert_eq!(config.storage.path, "./data/motivation");
    assert_eq!(config.storage.event_capacity, 64);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_board_config() {
    let config = AppConfig::default();

    assert_eq!(config.board.default_contributor, "ไม่ระบุชื่อ");
    assert_eq!(config.board.history_limit, 20);
    assert_eq!(config.board.max_word_length, 50);
    assert_eq!(config.board.max_template_length, 300);
    assert!(config.board.seed_defaults);
}

#[test]
fn test_validate_rejects_unknown_backend() {
    let mut config = AppConfig::default();
    config.storage.backend = "postgres".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_limits() {
    let mut config = AppConfig::default();
    config.board.history_limit = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.board.max_word_length = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.board.max_template_length = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_blank_contributor() {
    let mut config = AppConfig::default();
    config.board.default_contributor = "   ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_sled_requires_path() {
    let mut config = AppConfig::default();
    config.storage.path = String::new();
    assert!(config.validate().is_err());

    config.storage.backend = "memory".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_into_iter_flattens_sections() {
    let entries: std::collections::HashMap<String, config::Value> = AppConfig::default().into_iter().collect();

    assert!(entries.contains_key("storage.backend"));
    assert!(entries.contains_key("board.seed_defaults"));
    assert!(!entries.contains_key("logging.file_path"));
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let file = write_toml("[storage]\nbackend = \"memory\"\n\n[board]\nhistory_limit = 5\n");

    let config = AppConfig::load_from(Some(file.path())).expect("load");
    assert_eq!(config.storage.backend, "memory");
    assert_eq!(config.board.history_limit, 5);
    assert_eq!(config.board.max_word_length, 50);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_from_file_validates() {
    let file = write_toml("[logging]\nformat = \"yaml\"\n");
    assert!(AppConfig::load_from(Some(file.path())).is_err());
}

#[test]
fn test_validator_uses_configured_bounds() {
    let mut config = AppConfig::default();
    config.board.max_word_length = 3;

    let validator = config.validator();
    assert!(validator.validate_word("abc").is_ok());
    assert!(validator.validate_word("abcd").is_err());
}
