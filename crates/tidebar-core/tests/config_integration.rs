//! Integration tests for config parsing against the real config.toml.

use std::path::PathBuf;
use tidebar_core::Config;

fn project_root() -> PathBuf {
    // Navigate from crates/tidebar-core/ up to project root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // project root
        .unwrap()
        .to_path_buf()
}

#[test]
fn test_load_real_config() {
    let config_path = project_root().join("config.toml");

    let config = Config::load(&config_path).expect("Failed to load config.toml");

    // Test for validity rather than exact values, which may change
    assert!(config.bar.size > 0, "Bar size should be positive");
    assert!(!config.widgets.right.is_empty(), "Expected right widgets");

    assert!(
        ["auto", "dark", "light"].contains(&config.theme.mode.as_str()),
        "Theme mode should be valid"
    );
}

#[test]
fn test_real_config_validates() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).unwrap();

    config.validate().expect("Real config.toml should be valid");
}

#[test]
fn test_real_config_has_no_warnings() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).unwrap();

    let warnings = config.warnings();
    assert!(
        warnings.is_empty(),
        "Real config.toml should not warn: {:?}",
        warnings
    );
}

#[test]
fn test_widget_names() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).unwrap();

    assert!(
        config.widgets.center.iter().any(|n| n == "clock"),
        "Expected clock widget in center"
    );
    assert!(
        config.widgets.right.iter().any(|n| n == "battery"),
        "Expected battery widget in right"
    );
    assert!(
        config.widgets.right.iter().any(|n| n == "memory"),
        "Expected memory widget in right"
    );
}

#[test]
fn test_config_summary() {
    let config_path = project_root().join("config.toml");
    let config = Config::load(&config_path).unwrap();

    let summary = config.summary();

    assert!(summary.contains("Bar:"));
    assert!(summary.contains("Widgets:"));
    assert!(summary.contains("Theme:"));
    assert!(summary.contains("size:"), "Summary should show bar size");
}

#[test]
fn test_find_and_load_with_explicit_path() {
    let config_path = project_root().join("config.toml");

    let result = Config::find_and_load(Some(&config_path)).unwrap();

    assert!(!result.used_defaults);
    assert_eq!(result.source.unwrap(), config_path);

    result
        .config
        .validate()
        .expect("Loaded config should be valid");
}

#[test]
fn test_find_and_load_explicit_missing_fails() {
    let missing_path = PathBuf::from("/nonexistent/config.toml");

    // Explicit path that doesn't exist should fail (no fallback)
    let result = Config::find_and_load(Some(&missing_path));
    assert!(result.is_err());
}

#[test]
fn test_broken_config_returns_error_not_defaults() {
    use std::io::Write;

    let temp_dir = std::env::temp_dir().join("tidebar_test_broken_config");
    let _ = std::fs::remove_dir_all(&temp_dir);
    std::fs::create_dir_all(&temp_dir).unwrap();

    let broken_config_path = temp_dir.join("config.toml");
    let mut file = std::fs::File::create(&broken_config_path).unwrap();
    writeln!(file, "this is not valid toml {{{{").unwrap();
    drop(file);

    let result = Config::load(&broken_config_path);
    assert!(result.is_err(), "Broken config should fail to load");

    std::fs::remove_dir_all(&temp_dir).unwrap();
}

#[test]
fn test_default_config_toml_parses_without_error() {
    let config =
        Config::from_default_toml().expect("DEFAULT_CONFIG_TOML should parse without error");

    config
        .validate()
        .expect("DEFAULT_CONFIG_TOML should pass validation");
}

#[test]
fn test_validation_rejects_invalid_theme_mode() {
    let toml = r#"
        [theme]
        mode = "ultra_dark"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    let result = config.validate();

    assert!(result.is_err(), "Invalid theme.mode should fail validation");
    let err = result.unwrap_err().to_string();
    assert!(err.contains("theme.mode"), "Error should mention theme.mode");
}

#[test]
fn test_validation_collects_multiple_errors() {
    let toml = r#"
        [bar]
        size = 0

        [theme]
        mode = "bad_mode"
        accent = "reddish"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    let result = config.validate();

    assert!(result.is_err(), "Multiple invalid values should fail");
    let err = result.unwrap_err().to_string();

    assert!(err.contains("bar.size"), "Should report bar.size error");
    assert!(err.contains("theme.mode"), "Should report theme.mode error");
    assert!(
        err.contains("theme.accent"),
        "Should report theme.accent error"
    );
}

#[test]
fn test_validation_accepts_valid_enum_values() {
    let toml = r#"
        [theme]
        mode = "dark"
        accent = "none"

        [widgets]
        center = ["clock"]
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    config
        .validate()
        .expect("Valid config should pass validation");
}
