//! Tests for the depmine configuration system.

use std::sync::Mutex;

use depmine_core::config::DiscoveryConfig;
use depmine_core::errors::ConfigError;
use depmine_core::types::CompatibilityMode;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_depmine_env_vars() {
    for key in [
        "DEPMINE_MAX_TABLE",
        "DEPMINE_MAX_VARS",
        "DEPMINE_MAX_OCCURRENCE",
        "DEPMINE_ALGORITHM",
        "DEPMINE_LOW_QUALITY_FLOOR",
        "DEPMINE_CHECKPOINT_INTERVAL",
        "DEPMINE_DEDUP_ENABLED",
        "DEPMINE_CHECKPOINT_PATH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_depmine_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let config = DiscoveryConfig::load(dir.path()).unwrap();

    assert_eq!(config.max_table, 3);
    assert_eq!(config.algorithm, "dfs");
    assert!((config.low_quality_floor - 0.01).abs() < f64::EPSILON);
    assert!(config.dedup_enabled);
    assert_eq!(config.compatibility.tgd, CompatibilityMode::ForeignKeyOnly);
}

#[test]
fn test_project_file_then_env_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_depmine_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("depmine.toml"),
        r#"
max_table = 4
algorithm = "bfs"

[compatibility]
tgd = "hybrid"
"#,
    )
    .unwrap();

    std::env::set_var("DEPMINE_MAX_TABLE", "2");

    let config = DiscoveryConfig::load(dir.path()).unwrap();
    // Env beats project file; project file beats defaults.
    assert_eq!(config.max_table, 2);
    assert_eq!(config.algorithm, "bfs");
    assert_eq!(config.compatibility.tgd, CompatibilityMode::Hybrid);

    clear_depmine_env_vars();
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let result = DiscoveryConfig::from_toml("max_table = \"not a number\"");
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_validation_rejects_out_of_range_floor() {
    let result = DiscoveryConfig::from_toml("low_quality_floor = 1.5");
    match result {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "low_quality_floor");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn test_validation_rejects_zero_budgets() {
    assert!(matches!(
        DiscoveryConfig::from_toml("max_table = 0"),
        Err(ConfigError::ValidationFailed { .. })
    ));
    assert!(matches!(
        DiscoveryConfig::from_toml("max_vars = 0"),
        Err(ConfigError::ValidationFailed { .. })
    ));
    assert!(matches!(
        DiscoveryConfig::from_toml("max_occurrence = 0"),
        Err(ConfigError::ValidationFailed { .. })
    ));
}

#[test]
fn test_toml_round_trip() {
    let config = DiscoveryConfig::default();
    let toml_str = config.to_toml().unwrap();
    let restored = DiscoveryConfig::from_toml(&toml_str).unwrap();
    assert_eq!(restored.max_table, config.max_table);
    assert_eq!(restored.algorithm, config.algorithm);
    assert_eq!(restored.compatibility.fd, config.compatibility.fd);
}
