use hfs_rehydrate::config::{ConfigLoader, RehydrateConfig};
use hfs_rehydrate::{RehydrationOptions, ResourceForkMode, TextEncoding};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_explicit_file_layers_over_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[source]
text_encoding = "utf16_be"

[rehydration]
resource_forks = "skip"
apply_metadata = false

[logging]
output = "stdout"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(Some(&path)).unwrap();
    assert_eq!(config.source.text_encoding, TextEncoding::Utf16BigEndian);
    assert!(config.tree.allow_partial);
    assert_eq!(config.logging.output, "stdout");
    assert_eq!(config.logging.level, "info");

    let options = RehydrationOptions::from(&config.rehydration);
    assert_eq!(options.resource_forks, ResourceForkMode::Skip);
    assert!(!options.apply_metadata);
}

#[test]
fn test_default_config_matches_loader_default() {
    assert_eq!(ConfigLoader::default(), RehydrateConfig::default());
}

#[test]
fn test_invalid_value_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[rehydration]\nresource_forks = \"sideways\"\n").unwrap();
    assert!(ConfigLoader::load_from_file(&path).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[logging]\ncolor = true\nlevel = \"warn\"\n").unwrap();

    // No other test in this binary reads logging.color.
    std::env::set_var("HFS_REHYDRATE__LOGGING__COLOR", "false");
    let result = ConfigLoader::load_from_file(&path);
    std::env::remove_var("HFS_REHYDRATE__LOGGING__COLOR");

    let config = result.unwrap();
    assert!(!config.logging.color);
    assert_eq!(config.logging.level, "warn");
}
