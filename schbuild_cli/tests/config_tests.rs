//! Tests for layered configuration files
//!
//! Environment overrides live in `config_env_tests.rs` so the variables they
//! set can never reach these tests.

use schbuild_cli::config::ConfigManager;
use schbuild_cli::output::OutputFormat;
use schbuild_core::Target;
use std::fs;
use tempfile::TempDir;

fn create_test_config_manager(temp_dir: &TempDir) -> ConfigManager {
    ConfigManager::with_path(temp_dir.path().join("config.toml"))
}

#[test]
fn test_defaults_without_any_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config_manager(&temp_dir).load().unwrap();

    assert_eq!(config.build.input_extension, "sch");
    assert_eq!(config.build.converter, "schtex");
    assert_eq!(config.build.jobs, 1);
    assert_eq!(config.build.default_targets, vec![Target::Png]);
    assert_eq!(config.output.format, OutputFormat::Text);
    assert!(config.output.progress_enabled);
}

#[test]
fn test_set_writes_typed_values() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    manager.set("build.jobs", "4").unwrap();
    manager.set("build.recursive", "true").unwrap();
    manager.set("build.converter_args", "--dpi, 300").unwrap();
    manager.set("output.format", "json").unwrap();

    let content = fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    let value: toml::Value = toml::from_str(&content).unwrap();
    assert_eq!(value["build"]["jobs"].as_integer(), Some(4));
    assert_eq!(value["build"]["recursive"].as_bool(), Some(true));
    assert_eq!(value["output"]["format"].as_str(), Some("json"));

    let config = manager.load().unwrap();
    assert_eq!(config.build.jobs, 4);
    assert!(config.build.recursive);
    assert_eq!(config.build.converter_args, vec!["--dpi", "300"]);
    assert_eq!(config.output.format, OutputFormat::Json);
}

#[test]
fn test_set_keeps_other_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[output]\ncolor_enabled = false\n").unwrap();

    let mut manager = ConfigManager::with_path(path);
    manager.set("build.converter", "/opt/schtex/bin/schtex").unwrap();

    assert_eq!(manager.get("output.color_enabled").unwrap(), "false");
    assert_eq!(
        manager.get("build.converter").unwrap(),
        "/opt/schtex/bin/schtex"
    );
}

#[test]
fn test_set_creates_missing_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/schbuild/config.toml");
    let mut manager = ConfigManager::with_path(path.clone());

    manager.set("build.input_extension", "schem").unwrap();

    assert!(path.exists());
    assert_eq!(manager.get("build.input_extension").unwrap(), "schem");
}

#[test]
fn test_invalid_values_are_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);

    assert!(manager.set("build.jobs", "0").is_err());
    assert!(manager.set("build.default_targets", "svg").is_err());
    assert!(manager.set("output.progress_enabled", "maybe").is_err());
    assert!(!temp_dir.path().join("config.toml").exists());
}

#[test]
fn test_get_unknown_key_fails() {
    let temp_dir = TempDir::new().unwrap();
    let manager = create_test_config_manager(&temp_dir);

    let err = manager.get("build.nothing").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_list_flattens_all_keys() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = create_test_config_manager(&temp_dir);
    manager.set("build.default_targets", "png,pdf").unwrap();

    let items = manager.list().unwrap();
    let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();

    assert!(keys.contains(&"build.converter"));
    assert!(keys.contains(&"build.exclude"));
    assert!(keys.contains(&"output.format"));
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));

    let targets = items
        .iter()
        .find(|(k, _)| k == "build.default_targets")
        .map(|(_, v)| v.as_str());
    assert_eq!(targets, Some("png,pdf"));
}

#[test]
fn test_project_file_overrides_user_file() {
    let user_dir = TempDir::new().unwrap();
    let project_dir = TempDir::new().unwrap();
    fs::write(
        user_dir.path().join("config.toml"),
        "[build]\njobs = 2\nconverter = \"user-schtex\"\n",
    )
    .unwrap();
    fs::write(
        project_dir.path().join("schbuild.toml"),
        "[build]\nconverter = \"./tools/schtex\"\n",
    )
    .unwrap();

    let config = create_test_config_manager(&user_dir)
        .with_project_dir(project_dir.path())
        .load()
        .unwrap();

    assert_eq!(config.build.converter, "./tools/schtex");
    assert_eq!(config.build.jobs, 2);
}

#[test]
fn test_malformed_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.toml"), "[build\njobs = ").unwrap();

    assert!(create_test_config_manager(&temp_dir).load().is_err());
}
