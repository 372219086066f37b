//! Environment overrides of the configuration
//!
//! Every test runs inside a figment `Jail`, which serializes the tests and
//! restores the environment afterwards.

use figment::Jail;
use schbuild_cli::config::ConfigManager;
use schbuild_cli::output::OutputFormat;
use schbuild_core::Target;

#[test]
fn test_environment_overrides_files() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[build]\njobs = 2\nrecursive = false\n")?;
        jail.create_file("schbuild.toml", "[output]\nformat = \"text\"\n")?;
        jail.set_env("SCHBUILD_BUILD__JOBS", "6");
        jail.set_env("SCHBUILD_BUILD__RECURSIVE", "true");
        jail.set_env("SCHBUILD_OUTPUT__FORMAT", "json");

        let config = ConfigManager::with_path(jail.directory().join("config.toml"))
            .with_project_dir(jail.directory())
            .load()
            .map_err(|e| e.to_string())?;

        assert_eq!(config.build.jobs, 6);
        assert!(config.build.recursive);
        assert_eq!(config.output.format, OutputFormat::Json);
        Ok(())
    });
}

#[test]
fn test_environment_list_values() {
    Jail::expect_with(|jail| {
        jail.set_env("SCHBUILD_BUILD__DEFAULT_TARGETS", "[pdf, tex]");

        let config = ConfigManager::with_path(jail.directory().join("config.toml"))
            .load()
            .map_err(|e| e.to_string())?;

        assert_eq!(config.build.default_targets, vec![Target::Pdf, Target::Tex]);
        Ok(())
    });
}
