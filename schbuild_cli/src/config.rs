use crate::args::BuildArgs;
use crate::output::OutputFormat;
use crate::paths;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schbuild_core::{BuildConfig, Target};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "SCHBUILD_";

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

impl AppConfig {
    /// Apply command-line flags on top of the loaded configuration
    ///
    /// Scalar flags replace configured values, `--exclude` patterns are
    /// added to the configured ones.
    pub fn apply_cli_overrides(&mut self, args: &BuildArgs) {
        if let Some(converter) = &args.converter {
            self.build.converter = converter.clone();
        }
        if !args.converter_args.is_empty() {
            self.build.converter_args = args.converter_args.clone();
        }
        if let Some(ext) = &args.input_extension {
            self.build.input_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(jobs) = args.jobs {
            self.build.jobs = jobs;
        }
        if args.recursive {
            self.build.recursive = true;
        }
        self.build.exclude.extend(args.exclude.iter().cloned());
        if let Some(format) = args.format {
            self.output.format = format;
        }
        if args.no_progress {
            self.output.progress_enabled = false;
        }
    }
}

/// How a configuration key is parsed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Count,
    Flag,
    List,
    Targets,
    Format,
}

/// Every key `config set` accepts
const CONFIG_KEYS: &[(&str, ValueKind)] = &[
    ("build.input_extension", ValueKind::Text),
    ("build.converter", ValueKind::Text),
    ("build.converter_args", ValueKind::List),
    ("build.jobs", ValueKind::Count),
    ("build.recursive", ValueKind::Flag),
    ("build.exclude", ValueKind::List),
    ("build.default_targets", ValueKind::Targets),
    ("output.format", ValueKind::Format),
    ("output.color_enabled", ValueKind::Flag),
    ("output.progress_enabled", ValueKind::Flag),
];

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
    project_dir: Option<PathBuf>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with the default user config path
    pub fn new() -> Self {
        Self::with_path(paths::get_config_path())
    }

    /// Create a ConfigManager with a specific user config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            project_dir: None,
        }
    }

    /// Also read `schbuild.toml` from a build directory
    pub fn with_project_dir(mut self, dir: &Path) -> Self {
        self.project_dir = Some(dir.to_path_buf());
        self
    }

    /// Get the user configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// Project configuration file, if a build directory was given
    pub fn project_config_path(&self) -> Option<PathBuf> {
        self.project_dir.as_deref().map(paths::project_config_path)
    }

    /// Load configuration with layered priority:
    /// ENV > project file > user file > defaults
    ///
    /// Command-line flags are applied afterwards with
    /// [`AppConfig::apply_cli_overrides`].
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            log::debug!("Reading user config {}", self.config_path.display());
            figment = figment.merge(Toml::file(&self.config_path));
        }

        if let Some(project) = self.project_config_path()
            && project.exists()
        {
            log::debug!("Reading project config {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().context("Failed to load configuration")
    }

    /// Get a configuration value by key (dot notation)
    ///
    /// Lists are returned comma-separated.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = Self::to_toml(&self.load()?)?;

        let mut current = &value;
        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{}' not found", key))?;
                }
                _ => anyhow::bail!("Invalid key path: {}", key),
            }
        }

        Self::display_value(current)
            .ok_or_else(|| anyhow::anyhow!("Value at '{}' is not a simple type", key))
    }

    /// Set a configuration value by key (dot notation) in the user config file
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed_value = Self::parse_config_value(key, value)?;

        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).with_context(|| {
                format!("Failed to read {}", self.config_path.display())
            })?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", self.config_path.display()))?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, sections)) = parts.split_last() else {
            anyhow::bail!("Empty key");
        };

        let mut current = &mut config;
        for part in sections {
            let toml::Value::Table(table) = current else {
                anyhow::bail!("Invalid key path: expected table at '{}'", part);
            };
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }

        let toml::Value::Table(table) = current else {
            anyhow::bail!("Cannot set value on non-table");
        };
        table.insert(last.to_string(), parsed_value);

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(&config)?;
        fs::write(&self.config_path, toml_string)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(())
    }

    /// List all configuration values
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = Self::to_toml(&self.load()?)?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn to_toml(config: &AppConfig) -> Result<toml::Value> {
        let toml_string = toml::to_string(config)?;
        Ok(toml::from_str(&toml_string)?)
    }

    /// Recursively collect all key-value pairs from TOML
    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    Self::collect_values(val, new_prefix, items);
                }
            }
            other => {
                if let Some(text) = Self::display_value(other) {
                    items.push((prefix, text));
                }
            }
        }
    }

    fn display_value(value: &toml::Value) -> Option<String> {
        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            toml::Value::Array(items) => items
                .iter()
                .map(Self::display_value)
                .collect::<Option<Vec<_>>>()
                .map(|parts| parts.join(",")),
            _ => None,
        }
    }

    /// Validate a value and convert it to the TOML type of its key
    fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
        let kind = CONFIG_KEYS
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| {
                let known: Vec<&str> = CONFIG_KEYS.iter().map(|(k, _)| *k).collect();
                anyhow::anyhow!(
                    "Unknown configuration key '{}' (known keys: {})",
                    key,
                    known.join(", ")
                )
            })?;

        match kind {
            ValueKind::Text => {
                let text = match key {
                    "build.input_extension" => value.trim().trim_start_matches('.'),
                    _ => value.trim(),
                };
                let mut check = BuildConfig::default();
                match key {
                    "build.input_extension" => check.input_extension = text.to_string(),
                    _ => check.converter = text.to_string(),
                }
                check.validate()?;
                Ok(toml::Value::String(text.to_string()))
            }
            ValueKind::Count => {
                let count: usize = value
                    .trim()
                    .parse()
                    .context("Value must be a positive integer")?;
                if count == 0 {
                    anyhow::bail!("{} must be at least 1", key);
                }
                let count = i64::try_from(count).context("Value is too large")?;
                Ok(toml::Value::Integer(count))
            }
            ValueKind::Flag => {
                let flag: bool = value
                    .trim()
                    .parse()
                    .context("Value must be 'true' or 'false'")?;
                Ok(toml::Value::Boolean(flag))
            }
            ValueKind::List => Ok(toml::Value::Array(
                split_list(value)
                    .map(|item| toml::Value::String(item.to_string()))
                    .collect(),
            )),
            ValueKind::Targets => {
                let mut targets = Vec::new();
                for item in split_list(value) {
                    let target: Target = item.parse()?;
                    targets.push(toml::Value::String(target.name().to_string()));
                }
                if targets.is_empty() {
                    anyhow::bail!("{} needs at least one target", key);
                }
                Ok(toml::Value::Array(targets))
            }
            ValueKind::Format => {
                let format: OutputFormat = value.parse()?;
                let name = match format {
                    OutputFormat::Text => "text",
                    OutputFormat::Json => "json",
                };
                Ok(toml::Value::String(name.to_string()))
            }
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}
