//! schbuild core library
//!
//! Discovers schematic sources, plans one conversion job per source and
//! target format, decides which outputs are stale and drives an external
//! converter for each of them.

pub mod clean;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod report;
pub mod target;

// Re-export main types
pub use clean::{CLEAN_EXTENSIONS, clean};
pub use converter::{Converter, ConverterCommand, ConverterOutput, ProcessConverter};
pub use discovery::{DiscoveryOptions, SourceFile, discover};
pub use error::{ConversionError, Error, Result};
pub use job::{BuildJob, is_stale, output_path_for, plan_job};
pub use orchestrator::{BuildOptions, BuildOrchestrator};
pub use progress::{NullProvider, ProgressProvider, ProgressUpdate};
pub use report::{BuildReport, CleanReport, GroupReport, JobReport, JobStatus};
pub use target::{BuildRequest, TARGET_TABLE, Target, TargetSpec};

use error::ValidationError;
use serde::{Deserialize, Serialize};

/// Default extension of schematic sources
pub const DEFAULT_INPUT_EXTENSION: &str = "sch";

/// Default converter program, looked up on `PATH`
pub const DEFAULT_CONVERTER: &str = "schtex";

/// Build settings shared by the CLI configuration layer and the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Extension of source files, without the leading dot
    pub input_extension: String,
    /// Converter program
    pub converter: String,
    /// Arguments placed before `<input> <output>` on the converter command line
    pub converter_args: Vec<String>,
    /// Maximum number of concurrent conversions within one target group
    pub jobs: usize,
    /// Discover sources in subdirectories too
    pub recursive: bool,
    /// Glob patterns (relative to the build directory) of sources to skip
    pub exclude: Vec<String>,
    /// Target groups built by the `all` request
    pub default_targets: Vec<Target>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input_extension: DEFAULT_INPUT_EXTENSION.to_string(),
            converter: DEFAULT_CONVERTER.to_string(),
            converter_args: Vec::new(),
            jobs: 1,
            recursive: false,
            exclude: Vec::new(),
            default_targets: vec![Target::Png],
        }
    }
}

impl BuildConfig {
    /// Check the settings before any work is scheduled
    pub fn validate(&self) -> Result<()> {
        let ext = self.input_extension.as_str();
        if ext.is_empty() || ext.contains('.') || ext.contains(std::path::MAIN_SEPARATOR) {
            return Err(ValidationError::invalid_parameter(
                "input_extension",
                "must be a bare extension such as 'sch'",
            )
            .into());
        }

        if self.converter.trim().is_empty() {
            return Err(ValidationError::invalid_parameter("converter", "must not be empty").into());
        }

        if self.jobs == 0 {
            return Err(ValidationError::invalid_parameter("jobs", "must be at least 1").into());
        }

        if self.default_targets.is_empty() {
            return Err(ValidationError::invalid_parameter(
                "default_targets",
                "at least one target is required",
            )
            .into());
        }

        // Outputs would overwrite their own sources
        if let Some(spec) = TARGET_TABLE.iter().find(|spec| spec.extension == ext) {
            return Err(ValidationError::invalid_parameter(
                "input_extension",
                &format!("collides with the '{}' target extension", spec.target),
            )
            .into());
        }

        Ok(())
    }

    /// Discovery options derived from these settings
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions::new(&self.input_extension)
            .with_recursive(self.recursive)
            .with_exclude_patterns(self.exclude.clone())
    }

    /// Converter command derived from these settings
    pub fn converter_command(&self) -> ConverterCommand {
        ConverterCommand::new(&self.converter).with_leading_args(self.converter_args.clone())
    }
}
