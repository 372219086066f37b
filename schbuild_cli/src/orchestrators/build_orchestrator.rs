//! Build command orchestrator
//!
//! Turns the layered configuration into a core build run, renders progress
//! while it runs and prints the report afterwards.

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};
use crate::progress::{create_progress_infrastructure, render_progress};
use anyhow::{Context, Result};
use log::debug;
use schbuild_core::{
    BuildOptions, BuildOrchestrator, BuildReport, BuildRequest, Converter, ProcessConverter,
    ProgressProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-invocation switches that never come from config files
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    pub force: bool,
    pub dry_run: bool,
    pub show_progress: bool,
    pub use_color: bool,
}

/// Orchestrator for the `all`, `png`, `pdf` and `tex` commands
pub struct BuildCommand {
    directory: PathBuf,
    config: AppConfig,
    flags: RunFlags,
    converter: Arc<dyn Converter>,
}

impl BuildCommand {
    /// Validate the configuration and set up the process converter
    ///
    /// A relative converter path is anchored at `invocation_dir`, since each
    /// job runs with its source's directory as working directory.
    pub fn new(
        directory: &Path,
        config: AppConfig,
        flags: RunFlags,
        invocation_dir: &Path,
    ) -> Result<Self> {
        config.build.validate()?;

        let command = config
            .build
            .converter_command()
            .resolve_against(invocation_dir);
        debug!(
            "Converter: {} {:?}",
            command.program().display(),
            command.leading_args()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            config,
            flags,
            converter: Arc::new(ProcessConverter::new(command)),
        })
    }

    /// Use another converter, e.g. an in-process double
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    fn options(&self) -> BuildOptions {
        BuildOptions::new(self.config.build.discovery_options())
            .with_jobs(self.config.build.jobs)
            .with_force(self.flags.force)
            .with_dry_run(self.flags.dry_run)
    }

    /// Run the target groups of `request` and return the report
    pub async fn run(&self, request: BuildRequest) -> Result<(BuildReport, Duration)> {
        let targets = request.targets(&self.config.build.default_targets);
        debug!(
            "Building {:?} in {} (jobs: {}, force: {}, dry run: {})",
            targets,
            self.directory.display(),
            self.config.build.jobs,
            self.flags.force,
            self.flags.dry_run
        );

        let (provider, renderer) = if self.flags.show_progress {
            let (provider, rx) = create_progress_infrastructure();
            (provider, Some(tokio::spawn(render_progress(rx))))
        } else {
            (<dyn ProgressProvider>::null(), None)
        };

        let orchestrator =
            BuildOrchestrator::new(&self.directory, self.options(), self.converter.clone())
                .with_progress(provider.clone());

        let start = Instant::now();
        let result = orchestrator.build(&targets).await;
        let elapsed = start.elapsed();

        // The renderer only exits once the provider lets go of its sender
        provider.complete();
        if let Some(handle) = renderer {
            let _ = handle.await;
        }

        let report = result.with_context(|| {
            format!("Failed to build in {}", self.directory.display())
        })?;
        Ok((report, elapsed))
    }

    /// Run, print the report and fail when any conversion failed
    pub async fn execute(&self, request: BuildRequest) -> CliResult<BuildReport> {
        let (report, elapsed) = self.run(request).await?;

        let formatter = output::create_formatter(
            self.config.output.format,
            self.flags.use_color,
            Some(self.converter.clone()),
        );
        print!("{}", formatter.format_build(&report, elapsed)?);

        for line in output::failure_lines(&report, self.flags.use_color) {
            eprintln!("{line}");
        }

        if !report.is_success() {
            let message = format!(
                "{} of {} conversion(s) failed",
                report.total_failed(),
                report.total_jobs()
            );
            let mut error = CliError::build_failed(&message);
            if self.config.output.format == OutputFormat::Json {
                // The report on stdout already names every failure
                error.suggestions.clear();
            }
            return Err(error);
        }

        Ok(report)
    }
}
