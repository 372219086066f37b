//! Build orchestration
//!
//! Runs `discover → plan → staleness → convert` for each requested target
//! group. Failures stay local to their job: every other job still runs and
//! the failure ends up in the [`BuildReport`].

use futures::stream::{self, StreamExt};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::clean::{CLEAN_EXTENSIONS, clean};
use crate::converter::Converter;
use crate::discovery::{DiscoveryOptions, SourceFile, discover};
use crate::error::{ConversionError, Result};
use crate::job::{BuildJob, is_stale, plan_job};
use crate::progress::{ProgressProvider, ProgressUpdate};
use crate::report::{BuildReport, CleanReport, GroupReport, JobReport, JobStatus};
use crate::target::Target;

/// Options controlling a build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub discovery: DiscoveryOptions,
    /// Maximum concurrent conversions within a group
    pub jobs: usize,
    /// Rebuild every output regardless of timestamps
    pub force: bool,
    /// Report stale jobs without running the converter
    pub dry_run: bool,
}

impl BuildOptions {
    /// Sequential, incremental build
    pub fn new(discovery: DiscoveryOptions) -> Self {
        Self {
            discovery,
            jobs: 1,
            force: false,
            dry_run: false,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Drives conversions for one build directory
pub struct BuildOrchestrator {
    directory: PathBuf,
    options: BuildOptions,
    converter: Arc<dyn Converter>,
    progress: Arc<dyn ProgressProvider>,
}

impl BuildOrchestrator {
    /// Create an orchestrator for `directory`
    pub fn new(
        directory: impl Into<PathBuf>,
        options: BuildOptions,
        converter: Arc<dyn Converter>,
    ) -> Self {
        Self {
            directory: directory.into(),
            options,
            converter,
            progress: <dyn ProgressProvider>::null(),
        }
    }

    /// Report progress to `provider`
    pub fn with_progress(mut self, provider: Arc<dyn ProgressProvider>) -> Self {
        self.progress = provider;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Sources of the build directory
    pub fn discover(&self) -> Result<Vec<SourceFile>> {
        discover(&self.directory, &self.options.discovery)
    }

    /// Build each target group in turn
    ///
    /// Only discovery errors abort; conversion failures are reported.
    pub async fn build(&self, targets: &[Target]) -> Result<BuildReport> {
        let sources = self.discover()?;
        let mut report = BuildReport::new(self.directory.clone(), self.options.dry_run);

        if sources.is_empty() {
            log::info!(
                "No *.{} sources in {}",
                self.options.discovery.input_extension,
                self.directory.display()
            );
        }

        for &target in targets {
            let group = self.build_group(&sources, target).await;
            log::info!(
                "{target}: {} built, {} up to date, {} failed",
                group.built(),
                group.up_to_date(),
                group.failed()
            );
            report.groups.push(group);
        }

        self.progress.complete();
        Ok(report)
    }

    /// Build one target group for already discovered sources
    pub async fn build_group(&self, sources: &[SourceFile], target: Target) -> GroupReport {
        self.progress.report(ProgressUpdate::GroupStarted {
            target,
            total: sources.len(),
        });

        let jobs: Vec<BuildJob> = sources.iter().map(|s| plan_job(s, target)).collect();

        // `buffered` keeps reports in source order
        let reports: Vec<JobReport> = stream::iter(jobs.iter())
            .map(|job| self.process_job(job))
            .buffered(self.options.jobs.max(1))
            .collect()
            .await;

        self.progress
            .report(ProgressUpdate::GroupFinished { target });

        GroupReport {
            target,
            jobs: reports,
        }
    }

    async fn process_job(&self, job: &BuildJob) -> JobReport {
        let start = Instant::now();

        let status = match self.needs_build(job) {
            Ok(false) => JobStatus::UpToDate,
            Ok(true) if self.options.dry_run => {
                log::info!("Would run: {}", self.converter.describe(job));
                JobStatus::WouldBuild
            }
            Ok(true) => {
                self.progress.report(ProgressUpdate::JobStarted {
                    target: job.target(),
                    source: job.source().path().to_path_buf(),
                });
                match self.run_conversion(job).await {
                    Ok(()) => JobStatus::Built,
                    Err(e) => {
                        log::debug!("{}: {e}", job.source().path().display());
                        JobStatus::Failed {
                            message: e.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                log::debug!("{}: {e}", job.source().path().display());
                JobStatus::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.progress.report(ProgressUpdate::JobFinished {
            target: job.target(),
            source: job.source().path().to_path_buf(),
            status: status.clone(),
        });

        JobReport {
            source: job.source().path().to_path_buf(),
            output: job.output().to_path_buf(),
            status,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn needs_build(&self, job: &BuildJob) -> std::result::Result<bool, ConversionError> {
        if self.options.force {
            return Ok(true);
        }
        is_stale(job)
    }

    /// Run the converter for one job
    ///
    /// Succeeds only if the converter exits with status zero and the output
    /// exists afterwards. When it fails, whatever output it left behind is
    /// kept but backdated so the next run rebuilds it.
    pub async fn run_conversion(&self, job: &BuildJob) -> std::result::Result<(), ConversionError> {
        let result = self.convert(job).await;
        if result.is_err() {
            invalidate_output(job.output());
        }
        result
    }

    async fn convert(&self, job: &BuildJob) -> std::result::Result<(), ConversionError> {
        let output = self.converter.convert(job).await?;

        if !output.stdout.trim().is_empty() {
            log::debug!("converter stdout: {}", output.stdout.trim());
        }

        if !output.success {
            return Err(ConversionError::exit_status(output.code, &output.stderr));
        }

        if !job.output().exists() {
            return Err(ConversionError::MissingOutput {
                path: job.output().to_path_buf(),
            });
        }

        Ok(())
    }

    /// Remove every generated output of the build directory
    pub fn clean(&self) -> CleanReport {
        clean(
            &self.directory,
            CLEAN_EXTENSIONS,
            self.options.discovery.recursive,
        )
    }
}

/// Mark a partial output as older than any source
fn invalidate_output(path: &Path) {
    if !path.exists() {
        return;
    }

    let result = File::options()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(SystemTime::UNIX_EPOCH));
    match result {
        Ok(()) => log::debug!("Backdated partial output {}", path.display()),
        Err(e) => {
            log::warn!("Could not backdate {}: {e}, removing it", path.display());
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Could not remove {}: {e}", path.display());
            }
        }
    }
}
