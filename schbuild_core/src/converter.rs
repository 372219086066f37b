//! External converter invocation
//!
//! The converter is an opaque program called as
//! `converter [leading args...] <input> <output>` from inside the source's
//! directory. schbuild only looks at its exit status.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::ConversionError;
use crate::job::BuildJob;

/// What a converter run reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ConverterOutput {
    /// A successful run with no output
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
            ..Default::default()
        }
    }

    /// A failed run with the given exit code and stderr
    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            code: Some(code),
            success: false,
            stderr: stderr.to_string(),
            ..Default::default()
        }
    }
}

/// Runs one conversion
///
/// Implementations must not touch anything but the job's output; the
/// orchestrator may run several jobs at once.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert `job.source()` into `job.output()`
    async fn convert(&self, job: &BuildJob) -> Result<ConverterOutput, ConversionError>;

    /// Command line shown for a job in logs and dry runs
    fn describe(&self, job: &BuildJob) -> String {
        format!(
            "{} {}",
            job.source_name().to_string_lossy(),
            job.output_name().to_string_lossy()
        )
    }
}

/// Converter program and its fixed leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl ConverterCommand {
    /// Command running `program` with no leading arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Set arguments placed before `<input> <output>`
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// Anchor a relative program path such as `../schtex.py` at `base`
    ///
    /// Bare program names are left alone so they are looked up on `PATH`.
    /// Without this, a relative path would be resolved against each job's
    /// working directory.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        if self.program.is_relative() && self.program.components().count() > 1 {
            self.program = base.join(&self.program);
        }
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }
}

/// Converter backed by a child process
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    command: ConverterCommand,
}

impl ProcessConverter {
    pub fn new(command: ConverterCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }
}

#[async_trait]
impl Converter for ProcessConverter {
    async fn convert(&self, job: &BuildJob) -> Result<ConverterOutput, ConversionError> {
        log::debug!(
            "Running `{}` in {}",
            self.describe(job),
            job.working_dir().display()
        );

        let output = tokio::process::Command::new(&self.command.program)
            .args(&self.command.leading_args)
            .arg(job.source_name())
            .arg(job.output_name())
            .current_dir(job.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ConversionError::spawn(&self.command.program.to_string_lossy(), e))?;

        Ok(ConverterOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn describe(&self, job: &BuildJob) -> String {
        let mut parts = vec![self.command.program.to_string_lossy().into_owned()];
        parts.extend(self.command.leading_args.iter().cloned());
        parts.push(job.source_name().to_string_lossy().into_owned());
        parts.push(job.output_name().to_string_lossy().into_owned());
        parts.join(" ")
    }
}
