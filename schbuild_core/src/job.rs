//! Build job planning and staleness

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::discovery::SourceFile;
use crate::error::ConversionError;
use crate::target::Target;

/// One conversion of one source into one target format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    source: SourceFile,
    target: Target,
    output: PathBuf,
}

impl BuildJob {
    /// The source being converted
    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Target format of the output
    pub fn target(&self) -> Target {
        self.target
    }

    /// Output path, a sibling of the source
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Directory the converter runs in
    pub fn working_dir(&self) -> &Path {
        self.source.directory()
    }

    /// Source file name relative to [`working_dir`](Self::working_dir)
    pub fn source_name(&self) -> &OsStr {
        self.source.file_name()
    }

    /// Output file name relative to [`working_dir`](Self::working_dir)
    pub fn output_name(&self) -> &OsStr {
        self.output.file_name().unwrap_or_default()
    }
}

/// Output path for `source`: same directory and stem, new extension
pub fn output_path_for(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

/// Plan the job converting `source` into `target`
pub fn plan_job(source: &SourceFile, target: Target) -> BuildJob {
    BuildJob {
        source: source.clone(),
        target,
        output: output_path_for(source.path(), target.extension()),
    }
}

/// Whether the job's output is missing or older than its source
///
/// Equal timestamps count as up to date. Platforms without modification
/// times always rebuild.
pub fn is_stale(job: &BuildJob) -> Result<bool, ConversionError> {
    let source_meta = fs::metadata(job.source.path()).map_err(|source| {
        ConversionError::Staleness {
            path: job.source.path().to_path_buf(),
            source,
        }
    })?;

    let output_meta = match fs::metadata(&job.output) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(source) => {
            return Err(ConversionError::Staleness {
                path: job.output.clone(),
                source,
            });
        }
    };

    match (source_meta.modified(), output_meta.modified()) {
        (Ok(source_time), Ok(output_time)) => Ok(output_time < source_time),
        _ => Ok(true),
    }
}
