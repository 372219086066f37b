//! Build and clean reports

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::target::Target;

/// Outcome of a single job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Converter ran and produced the output
    Built,
    /// Output was newer than its source
    UpToDate,
    /// Stale, but the run was a dry run
    WouldBuild,
    /// Conversion failed
    Failed { message: String },
}

impl JobStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Report for one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
    pub duration_ms: u64,
}

/// Report for one target group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub target: Target,
    pub jobs: Vec<JobReport>,
}

impl GroupReport {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            jobs: Vec::new(),
        }
    }

    fn count(&self, pred: impl Fn(&JobStatus) -> bool) -> usize {
        self.jobs.iter().filter(|job| pred(&job.status)).count()
    }

    pub fn built(&self) -> usize {
        self.count(|s| *s == JobStatus::Built)
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|s| *s == JobStatus::UpToDate)
    }

    pub fn would_build(&self) -> usize {
        self.count(|s| *s == JobStatus::WouldBuild)
    }

    pub fn failed(&self) -> usize {
        self.count(JobStatus::is_failure)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Report for a whole build invocation
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub directory: PathBuf,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub groups: Vec<GroupReport>,
}

impl BuildReport {
    pub fn new(directory: PathBuf, dry_run: bool) -> Self {
        Self {
            directory,
            started_at: Utc::now(),
            dry_run,
            groups: Vec::new(),
        }
    }

    /// True when no job failed; an empty build is a success
    pub fn is_success(&self) -> bool {
        self.groups.iter().all(GroupReport::is_success)
    }

    pub fn total_jobs(&self) -> usize {
        self.groups.iter().map(|g| g.jobs.len()).sum()
    }

    pub fn total_built(&self) -> usize {
        self.groups.iter().map(GroupReport::built).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.groups.iter().map(GroupReport::failed).sum()
    }

    /// Failed jobs across all groups
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.groups
            .iter()
            .flat_map(|g| g.jobs.iter())
            .filter(|job| job.status.is_failure())
    }
}

/// Report for a clean invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub directory: PathBuf,
    pub removed: Vec<PathBuf>,
}
