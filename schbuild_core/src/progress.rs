//! Progress reporting abstractions
//!
//! The orchestrator reports what it is doing through [`ProgressProvider`]
//! without knowing whether anything renders it.

use std::path::PathBuf;
use std::sync::Arc;

use crate::report::JobStatus;
use crate::target::Target;

/// Sink for progress updates
pub trait ProgressProvider: Send + Sync {
    /// Report a progress update
    fn report(&self, update: ProgressUpdate);

    /// Signal that no more updates will follow
    fn complete(&self);
}

/// Progress update emitted by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// A target group is about to be processed
    GroupStarted { target: Target, total: usize },

    /// A converter run is starting
    JobStarted { target: Target, source: PathBuf },

    /// A job has been decided (built, skipped or failed)
    JobFinished {
        target: Target,
        source: PathBuf,
        status: JobStatus,
    },

    /// A target group is done
    GroupFinished { target: Target },
}

/// Provider that discards everything
pub struct NullProvider;

impl ProgressProvider for NullProvider {
    fn report(&self, _update: ProgressUpdate) {}

    fn complete(&self) {}
}

impl dyn ProgressProvider {
    /// Shared null provider
    pub fn null() -> Arc<dyn ProgressProvider> {
        Arc::new(NullProvider)
    }
}
