//! Exclude filtering using glob patterns

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::{Result, ValidationError};

/// Compiled exclude patterns
///
/// Patterns are matched against the source path relative to the build
/// directory, so `old/*.sch` skips everything in the `old` subdirectory.
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    globset: GlobSet,
    patterns: Vec<String>,
}

impl ExcludeFilter {
    /// Compile exclude patterns
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| ValidationError::invalid_pattern(pattern, &e.kind().to_string()))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| ValidationError::invalid_pattern(&patterns.join(","), &e.to_string()))?;

        Ok(Self {
            globset,
            patterns: patterns.to_vec(),
        })
    }

    /// Whether a relative source path is excluded
    pub fn is_excluded(&self, relative: &Path) -> bool {
        !self.patterns.is_empty() && self.globset.is_match(relative)
    }

    /// The patterns this filter was built from
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
