//! Directory walker for source discovery

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{SourceFile, filter::ExcludeFilter};
use crate::error::{IoError, Result};

/// Options for source discovery
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Source extension without the leading dot (matched case-sensitively)
    pub input_extension: String,
    /// Exclude patterns relative to the build directory
    pub exclude_patterns: Vec<String>,
    /// Descend into subdirectories
    pub recursive: bool,
}

impl DiscoveryOptions {
    /// Options for a flat, single-directory discovery of `input_extension` files
    pub fn new(input_extension: &str) -> Self {
        Self {
            input_extension: input_extension.trim_start_matches('.').to_string(),
            exclude_patterns: Vec::new(),
            recursive: false,
        }
    }

    /// Set exclude patterns
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Set recursive processing
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Streaming iterator over the sources of a directory
pub struct SourceDiscovery {
    root: PathBuf,
    walker: walkdir::IntoIter,
    filter: ExcludeFilter,
    extension: String,
}

impl SourceDiscovery {
    /// Start discovering sources under `root`
    pub fn new(root: &Path, options: &DiscoveryOptions) -> Result<Self> {
        if !root.exists() {
            return Err(IoError::directory_not_found(root).into());
        }
        if !root.is_dir() {
            return Err(IoError::not_a_directory(root).into());
        }

        let filter = ExcludeFilter::new(&options.exclude_patterns)?;

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name();
        if !options.recursive {
            walker = walker.max_depth(1);
        }

        Ok(Self {
            root: root.to_path_buf(),
            walker: walker.into_iter(),
            filter,
            extension: options.input_extension.clone(),
        })
    }

    fn should_include(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_file() {
            return false;
        }

        if entry.path().extension() != Some(OsStr::new(&self.extension)) {
            return false;
        }

        let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
        if self.filter.is_excluded(relative) {
            log::debug!("Excluded by pattern: {}", relative.display());
            return false;
        }

        true
    }
}

impl Iterator for SourceDiscovery {
    type Item = SourceFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walker.next()? {
                Ok(entry) => {
                    if self.should_include(&entry) {
                        return Some(SourceFile::new(entry.into_path()));
                    }
                }
                Err(e) => {
                    // Unreadable entries are skipped, not fatal
                    log::warn!("Walk error: {e}");
                }
            }
        }
    }
}

/// Discover every source under `root`, sorted by path
pub fn discover(root: &Path, options: &DiscoveryOptions) -> Result<Vec<SourceFile>> {
    let mut sources: Vec<SourceFile> = SourceDiscovery::new(root, options)?.collect();
    sources.sort();
    log::debug!(
        "Discovered {} *.{} source(s) in {}",
        sources.len(),
        options.input_extension,
        root.display()
    );
    Ok(sources)
}
