//! Source discovery
//!
//! Enumerates the schematic sources of a build directory. Discovery is
//! stateless: every run walks the directory again.

mod filter;
mod walker;

pub use filter::ExcludeFilter;
pub use walker::{DiscoveryOptions, SourceDiscovery, discover};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// A discovered source file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    /// Wrap a source path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Full path as discovered (build directory joined with the file name)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the converter runs in
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// File name without any directory component
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }
}
