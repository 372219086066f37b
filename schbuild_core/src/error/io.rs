//! I/O related error types

use std::path::{Path, PathBuf};
use thiserror::Error;

/// I/O error with the path it happened on
#[derive(Error, Debug)]
#[error("{}", format_io_error(self))]
pub struct IoError {
    /// The kind of I/O error
    pub kind: IoErrorKind,
    /// Path associated with the error (if any)
    pub path: Option<PathBuf>,
    /// Underlying I/O error (if any)
    #[source]
    pub source: Option<std::io::Error>,
}

/// Kind of I/O error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    /// Build directory missing
    DirectoryNotFound,
    /// Path exists but is not a directory
    NotADirectory,
    /// File not found
    FileNotFound,
    /// Permission denied
    PermissionDenied,
    /// Generic I/O error
    Other,
}

impl IoError {
    /// Create a directory not found error
    pub fn directory_not_found(path: &Path) -> Self {
        Self {
            kind: IoErrorKind::DirectoryNotFound,
            path: Some(path.to_path_buf()),
            source: None,
        }
    }

    /// Create a not-a-directory error
    pub fn not_a_directory(path: &Path) -> Self {
        Self {
            kind: IoErrorKind::NotADirectory,
            path: Some(path.to_path_buf()),
            source: None,
        }
    }

    /// Create an I/O error from a standard I/O error
    pub fn from_std(source: std::io::Error) -> Self {
        let kind = match source.kind() {
            std::io::ErrorKind::NotFound => IoErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => IoErrorKind::PermissionDenied,
            _ => IoErrorKind::Other,
        };

        Self {
            kind,
            path: None,
            source: Some(source),
        }
    }

    /// Attach a path
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

fn format_io_error(error: &IoError) -> String {
    match (&error.kind, &error.path) {
        (IoErrorKind::DirectoryNotFound, Some(path)) => {
            format!("Directory not found: {}", path.display())
        }
        (IoErrorKind::NotADirectory, Some(path)) => {
            format!("Not a directory: {}", path.display())
        }
        (IoErrorKind::FileNotFound, Some(path)) => format!("File not found: {}", path.display()),
        (IoErrorKind::PermissionDenied, Some(path)) => {
            format!("Permission denied: {}", path.display())
        }
        (IoErrorKind::DirectoryNotFound, None) => "Directory not found".to_string(),
        (IoErrorKind::NotADirectory, None) => "Not a directory".to_string(),
        (IoErrorKind::FileNotFound, None) => "File not found".to_string(),
        (IoErrorKind::PermissionDenied, None) => "Permission denied".to_string(),
        (IoErrorKind::Other, path) => {
            let mut message = match &error.source {
                Some(source) => format!("I/O error: {source}"),
                None => "I/O error".to_string(),
            };
            if let Some(path) = path {
                message.push_str(&format!(" ({})", path.display()));
            }
            message
        }
    }
}
