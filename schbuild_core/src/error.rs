//! Error types for the schbuild core library
//!
//! Errors are grouped by where they come from: filesystem access, invalid
//! settings or patterns, and conversions run by the external converter.

use thiserror::Error;

pub mod conversion;
pub mod io;
pub mod validation;

pub use self::conversion::ConversionError;
pub use self::io::{IoError, IoErrorKind};
pub use self::validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the schbuild core library
///
/// Only `Io` and `Validation` abort a run. `Conversion` errors are scoped to
/// a single job and are folded into the build report by the orchestrator.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Settings and pattern errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single conversion failed
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl Error {
    /// Whether the error concerns the filesystem
    pub fn is_filesystem(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
