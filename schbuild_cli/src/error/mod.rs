use colored::*;
use schbuild_core::error::{IoErrorKind, ValidationError};
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    /// The main error message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Additional context information
    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    BuildFailed,
    Filesystem,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    BuildFailed = 3,
    FilesystemError = 4,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
    fn with_source(self, source: Box<dyn StdError + Send + Sync>) -> Self;
}

impl CliError {
    fn new(message: &str, category: ErrorCategory) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self::new(message, ErrorCategory::General)
    }

    /// Create a command misuse error
    pub fn misuse(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Misuse);
        error
            .suggestions
            .push("Run 'schbuild --help' for usage information".to_string());
        error
    }

    /// Create an error for a build with failed conversions
    pub fn build_failed(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::BuildFailed);
        error
            .suggestions
            .push("Fix the failing sources and run the build again".to_string());
        error
            .suggestions
            .push("Run with --debug to see the converter output".to_string());
        error
    }

    /// Create a filesystem error
    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::new(message, ErrorCategory::Filesystem);

        if message.contains("not found") {
            error
                .suggestions
                .push("Check if the directory exists".to_string());
            error
                .suggestions
                .push("Pass the build directory with --dir".to_string());
        } else if message.contains("permission") || message.contains("denied") {
            error.suggestions.push("Check file permissions".to_string());
        }

        error
    }

    /// Create an error from an IO error
    pub fn from_io_error(error: io::Error, path: &str) -> Self {
        let message = format!("IO error on '{path}': {error}");
        let mut cli_error = match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Self::filesystem(&message),
            _ => Self::general(&message),
        };

        cli_error.source = Some(Box::new(error));
        cli_error
            .context
            .push(("path".to_string(), path.to_string()));
        cli_error
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::BuildFailed => ExitCode::BuildFailed,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
        }
    }

    fn label(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::BuildFailed => "Build Failed",
            ErrorCategory::Filesystem => "File Error",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse => self.label().yellow(),
            _ => self.label().red(),
        };

        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message)?;

        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }

        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

/// Map core errors onto exit code categories
impl From<schbuild_core::Error> for CliError {
    fn from(error: schbuild_core::Error) -> Self {
        let message = error.to_string();
        let cli_error = match &error {
            schbuild_core::Error::Io(io) => {
                let mut cli_error = Self::filesystem(&message);
                if let Some(path) = &io.path {
                    cli_error = cli_error.with_context("path", &path.display().to_string());
                }
                if io.kind == IoErrorKind::NotADirectory {
                    cli_error = cli_error.with_suggestion("The build directory must be a directory");
                }
                cli_error
            }
            schbuild_core::Error::Validation(ValidationError::InvalidPattern { .. }) => {
                Self::misuse(&message).with_suggestion("Check the --exclude glob patterns")
            }
            schbuild_core::Error::Validation(_) => Self::misuse(&message),
            schbuild_core::Error::Conversion(_) => Self::build_failed(&message),
        };
        cli_error.with_source(Box::new(error))
    }
}

/// Convert anyhow errors to CLI errors, keeping core error categories
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<schbuild_core::Error>() {
            Ok(core) => core.into(),
            Err(other) => Self::general(&format!("{other:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schbuild_core::error::IoError;
    use std::path::Path;

    #[test]
    fn test_exit_codes_follow_categories() {
        assert_eq!(CliError::general("x").exit_code(), ExitCode::GeneralError);
        assert_eq!(CliError::misuse("x").exit_code(), ExitCode::Misuse);
        assert_eq!(CliError::build_failed("x").exit_code(), ExitCode::BuildFailed);
        assert_eq!(CliError::filesystem("x").exit_code(), ExitCode::FilesystemError);
        assert_eq!(ExitCode::BuildFailed as u8, 3);
    }

    #[test]
    fn test_missing_directory_maps_to_filesystem() {
        let core = schbuild_core::Error::Io(IoError::directory_not_found(Path::new("/nope")));
        let error = CliError::from(core);
        assert_eq!(error.exit_code(), ExitCode::FilesystemError);
        assert!(error.to_string().contains("/nope"));
    }

    #[test]
    fn test_validation_maps_to_misuse() {
        let core: schbuild_core::Error =
            ValidationError::invalid_parameter("jobs", "must be at least 1").into();
        let error = CliError::from(core);
        assert_eq!(error.exit_code(), ExitCode::Misuse);
    }

    #[test]
    fn test_anyhow_wrapping_core_error_keeps_category() {
        let core = schbuild_core::Error::Io(IoError::directory_not_found(Path::new("/nope")));
        let error = CliError::from(anyhow::Error::new(core));
        assert_eq!(error.exit_code(), ExitCode::FilesystemError);

        let error = CliError::from(anyhow::anyhow!("plain failure"));
        assert_eq!(error.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn test_format_for_user_lists_suggestions() {
        colored::control::set_override(false);
        let text = CliError::build_failed("1 of 3 conversions failed").format_for_user(false);
        assert!(text.starts_with("Build Failed: 1 of 3 conversions failed"));
        assert!(text.contains("Suggestions:"));
    }

    #[test]
    fn test_debug_format_shows_cause_chain() {
        colored::control::set_override(false);
        let io = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let error = CliError::from_io_error(io, "boards");
        assert!(!error.format_for_user(false).contains("Caused by"));
        assert!(error.format_for_user(true).contains("1: no such file"));
    }
}
