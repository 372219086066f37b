//! Per-job conversion failures

use std::path::PathBuf;
use thiserror::Error;

/// Why a single conversion job failed
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The converter process could not be started
    #[error("Failed to start converter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but reported failure
    #[error("{}", format_exit(*code, stderr))]
    ExitStatus { code: Option<i32>, stderr: String },

    /// The converter exited successfully without producing the output
    #[error("Converter succeeded but did not produce {}", path.display())]
    MissingOutput { path: PathBuf },

    /// Timestamps of the job could not be compared
    #[error("Cannot read modification time of {}: {source}", path.display())]
    Staleness {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    /// Create a spawn error
    pub fn spawn(program: &str, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.to_string(),
            source,
        }
    }

    /// Create an exit status error
    pub fn exit_status(code: Option<i32>, stderr: &str) -> Self {
        Self::ExitStatus {
            code,
            stderr: stderr.trim().to_string(),
        }
    }
}

fn format_exit(code: Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("Converter exited with status {code}"),
        None => "Converter terminated by signal".to_string(),
    };

    // Last line is usually the one that says what went wrong
    match stderr.lines().rev().find(|line| !line.trim().is_empty()) {
        Some(line) => format!("{status}: {}", line.trim()),
        None => status,
    }
}
