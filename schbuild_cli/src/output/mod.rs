mod formatters;

pub use formatters::{JsonFormatter, TextFormatter};

use anyhow::Result;
use clap::ValueEnum;
use schbuild_core::{BuildReport, CleanReport, Converter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown output format: {} (expected text or json)", s),
        }
    }
}

/// Trait for report formatters
pub trait ReportFormatter: Send + Sync {
    /// Format the report of a build run
    fn format_build(&self, report: &BuildReport, elapsed: Duration) -> Result<String>;

    /// Format the report of a clean run
    fn format_clean(&self, report: &CleanReport) -> Result<String>;
}

/// Create a formatter based on output format
///
/// The converter is only used by the text formatter to show the command
/// lines a dry run would execute.
pub fn create_formatter(
    format: OutputFormat,
    use_color: bool,
    converter: Option<Arc<dyn Converter>>,
) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(use_color);
            Box::new(match converter {
                Some(converter) => formatter.with_converter(converter),
                None => formatter,
            })
        }
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

/// Per-job failure lines for stderr
pub fn failure_lines(report: &BuildReport, use_color: bool) -> Vec<String> {
    formatters::failure_lines(report, use_color)
}
