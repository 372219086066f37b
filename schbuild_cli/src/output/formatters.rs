use super::ReportFormatter;
use crate::progress::format_duration;
use anyhow::Result;
use colored::*;
use schbuild_core::{
    BuildReport, CleanReport, Converter, GroupReport, JobReport, JobStatus, SourceFile, plan_job,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
    converter: Option<Arc<dyn Converter>>,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            converter: None,
        }
    }

    /// Show dry-run jobs as the converter command line they would run
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        colorize(self.use_color, text, color)
    }

    fn format_group(&self, group: &GroupReport, root: &Path, dry_run: bool) -> String {
        let mut output = String::new();

        let header = if dry_run {
            format!(
                "{}: {} to build, {} up to date",
                group.target,
                group.would_build(),
                group.up_to_date()
            )
        } else {
            format!(
                "{}: {} built, {} up to date, {} failed",
                group.target,
                group.built(),
                group.up_to_date(),
                group.failed()
            )
        };
        output.push_str(&self.colorize(&header, |s| s.bold()));
        output.push('\n');

        for job in &group.jobs {
            let line = match &job.status {
                JobStatus::UpToDate => continue,
                JobStatus::Built => format!(
                    "{} {} ({}ms)",
                    self.colorize("✓", |s| s.green()),
                    arrow(job, root),
                    job.duration_ms
                ),
                JobStatus::Failed { .. } => {
                    format!("{} {}", self.colorize("✗", |s| s.red()), arrow(job, root))
                }
                JobStatus::WouldBuild => match &self.converter {
                    Some(converter) => {
                        let planned = plan_job(&SourceFile::new(&job.source), group.target);
                        format!(
                            "would run: {} (in {})",
                            converter.describe(&planned),
                            relative(planned.working_dir(), root)
                        )
                    }
                    None => format!("would build {}", arrow(job, root)),
                },
            };
            output.push_str("  ");
            output.push_str(&line);
            output.push('\n');
        }

        output
    }
}

impl ReportFormatter for TextFormatter {
    fn format_build(&self, report: &BuildReport, elapsed: Duration) -> Result<String> {
        let mut output = String::new();

        if report.total_jobs() == 0 {
            output.push_str(&format!(
                "No sources found in {}\n",
                report.directory.display()
            ));
            return Ok(output);
        }

        for group in &report.groups {
            output.push_str(&self.format_group(group, &report.directory, report.dry_run));
        }

        let would_build: usize = report.groups.iter().map(GroupReport::would_build).sum();
        let summary = if report.dry_run {
            format!("Dry run: {would_build} conversion(s) would run")
        } else if report.is_success() {
            self.colorize(
                &format!(
                    "Built {} output(s) in {}",
                    report.total_built(),
                    format_duration(elapsed)
                ),
                |s| s.green(),
            )
        } else {
            self.colorize(
                &format!(
                    "Built {} output(s), {} failed in {}",
                    report.total_built(),
                    report.total_failed(),
                    format_duration(elapsed)
                ),
                |s| s.red(),
            )
        };
        output.push_str(&summary);
        output.push('\n');

        Ok(output)
    }

    fn format_clean(&self, report: &CleanReport) -> Result<String> {
        let mut output = String::new();
        for path in &report.removed {
            output.push_str(&format!("  removed {}\n", relative(path, &report.directory)));
        }
        output.push_str(&format!(
            "Removed {} file(s) from {}\n",
            report.removed.len(),
            report.directory.display()
        ));
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json + "\n")
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_build(&self, report: &BuildReport, _elapsed: Duration) -> Result<String> {
        self.to_json(report)
    }

    fn format_clean(&self, report: &CleanReport) -> Result<String> {
        self.to_json(report)
    }
}

/// One line per failed job, naming the source, target and reason
pub(super) fn failure_lines(report: &BuildReport, use_color: bool) -> Vec<String> {
    report
        .groups
        .iter()
        .flat_map(|group| {
            group.jobs.iter().filter_map(move |job| match &job.status {
                JobStatus::Failed { message } => Some(format!(
                    "{} {} ({}): {}",
                    colorize(use_color, "✗", |s| s.red()),
                    relative(&job.source, &report.directory),
                    group.target,
                    message
                )),
                _ => None,
            })
        })
        .collect()
}

fn colorize(use_color: bool, text: &str, color: fn(&str) -> ColoredString) -> String {
    if use_color {
        color(text).to_string()
    } else {
        text.to_string()
    }
}

fn arrow(job: &JobReport, root: &Path) -> String {
    format!(
        "{} → {}",
        relative(&job.source, root),
        relative(&job.output, root)
    )
}

/// Path relative to the build directory when it lives below it
fn relative(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
