//! Progress rendering for the CLI
//!
//! Turns [`ProgressUpdate`] messages into one progress bar per target group.

use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use schbuild_core::{JobStatus, ProgressUpdate, Target};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::mpsc;

/// Render progress updates from a channel until every sender is gone
pub async fn render_progress(mut rx: mpsc::Receiver<ProgressUpdate>) {
    let mut renderer = ProgressRenderer::new();

    while let Some(update) = rx.recv().await {
        renderer.handle_update(update);
    }

    renderer.finish();
}

/// Progress renderer that manages visual progress display
pub struct ProgressRenderer {
    multi: MultiProgress,
    group_bars: HashMap<Target, ProgressBar>,
    group_failures: HashMap<Target, usize>,
}

impl Default for ProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressRenderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            group_bars: HashMap::new(),
            group_failures: HashMap::new(),
        }
    }

    /// Number of failed jobs seen so far
    pub fn failures(&self) -> usize {
        self.group_failures.values().sum()
    }

    pub fn handle_update(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::GroupStarted { target, total } => self.start_group(target, total),
            ProgressUpdate::JobStarted { target, source } => {
                if let Some(bar) = self.group_bars.get(&target) {
                    bar.set_message(file_name(&source).cyan().to_string());
                }
            }
            ProgressUpdate::JobFinished {
                target,
                source,
                status,
            } => self.finish_job(target, &source, &status),
            ProgressUpdate::GroupFinished { target } => self.finish_group(target),
        }
    }

    fn start_group(&mut self, target: Target, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        let style = ProgressStyle::default_bar()
            .template("{prefix:>5.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_prefix(target.to_string());
        self.group_bars.insert(target, bar);
    }

    fn finish_job(&mut self, target: Target, source: &Path, status: &JobStatus) {
        let Some(bar) = self.group_bars.get(&target) else {
            return;
        };

        bar.inc(1);
        if status.is_failure() {
            *self.group_failures.entry(target).or_default() += 1;
            log::debug!("{target}: {} failed", file_name(source));
        }
    }

    fn finish_group(&mut self, target: Target) {
        let Some(bar) = self.group_bars.get(&target) else {
            return;
        };

        match self.group_failures.get(&target) {
            Some(&failed) if failed > 0 => {
                bar.abandon_with_message(format!("{failed} failed").red().to_string())
            }
            _ => bar.finish_with_message("done".green().to_string()),
        }
    }

    /// Finish and clear every bar still running
    pub fn finish(&mut self) {
        for (_, bar) in self.group_bars.drain() {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
