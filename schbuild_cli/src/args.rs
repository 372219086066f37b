//! Build arguments shared by every build subcommand

use crate::output::OutputFormat;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Default, Clone)]
pub struct BuildArgs {
    /// Build directory containing the schematic sources
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Converter program, invoked as `<program> [args...] <input> <output>`
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub converter: Option<String>,

    /// Extra argument passed to the converter before the file names (repeatable)
    #[arg(
        long = "converter-arg",
        global = true,
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    pub converter_args: Vec<String>,

    /// Source file extension
    #[arg(long = "input-ext", global = true, value_name = "EXT")]
    pub input_extension: Option<String>,

    /// Maximum number of concurrent conversions
    #[arg(short, long, global = true, value_name = "N")]
    pub jobs: Option<usize>,

    /// Convert every source even if its output is current
    #[arg(short = 'B', long, global = true)]
    pub force: bool,

    /// Show which conversions would run without running them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Also look for sources in subdirectories
    #[arg(short, long, global = true)]
    pub recursive: bool,

    /// Skip sources matching a glob pattern (repeatable)
    #[arg(short = 'e', long = "exclude", global = true, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,
}

impl BuildArgs {
    /// The build directory, defaulting to the current directory
    pub fn build_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
