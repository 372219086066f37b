//! Shell-script converter for end-to-end tests
//!
//! The script logs every invocation as `<cwd-name> <input> <output>`, copies
//! the input to the output and fails for inputs whose name starts with
//! `broken`. Needs a POSIX `sh`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
printf '%s %s %s\n' "$(basename "$(pwd)")" "$1" "$2" >> "__LOG__"
case "$1" in
  broken*)
    echo "cannot parse $1" >&2
    exit 1
    ;;
esac
cp "$1" "$2"
"#;

/// A converter script living in its own temporary directory
#[derive(Debug)]
pub struct ScriptedConverter {
    dir: TempDir,
}

impl ScriptedConverter {
    /// Write the script and an empty call log
    pub fn install() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let log = dir.path().join("calls.txt");
        fs::write(&log, b"").expect("failed to create call log");
        let script = SCRIPT.replace("__LOG__", &log.to_string_lossy());
        fs::write(dir.path().join("convert.sh"), script).expect("failed to write script");
        Self { dir }
    }

    /// Path of the script; run it as `sh <script>`
    pub fn script(&self) -> PathBuf {
        self.dir.path().join("convert.sh")
    }

    /// Recorded calls, one `<cwd-name> <input> <output>` line each
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log())
            .expect("failed to read call log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&self) {
        fs::write(self.log(), b"").expect("failed to clear call log");
    }

    fn log(&self) -> PathBuf {
        self.dir.path().join("calls.txt")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
