//! Temporary schematic projects

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Builder for a temporary directory of sources and outputs
#[derive(Debug, Default)]
pub struct TestProjectBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl TestProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schematic source; `name` may contain subdirectories
    pub fn with_source(self, name: &str) -> Self {
        let content = format!("; schematic {name}\nR1 1 2; right\n");
        self.with_file(name, content.as_bytes())
    }

    /// Add an arbitrary file
    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push((name.to_string(), content.to_vec()));
        self
    }

    /// Write everything into a fresh temporary directory
    pub fn build(self) -> TestProject {
        let dir = TempDir::new().expect("failed to create temp dir");
        for (name, content) in &self.files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("failed to create parent dir");
            }
            fs::write(&path, content).expect("failed to write test file");
        }
        TestProject { dir }
    }
}

/// A temporary build directory, removed on drop
#[derive(Debug)]
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file inside the project
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.file(name).exists()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).expect("failed to read test file")
    }

    pub fn write(&self, name: &str, content: &[u8]) {
        fs::write(self.file(name), content).expect("failed to write test file");
    }

    /// Set a file's modification time
    pub fn set_mtime(&self, name: &str, time: SystemTime) {
        File::options()
            .write(true)
            .open(self.file(name))
            .and_then(|f| f.set_modified(time))
            .expect("failed to set modification time");
    }

    /// Mark a file as modified after anything written so far
    ///
    /// Uses a timestamp in the future so coarse filesystem clocks cannot
    /// make the file look as old as outputs written moments ago.
    pub fn touch(&self, name: &str) {
        self.set_mtime(name, SystemTime::now() + Duration::from_secs(10));
    }

    /// Modification time of a file
    pub fn mtime(&self, name: &str) -> SystemTime {
        fs::metadata(self.file(name))
            .and_then(|m| m.modified())
            .expect("failed to read modification time")
    }

    /// File names in the project root with the given extension, sorted
    pub fn files_with_extension(&self, extension: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("failed to read project dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == extension))
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }
}
