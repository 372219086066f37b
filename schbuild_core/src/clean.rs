//! Removal of generated outputs

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::report::CleanReport;

/// Extensions removed by `clean`: every target plus LaTeX leftovers
pub const CLEAN_EXTENSIONS: &[&str] = &["pdf", "png", "tex", "aux", "log"];

/// Delete every file under `root` whose extension is in `extensions`
///
/// Best effort: a missing directory, an unreadable entry or a failed
/// deletion is logged and skipped. Absence of the file is the goal either way.
pub fn clean(root: &Path, extensions: &[&str], recursive: bool) -> CleanReport {
    let mut report = CleanReport {
        directory: root.to_path_buf(),
        removed: Vec::new(),
    };

    if !root.is_dir() {
        log::warn!("Nothing to clean, not a directory: {}", root.display());
        return report;
    }

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| extensions.contains(&ext));
        if !matches {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                log::debug!("Removed {}", entry.path().display());
                report.removed.push(entry.into_path());
            }
            Err(e) => log::debug!("Could not remove {}: {e}", entry.path().display()),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_outputs_and_keeps_sources() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        for name in ["a.sch", "a.png", "a.pdf", "a.tex", "a.aux", "a.log", "notes.txt"] {
            fs::write(base.join(name), b"x").unwrap();
        }

        let report = clean(base, CLEAN_EXTENSIONS, false);

        assert_eq!(report.removed.len(), 5);
        assert!(base.join("a.sch").exists());
        assert!(base.join("notes.txt").exists());
        assert!(!base.join("a.png").exists());
        assert!(!base.join("a.log").exists());
    }

    #[test]
    fn test_clean_on_clean_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.sch"), b"x").unwrap();

        let report = clean(dir.path(), CLEAN_EXTENSIONS, false);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_clean_missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let report = clean(&dir.path().join("missing"), CLEAN_EXTENSIONS, false);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_clean_recursion_is_opt_in() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("b.png"), b"x").unwrap();

        assert!(clean(dir.path(), CLEAN_EXTENSIONS, false).removed.is_empty());
        assert!(sub.join("b.png").exists());

        let report = clean(dir.path(), CLEAN_EXTENSIONS, true);
        assert_eq!(report.removed, vec![sub.join("b.png")]);
    }
}
