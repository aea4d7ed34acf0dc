//! Directory scanning.
//!
//! Lists the regular files directly inside a target directory. Subfolders,
//! and any path registered in [`ProtectedPaths`] (the running executable,
//! the session log directory, the category file), are never returned.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file discovered during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file name, as shown to the user.
    pub name: String,
    /// The absolute path of the file.
    pub path: PathBuf,
}

/// Errors raised when the target directory cannot be used.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cannot read directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Absolute paths that must never be organized.
#[derive(Debug, Clone, Default)]
pub struct ProtectedPaths {
    paths: HashSet<PathBuf>,
}

impl ProtectedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protects the running executable plus the given log directory and
    /// category file.
    pub fn for_session(config_path: &Path, log_dir: &Path) -> Self {
        let mut protected = Self::new();
        match std::env::current_exe() {
            Ok(exe) => protected.insert(&exe),
            Err(e) => log::warn!("Cannot determine own executable path: {}", e),
        }
        protected.insert(log_dir);
        protected.insert(config_path);
        protected
    }

    /// Adds a path, resolved to its absolute form.
    pub fn insert(&mut self, path: &Path) {
        self.paths.insert(absolute_path(path));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(&absolute_path(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolves symlinks where the path exists, otherwise makes it absolute.
fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Validates a target directory and returns its canonical absolute path.
pub fn resolve_target_dir(target: &Path) -> ScanResult<PathBuf> {
    let metadata = fs::metadata(target).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::NotFound(target.to_path_buf()),
        _ => ScanError::Unreadable {
            path: target.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(target.to_path_buf()));
    }
    fs::canonicalize(target).map_err(|e| ScanError::Unreadable {
        path: target.to_path_buf(),
        source: e,
    })
}

/// Lists the candidate files of `target_dir`, sorted by name.
///
/// Only direct children are considered. Entries that vanish or cannot be
/// inspected while listing are silently left out.
pub fn scan(target_dir: &Path, protected: &ProtectedPaths) -> ScanResult<Vec<FileEntry>> {
    let target_dir = resolve_target_dir(target_dir)?;
    let entries = fs::read_dir(&target_dir).map_err(|e| ScanError::Unreadable {
        path: target_dir.clone(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if protected.contains(&path) {
            log::debug!("Skipping protected path {}", path.display());
            continue;
        }
        if !path.is_file() {
            continue;
        }
        files.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Found {} files in {}", files.len(), target_dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(entries: &[FileEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_scan_lists_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.jpg", "c.unknownext"] {
            fs::write(dir.path().join(name), "test content").unwrap();
        }

        let entries = scan(dir.path(), &ProtectedPaths::new()).unwrap();

        assert_eq!(names(&entries), vec!["a.jpg", "b.txt", "c.unknownext"]);
        assert!(entries.iter().all(|e| e.path.is_absolute()));
    }

    #[test]
    fn test_scan_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Images")).unwrap();
        fs::write(dir.path().join("Images").join("nested.jpg"), "x").unwrap();
        fs::write(dir.path().join("top.jpg"), "x").unwrap();

        let entries = scan(dir.path(), &ProtectedPaths::new()).unwrap();

        assert_eq!(names(&entries), vec!["top.jpg"]);
    }

    #[test]
    fn test_scan_skips_protected_paths() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("organizer");
        fs::write(&script, "#!/bin/sh").unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        let log_dir = dir.path().join("logs");
        fs::create_dir(&log_dir).unwrap();

        let mut protected = ProtectedPaths::new();
        protected.insert(&script);
        protected.insert(&log_dir);

        let entries = scan(dir.path(), &protected).unwrap();

        assert_eq!(names(&entries), vec!["keep.txt"]);
    }

    #[test]
    fn test_protected_paths_match_relative_and_absolute_forms() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.json");
        fs::write(&file, "{}").unwrap();

        let mut protected = ProtectedPaths::new();
        protected.insert(&dir.path().join(".").join("config.json"));

        assert!(protected.contains(&file));
        assert_eq!(protected.len(), 1);
    }

    #[test]
    fn test_session_protection_includes_executable() {
        let dir = TempDir::new().unwrap();
        let protected =
            ProtectedPaths::for_session(&dir.path().join("categories.json"), &dir.path().join("logs"));

        let exe = std::env::current_exe().unwrap();
        assert!(protected.contains(&exe));
        assert!(protected.contains(&dir.path().join("logs")));
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan(Path::new("/nonexistent/directory"), &ProtectedPaths::new());
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let result = scan(&file, &ProtectedPaths::new());
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let entries = scan(dir.path(), &ProtectedPaths::new()).unwrap();
        assert!(entries.is_empty());
    }
}
