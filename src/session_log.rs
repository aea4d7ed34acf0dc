//! Per-run audit log.
//!
//! Each run appends to one plain-text file named after its start time,
//! `<log_dir>/sortbin_YYYYmmdd_HHMMSS.log`. Every line has the form
//! `YYYY-mm-dd HH:MM:SS - LEVEL - message`. The file is never read back.

use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory for session logs, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Errors raised while setting up the session log. These are fatal.
#[derive(Debug, Error)]
pub enum SessionLogError {
    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Append-only log file for the lifetime of one run.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    file: File,
    write_failed: bool,
}

impl SessionLog {
    /// Creates the log directory if needed and opens this run's log file.
    pub fn create(log_dir: &Path) -> Result<Self, SessionLogError> {
        fs::create_dir_all(log_dir).map_err(|e| SessionLogError::CreateDir {
            path: log_dir.to_path_buf(),
            source: e,
        })?;

        let file_name = format!("sortbin_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        let path = log_dir.join(file_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SessionLogError::Open {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self {
            path,
            file,
            write_failed: false,
        })
    }

    /// Path of this run's log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line. A failed write is retried once and then dropped.
    pub fn write(&mut self, level: Level, message: &str) {
        let line = format_line(level, message);
        if self.file.write_all(line.as_bytes()).is_ok() {
            return;
        }
        if let Err(e) = self.file.write_all(line.as_bytes())
            && !self.write_failed
        {
            self.write_failed = true;
            log::warn!("Could not write to session log {}: {}", self.path.display(), e);
        }
    }

    pub fn info(&mut self, message: &str) {
        self.write(Level::Info, message);
    }

    pub fn warning(&mut self, message: &str) {
        self.write(Level::Warning, message);
    }

    pub fn error(&mut self, message: &str) {
        self.write(Level::Error, message);
    }
}

/// Formats a single log line, flattening embedded newlines.
fn format_line(level: Level, message: &str) -> String {
    format!(
        "{} - {} - {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message.replace(['\r', '\n'], " ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_makes_log_directory() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        let log = SessionLog::create(&log_dir).expect("Failed to create session log");

        assert!(log_dir.is_dir());
        assert!(log.path().is_file());
        let name = log.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("sortbin_"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_lines_carry_level_and_message() {
        let dir = TempDir::new().unwrap();
        let mut log = SessionLog::create(dir.path()).unwrap();

        log.info("moved a.jpg");
        log.warning("skipped b.txt");
        log.error("failed c.bin\nsecond line");

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(" - INFO - moved a.jpg"));
        assert!(lines[1].ends_with(" - WARNING - skipped b.txt"));
        assert!(lines[2].ends_with(" - ERROR - failed c.bin second line"));
    }

    #[test]
    fn test_create_fails_when_directory_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "").unwrap();

        let result = SessionLog::create(&blocker);
        assert!(matches!(result, Err(SessionLogError::CreateDir { .. })));
    }
}
