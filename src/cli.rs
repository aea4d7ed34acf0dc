//! Command-line interface module for sortbin.
//!
//! This module handles:
//! - Command-line flag parsing
//! - Session setup (log file, categories, protected paths)
//! - The action model: a mode applied to a target directory
//! - Dispatching an action to list, dry-run, or organize

use crate::config::{self, DEFAULT_CONFIG_FILE};
use crate::file_category::{CategoryMap, classify_entries};
use crate::file_organizer::{CollisionPolicy, OperationRecord, OrganizeOptions, organize_entries};
use crate::output::{Destination, OutputFormatter, Reporter, create_progress_bar};
use crate::scanner::{self, ProtectedPaths, ScanResult};
use crate::session_log::{DEFAULT_LOG_DIR, Level, SessionLog, SessionLogError};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sort the files of a directory into category subfolders by extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "sortbin", version, about)]
pub struct Args {
    /// Category file (JSON object of folder name -> extension list).
    /// Recreated with defaults when missing or unreadable.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory for per-run log files.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// What to do when a file of the same name already exists in the
    /// destination folder. "skip" leaves the file in place and records it;
    /// "rename" moves it as "name (N).ext".
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Skip)]
    pub on_collision: CollisionPolicy,

    /// Run a single action and exit instead of showing the menu.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Target directory for --mode (defaults to the current directory).
    #[arg(long, value_name = "DIR", requires = "mode")]
    pub target: Option<PathBuf>,

    /// Write per-file outcomes to the log only; the console shows totals.
    #[arg(short, long)]
    pub quiet: bool,
}

/// What an action does with its target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Move files into their category folders
    Organize,
    /// Show the files that would be considered, with their categories
    List,
    /// Show the organize plan without moving anything
    DryRun,
}

/// Which directory an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelector {
    Current,
    Parent,
    /// A path typed in by the user.
    Custom,
}

/// A menu action: a mode applied to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub mode: Mode,
    pub target: TargetSelector,
}

impl TargetSelector {
    /// Resolves the fixed selectors against the working directory.
    ///
    /// Returns `None` for [`TargetSelector::Custom`], which needs user input.
    pub fn fixed_path(self, cwd: &Path) -> Option<PathBuf> {
        match self {
            TargetSelector::Current => Some(cwd.to_path_buf()),
            TargetSelector::Parent => Some(cwd.parent().unwrap_or(cwd).to_path_buf()),
            TargetSelector::Custom => None,
        }
    }
}

/// Everything one run needs, built once at startup and passed explicitly.
#[derive(Debug)]
pub struct Session {
    pub categories: CategoryMap,
    pub log: SessionLog,
    pub protected: ProtectedPaths,
    pub collision: CollisionPolicy,
    pub quiet: bool,
}

impl Session {
    /// Opens the session log, loads categories, and resolves protected paths.
    ///
    /// # Errors
    ///
    /// Fails only when the session log cannot be created.
    pub fn start(args: &Args) -> Result<Self, SessionLogError> {
        let mut log = SessionLog::create(&args.log_dir)?;
        log.info("Session started");

        let categories = config::load_categories(&args.config, &mut log);
        let protected = ProtectedPaths::for_session(&args.config, &args.log_dir);
        log::debug!("{} protected paths", protected.len());

        Ok(Self {
            categories,
            log,
            protected,
            collision: args.on_collision,
            quiet: args.quiet,
        })
    }

    pub fn finish(mut self) {
        self.log.info("Session ended");
    }

    fn destination(&self) -> Destination {
        if self.quiet {
            Destination::Log
        } else {
            Destination::Both
        }
    }
}

/// Runs one mode against a target directory.
///
/// Returns the operation records (empty for list mode).
///
/// # Errors
///
/// Returns the scan error when the target directory is missing or
/// unreadable; the error is also written to the session log.
pub fn run_action<W: Write>(
    session: &mut Session,
    mode: Mode,
    target: &Path,
    console: &mut OutputFormatter<W>,
) -> ScanResult<Vec<OperationRecord>> {
    let scanned = scanner::resolve_target_dir(target)
        .and_then(|dir| scanner::scan(&dir, &session.protected).map(|entries| (dir, entries)));
    let (target_dir, entries) = match scanned {
        Ok(found) => found,
        Err(e) => {
            session.log.error(&e.to_string());
            return Err(e);
        }
    };

    let destination = session.destination();
    let mut reporter = Reporter::new(&mut session.log, console);

    if mode == Mode::List {
        reporter.console().header(&format!(
            "--- Listing files in: {} ---",
            target_dir.display()
        ));
        let classified = classify_entries(&entries, &session.categories);
        reporter.listing(&target_dir, &classified);
        return Ok(Vec::new());
    }

    let dry_run = mode == Mode::DryRun;
    let header = if dry_run {
        format!("--- Dry run: planning organization in: {} ---", target_dir.display())
    } else {
        format!("--- Organizing files in: {} ---", target_dir.display())
    };
    reporter.console().header(&header);
    reporter.emit(
        Level::Info,
        &format!(
            "{} {} ({} files, on collision: {})",
            if dry_run { "Dry run of" } else { "Organizing" },
            target_dir.display(),
            entries.len(),
            session.collision
        ),
        Destination::Log,
    );

    if entries.is_empty() {
        reporter.emit(
            Level::Info,
            "No files to organize in this directory.",
            Destination::Both,
        );
        return Ok(Vec::new());
    }

    let options = OrganizeOptions {
        dry_run,
        collision: session.collision,
    };
    let records: Vec<OperationRecord> = if dry_run {
        let records: Vec<_> =
            organize_entries(&target_dir, &entries, &session.categories, options).collect();
        reporter.report(&records, destination);
        records
    } else {
        let pb = create_progress_bar(entries.len() as u64);
        let mut records = Vec::with_capacity(entries.len());
        for record in organize_entries(&target_dir, &entries, &session.categories, options) {
            pb.suspend(|| reporter.record(&record, destination));
            pb.inc(1);
            records.push(record);
        }
        pb.finish_and_clear();
        records
    };

    reporter.summary(&records, dry_run);
    if dry_run {
        reporter
            .console()
            .dry_run_notice("Dry run complete. No files were moved.");
    } else {
        reporter.console().success("File organization complete.");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["sortbin"]);
        assert_eq!(args.config, PathBuf::from("categories.json"));
        assert_eq!(args.log_dir, PathBuf::from("logs"));
        assert_eq!(args.on_collision, CollisionPolicy::Skip);
        assert!(args.mode.is_none());
        assert!(!args.quiet);
    }

    #[test]
    fn test_args_one_shot_mode() {
        let args = Args::parse_from([
            "sortbin",
            "--mode",
            "dry-run",
            "--target",
            "/tmp",
            "--on-collision",
            "rename",
        ]);
        assert_eq!(args.mode, Some(Mode::DryRun));
        assert_eq!(args.target, Some(PathBuf::from("/tmp")));
        assert_eq!(args.on_collision, CollisionPolicy::Rename);
    }

    #[test]
    fn test_target_requires_mode() {
        let result = Args::try_parse_from(["sortbin", "--target", "/tmp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_target_paths() {
        let cwd = Path::new("/home/user/downloads");
        assert_eq!(
            TargetSelector::Current.fixed_path(cwd),
            Some(PathBuf::from("/home/user/downloads"))
        );
        assert_eq!(
            TargetSelector::Parent.fixed_path(cwd),
            Some(PathBuf::from("/home/user"))
        );
        assert_eq!(TargetSelector::Custom.fixed_path(cwd), None);
        assert_eq!(
            TargetSelector::Parent.fixed_path(Path::new("/")),
            Some(PathBuf::from("/"))
        );
    }
}
