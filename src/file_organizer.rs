//! File organization: moving scanned files into category folders.
//!
//! Every scanned file yields exactly one [`OperationRecord`], whether it was
//! moved, skipped because of a name collision, or failed. A failure never
//! aborts the rest of the batch. In dry-run mode the same records are
//! computed without touching the filesystem.

use crate::file_category::{CategoryMap, classify};
use crate::scanner::{self, FileEntry, ProtectedPaths, ScanResult};
use crate::session_log::Level;
use clap::ValueEnum;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What to do when the destination folder already holds a file of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CollisionPolicy {
    /// Leave the file where it is and record it as skipped
    #[default]
    Skip,
    /// Move it under the first free name of the form "name (N).ext"
    Rename,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Skip => f.write_str("skip"),
            CollisionPolicy::Rename => f.write_str("rename"),
        }
    }
}

/// Options for one organize pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Compute the plan only; never touch the filesystem.
    pub dry_run: bool,
    pub collision: CollisionPolicy,
}

/// Reasons a single file could not be moved.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("permission denied; check whether the file is in use and the folder is writable")]
    PermissionDenied,
    #[error("file not found; it may have been moved or deleted by another process")]
    Vanished,
    #[error("could not create folder {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unexpected OS error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for MoveError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::PermissionDenied => MoveError::PermissionDenied,
            io::ErrorKind::NotFound => MoveError::Vanished,
            _ => MoveError::Io(e),
        }
    }
}

/// Why a file was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DestinationExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DestinationExists => f.write_str("destination exists"),
        }
    }
}

/// Result of handling one file.
#[derive(Debug)]
pub enum Outcome {
    /// Moved, or in a dry run, would be moved.
    Moved,
    Skipped(SkipReason),
    Failed(MoveError),
}

/// The recorded outcome of one attempted relocation.
#[derive(Debug)]
pub struct OperationRecord {
    pub file_name: String,
    pub source: PathBuf,
    pub category: String,
    /// Where the file went (or would go).
    pub destination: PathBuf,
    pub dry_run: bool,
    pub outcome: Outcome,
}

impl OperationRecord {
    /// Log severity: info for moves, warning for skips, error for failures.
    pub fn level(&self) -> Level {
        match self.outcome {
            Outcome::Moved => Level::Info,
            Outcome::Skipped(_) => Level::Warning,
            Outcome::Failed(_) => Level::Error,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self.outcome, Outcome::Moved)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }

    /// Name the file has (or would have) inside its category folder.
    pub fn destination_name(&self) -> String {
        self.destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone())
    }

    /// Human-readable one-line description.
    pub fn message(&self) -> String {
        let renamed = self.destination_name() != self.file_name;
        match (&self.outcome, self.dry_run) {
            (Outcome::Moved, false) if renamed => format!(
                "Moved '{}' to '{}' folder as '{}'",
                self.file_name,
                self.category,
                self.destination_name()
            ),
            (Outcome::Moved, false) => {
                format!("Moved '{}' to '{}' folder", self.file_name, self.category)
            }
            (Outcome::Moved, true) if renamed => format!(
                "Plan: move '{}' to '{}' folder as '{}'",
                self.file_name,
                self.category,
                self.destination_name()
            ),
            (Outcome::Moved, true) => {
                format!("Plan: move '{}' to '{}' folder", self.file_name, self.category)
            }
            (Outcome::Skipped(reason), false) => format!(
                "Skipped '{}': {} in '{}' folder",
                self.file_name, reason, self.category
            ),
            (Outcome::Skipped(reason), true) => format!(
                "Plan: skip '{}': {} in '{}' folder",
                self.file_name, reason, self.category
            ),
            (Outcome::Failed(e), _) => format!("Error moving '{}': {}", self.file_name, e),
        }
    }
}

/// Moves files into category subdirectories of a base directory.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves one file into `base_path/category_dir_name`, creating the folder
    /// if needed and applying the collision policy.
    ///
    /// Returns the final destination on success, `Ok(None)` when the file was
    /// skipped because of a collision.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortbin::file_organizer::{CollisionPolicy, FileOrganizer};
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_to_category(
    ///     Path::new("/path/to/base"),
    ///     Path::new("/path/to/base/image.png"),
    ///     "Images",
    ///     CollisionPolicy::Skip,
    /// );
    /// match result {
    ///     Ok(Some(dest)) => println!("Moved to {}", dest.display()),
    ///     Ok(None) => println!("Already present, skipped"),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn move_to_category(
        base_path: &Path,
        file_path: &Path,
        category_dir_name: &str,
        collision: CollisionPolicy,
    ) -> Result<Option<PathBuf>, MoveError> {
        let category_path = base_path.join(category_dir_name);
        fs::create_dir_all(&category_path).map_err(|e| MoveError::CreateDir {
            path: category_path.clone(),
            source: e,
        })?;

        let Some(destination) =
            Self::plan_destination(&category_path, file_path, collision, &HashSet::new())
        else {
            return Ok(None);
        };

        if !is_occupied(file_path) {
            return Err(MoveError::Vanished);
        }
        fs::rename(file_path, &destination)?;
        Ok(Some(destination))
    }

    /// Computes where a file would land without touching the filesystem.
    ///
    /// A name counts as taken when anything, including a dangling symlink,
    /// exists there or when it is listed in `claimed`. Returns `None` when
    /// the policy is [`CollisionPolicy::Skip`] and the name is taken.
    pub fn plan_destination(
        category_path: &Path,
        file_path: &Path,
        collision: CollisionPolicy,
        claimed: &HashSet<PathBuf>,
    ) -> Option<PathBuf> {
        let file_name = file_path.file_name()?;
        let destination = category_path.join(file_name);
        if !is_taken(&destination, claimed) {
            return Some(destination);
        }
        match collision {
            CollisionPolicy::Skip => None,
            CollisionPolicy::Rename => Some(free_name(category_path, file_path, claimed)),
        }
    }
}

/// True if a directory entry of any kind exists at `path`. Symlinks are
/// not followed.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn is_taken(path: &Path, claimed: &HashSet<PathBuf>) -> bool {
    claimed.contains(path) || is_occupied(path)
}

/// First "stem (N).ext" name not yet taken in `dir`.
fn free_name(dir: &Path, file_path: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, extension));
        if !is_taken(&candidate, claimed) {
            return candidate;
        }
        n += 1;
    }
}

/// What a dry run has decided so far, so later entries see the effects of
/// earlier ones the way a real run would.
#[derive(Debug, Default)]
pub struct PlannedMoves {
    /// Destinations already assigned to an earlier entry.
    claimed: HashSet<PathBuf>,
    /// Sources that an earlier entry moves away.
    vacated: HashSet<PathBuf>,
}

impl PlannedMoves {
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicts the outcome for one file without touching the filesystem.
    fn plan(
        &mut self,
        category_path: &Path,
        file_path: &Path,
        collision: CollisionPolicy,
    ) -> Result<Option<PathBuf>, MoveError> {
        if !self.vacated.contains(category_path)
            && let Ok(metadata) = fs::metadata(category_path)
            && !metadata.is_dir()
        {
            return Err(MoveError::CreateDir {
                path: category_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            });
        }

        let planned =
            FileOrganizer::plan_destination(category_path, file_path, collision, &self.claimed);
        if let Some(destination) = &planned {
            self.claimed.insert(destination.clone());
            self.vacated.insert(file_path.to_path_buf());
        }
        Ok(planned)
    }
}

/// Handles one scanned file: classify, then plan or move it.
///
/// In dry-run mode `planned` carries the decisions made for earlier
/// entries of the same batch; a real run ignores it.
pub fn organize_entry(
    target_dir: &Path,
    entry: &FileEntry,
    categories: &CategoryMap,
    options: OrganizeOptions,
    planned: &mut PlannedMoves,
) -> OperationRecord {
    let category = classify(&entry.name, categories).to_string();
    let category_path = target_dir.join(&category);
    let naive_destination = category_path.join(&entry.name);

    let result = if options.dry_run {
        planned.plan(&category_path, &entry.path, options.collision)
    } else {
        FileOrganizer::move_to_category(target_dir, &entry.path, &category, options.collision)
    };
    let (destination, outcome) = match result {
        Ok(Some(dest)) => (dest, Outcome::Moved),
        Ok(None) => (
            naive_destination,
            Outcome::Skipped(SkipReason::DestinationExists),
        ),
        Err(e) => (naive_destination, Outcome::Failed(e)),
    };

    OperationRecord {
        file_name: entry.name.clone(),
        source: entry.path.clone(),
        category,
        destination,
        dry_run: options.dry_run,
        outcome,
    }
}

/// Lazily organizes already-scanned entries, one record per entry.
pub fn organize_entries<'a>(
    target_dir: &'a Path,
    entries: &'a [FileEntry],
    categories: &'a CategoryMap,
    options: OrganizeOptions,
) -> impl Iterator<Item = OperationRecord> + 'a {
    let mut planned = PlannedMoves::new();
    entries
        .iter()
        .map(move |entry| organize_entry(target_dir, entry, categories, options, &mut planned))
}

/// Scans `target_dir` and organizes every candidate file.
///
/// Fails only when the directory itself cannot be scanned.
pub fn organize(
    target_dir: &Path,
    categories: &CategoryMap,
    protected: &ProtectedPaths,
    options: OrganizeOptions,
) -> ScanResult<Vec<OperationRecord>> {
    let target_dir = scanner::resolve_target_dir(target_dir)?;
    let entries = scanner::scan(&target_dir, protected)?;
    Ok(organize_entries(&target_dir, &entries, categories, options).collect())
}
