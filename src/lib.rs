//! sortbin - sort a directory's files into category folders
//!
//! This library scans a single directory, classifies each file by extension
//! using a JSON-configurable category map, and moves files into one subfolder
//! per category. Every outcome is written to a per-run log file. List and
//! dry-run modes preview the result without touching the filesystem.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod menu;
pub mod output;
pub mod scanner;
pub mod session_log;

pub use cli::{Action, Args, Mode, Session, TargetSelector, run_action};
pub use config::{ConfigError, load_categories};
pub use file_category::{Category, CategoryMap, OTHER_CATEGORY, classify};
pub use file_organizer::{
    CollisionPolicy, FileOrganizer, MoveError, OperationRecord, OrganizeOptions, Outcome, organize,
};
pub use menu::{Menu, MenuChoice, parse_choice};
pub use scanner::{FileEntry, ProtectedPaths, ScanError, scan};
pub use session_log::{Level, SessionLog};
