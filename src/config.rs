//! Category configuration loading and persistence.
//!
//! The category rulebook lives in a JSON file (by default `categories.json`
//! in the working directory). Keys are folder names, values are lists of
//! extensions. Key order is significant: when two categories list the same
//! extension, the one appearing first wins.
//!
//! # Configuration File Format
//!
//! ```json
//! {
//!   "Images": [".jpg", ".png"],
//!   "Documents": [".pdf", ".txt"]
//! }
//! ```
//!
//! A missing or unparsable file is replaced by the built-in defaults, which
//! are written back to the same path so the user has something to edit.

use crate::file_category::{CategoryMap, normalize_extension};
use crate::session_log::SessionLog;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default location of the category file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "categories.json";

/// Errors that can occur while reading or writing the category file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The category file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The category file exists but could not be read.
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not valid JSON or its top level is not an object.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// The defaults could not be written back.
    #[error("Failed to write configuration {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A parsed category file plus the entries that had to be dropped.
#[derive(Debug)]
pub struct ParsedCategories {
    pub categories: CategoryMap,
    pub warnings: Vec<String>,
}

/// Parses category JSON.
///
/// Names that are not a single plain folder name, non-list values and
/// non-string extensions are dropped and reported in
/// [`ParsedCategories::warnings`]; only a syntax error or a non-object top
/// level is fatal.
pub fn parse_categories(text: &str) -> ConfigResult<ParsedCategories> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(ConfigError::Invalid(
            "top-level value must be an object of category names".to_string(),
        ));
    };

    let mut categories = CategoryMap::new();
    let mut warnings = Vec::new();

    for (name, value) in object {
        if !is_folder_name(&name) {
            warnings.push(format!(
                "Category '{}' is not a plain folder name; ignoring it",
                name
            ));
            continue;
        }
        let Value::Array(items) = value else {
            warnings.push(format!(
                "Category '{}' is not a list of extensions; ignoring it",
                name
            ));
            continue;
        };

        let mut extensions = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(ext) if normalize_extension(&ext).is_some() => extensions.push(ext),
                Value::String(_) => {
                    warnings.push(format!("Category '{}' has an empty extension; ignoring it", name))
                }
                other => warnings.push(format!(
                    "Category '{}' has a non-string extension {}; ignoring it",
                    name, other
                )),
            }
        }
        categories.insert(&name, extensions);
    }

    Ok(ParsedCategories {
        categories,
        warnings,
    })
}

/// A category name must be a single folder directly under the target:
/// not blank, no separators, no `.` or `..`, not absolute.
fn is_folder_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Reads and parses the category file at `path`.
pub fn read_categories(path: &Path) -> ConfigResult<ParsedCategories> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    parse_categories(&text)
}

/// Writes a category map to `path` as pretty-printed JSON.
pub fn save_categories(categories: &CategoryMap, path: &Path) -> ConfigResult<()> {
    let json = serde_json::to_string_pretty(categories).map_err(|e| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, e),
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, json + "\n").map_err(|e| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Loads the category map, falling back to the built-in defaults.
///
/// Never fails: a missing or corrupt file is logged, replaced by the
/// defaults on disk, and the defaults are used for this run even if the
/// write fails.
pub fn load_categories(path: &Path, log: &mut SessionLog) -> CategoryMap {
    match read_categories(path) {
        Ok(parsed) => {
            for warning in &parsed.warnings {
                log::warn!("{}", warning);
                log.warning(warning);
            }
            log.info(&format!(
                "Loaded {} categories from {}",
                parsed.categories.len(),
                path.display()
            ));
            parsed.categories
        }
        Err(e) => {
            let reason = match &e {
                ConfigError::NotFound(_) => {
                    log::info!("No category file at {}", path.display());
                    "not found".to_string()
                }
                other => {
                    log::warn!("Using default categories: {}", other);
                    other.to_string()
                }
            };
            log.warning(&format!(
                "Configuration {} unusable ({}); using default categories",
                path.display(),
                reason
            ));

            let defaults = CategoryMap::builtin();
            match save_categories(&defaults, path) {
                Ok(()) => log.info(&format!(
                    "Wrote default categories to {}",
                    path.display()
                )),
                Err(e) => {
                    log::warn!("{}", e);
                    log.error(&e.to_string());
                }
            }
            defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session_log(dir: &TempDir) -> SessionLog {
        SessionLog::create(&dir.path().join("logs")).expect("Failed to create session log")
    }

    #[test]
    fn test_parse_valid_config_keeps_order() {
        let parsed = parse_categories(
            r#"{"TestCategory": [".test", ".example"], "Images": [".jpg", ".png"]}"#,
        )
        .unwrap();

        assert!(parsed.warnings.is_empty());
        let names: Vec<_> = parsed.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["TestCategory", "Images"]);
        assert_eq!(
            parsed.categories.get("TestCategory").unwrap().extensions,
            vec![".test".to_string(), ".example".to_string()]
        );
    }

    #[test]
    fn test_parse_lowercases_extensions() {
        let parsed = parse_categories(r#"{"Images": [".JPG", ".Png"]}"#).unwrap();
        assert_eq!(parsed.categories.category_for(".jpg"), Some("Images"));
        assert_eq!(parsed.categories.category_for(".png"), Some("Images"));
    }

    #[test]
    fn test_parse_skips_malformed_entries() {
        let parsed = parse_categories(
            r#"{"Images": [".jpg", 42, null], "Broken": ".txt", "Docs": [".pdf", "  "]}"#,
        )
        .unwrap();

        assert_eq!(parsed.warnings.len(), 4);
        assert!(parsed.categories.get("Broken").is_none());
        assert_eq!(
            parsed.categories.get("Images").unwrap().extensions,
            vec![".jpg".to_string()]
        );
        assert_eq!(parsed.categories.category_for(".pdf"), Some("Docs"));
    }

    #[test]
    fn test_parse_rejects_names_that_leave_the_target() {
        let parsed = parse_categories(
            r#"{"../escaped": [".txt"], "/abs": [".jpg"], "a/b": [".png"], "": [".gif"], ".": [".md"], "  ": [".zip"], "Keep": [".pdf"]}"#,
        )
        .unwrap();

        assert_eq!(parsed.warnings.len(), 6);
        assert!(parsed.warnings.iter().all(|w| w.contains("not a plain folder name")));
        assert_eq!(parsed.categories.len(), 1);
        assert_eq!(parsed.categories.category_for(".pdf"), Some("Keep"));
        assert_eq!(parsed.categories.category_for(".txt"), None);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = parse_categories("invalid json content {");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let result = parse_categories(r#"[".jpg"]"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_categories(&dir.path().join("categories.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("categories.json");
        let mut log = session_log(&dir);

        let categories = load_categories(&config_path, &mut log);

        assert_eq!(categories, CategoryMap::builtin());
        assert!(config_path.exists());
        let reloaded = read_categories(&config_path).unwrap();
        assert_eq!(reloaded.categories, categories);
        assert!(reloaded.warnings.is_empty());
    }

    #[test]
    fn test_load_invalid_file_falls_back_and_rewrites() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("categories.json");
        fs::write(&config_path, "invalid json content {").unwrap();
        let mut log = session_log(&dir);

        let categories = load_categories(&config_path, &mut log);

        assert!(categories.get("Images").is_some());
        assert!(read_categories(&config_path).is_ok());
        let log_text = fs::read_to_string(log.path()).unwrap();
        assert!(log_text.contains("WARNING"));
    }

    #[test]
    fn test_load_custom_categories() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("categories.json");
        fs::write(
            &config_path,
            r#"{"CustomCategory": [".custom", ".special"], "Images": [".jpg", ".png"]}"#,
        )
        .unwrap();
        let mut log = session_log(&dir);

        let categories = load_categories(&config_path, &mut log);

        assert_eq!(categories.len(), 2);
        assert_eq!(categories.category_for(".special"), Some("CustomCategory"));
        assert!(categories.get("Documents").is_none());
    }

    #[test]
    fn test_load_with_unwritable_location_still_returns_defaults() {
        let dir = TempDir::new().unwrap();
        // A regular file standing where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let config_path = blocker.join("categories.json");
        let mut log = session_log(&dir);

        let categories = load_categories(&config_path, &mut log);

        assert_eq!(categories, CategoryMap::builtin());
        let log_text = fs::read_to_string(log.path()).unwrap();
        assert!(log_text.contains("ERROR"));
    }
}
