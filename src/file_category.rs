//! Extension-based file categorization.
//!
//! A [`CategoryMap`] is the rulebook that maps lowercase extensions (".jpg",
//! ".pdf", ...) to the name of the folder a file belongs in. Lookups are
//! first-match-wins: when an extension is listed under more than one category,
//! the category that was inserted first owns it.
//!
//! # Examples
//!
//! ```
//! use sortbin::file_category::{CategoryMap, classify};
//!
//! let map = CategoryMap::builtin();
//! assert_eq!(classify("photo.JPG", &map), "Images");
//! assert_eq!(classify("notes.txt", &map), "Documents");
//! assert_eq!(classify("mystery.unknownext", &map), "Other");
//! ```

use crate::scanner::FileEntry;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::path::Path;

/// Category assigned to files whose extension is missing or unknown.
pub const OTHER_CATEGORY: &str = "Other";

/// The built-in rulebook, written to the config file when none exists.
const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Images",
        &[
            ".jpg", ".jpeg", ".jpe", ".jif", ".jfif", ".jfi", ".png", ".gif", ".webp", ".tiff",
            ".tif", ".psd", ".raw", ".arw", ".cr2", ".nrw", ".k25", ".bmp", ".dib", ".heif",
            ".heic", ".ind", ".indd", ".indt", ".jp2", ".j2k", ".jpf", ".jpx", ".jpm", ".mj2",
            ".svg", ".svgz", ".ai", ".eps",
        ],
    ),
    (
        "Videos",
        &[
            ".webm", ".mpg", ".mp2", ".mpeg", ".mpe", ".mpv", ".ogg", ".mp4", ".m4p", ".m4v",
            ".avi", ".wmv", ".mov", ".qt", ".flv", ".swf", ".avchd",
        ],
    ),
    ("Audio", &[".m4a", ".flac", ".mp3", ".wav", ".wma", ".aac"]),
    (
        "Documents",
        &[
            ".doc", ".docx", ".odt", ".pdf", ".xls", ".xlsx", ".ods", ".ppt", ".pptx", ".odp",
            ".txt", ".rtf", ".md",
        ],
    ),
    (
        "Archives",
        &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".iso", ".dmg"],
    ),
    (
        "Scripts",
        &[
            ".py", ".js", ".ts", ".html", ".htm", ".css", ".scss", ".java", ".c", ".cpp", ".h",
            ".cs", ".sh", ".bat", ".php", ".go", ".swift", ".sql", ".json", ".xml", ".yml",
            ".yaml",
        ],
    ),
    ("Executables", &[".exe", ".msi", ".app", ".deb", ".rpm"]),
    ("Fonts", &[".ttf", ".otf", ".woff", ".woff2"]),
    (
        "Data",
        &[".csv", ".dat", ".db", ".log", ".mdb", ".sav", ".sqlite", ".dbf"],
    ),
    ("Presentations", &[".ppt", ".pptx", ".odp", ".key"]),
    ("Spreadsheets", &[".xls", ".xlsx", ".ods", ".csv"]),
];

/// A named bucket of extensions; the name doubles as the destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Ordered mapping from category names to their extensions.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    categories: Vec<Category>,
    extension_map: HashMap<String, usize>,
}

impl CategoryMap {
    /// Creates an empty map. Every file classifies as [`OTHER_CATEGORY`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the built-in default categories.
    pub fn builtin() -> Self {
        let mut map = Self::new();
        for (name, extensions) in BUILTIN_CATEGORIES {
            map.insert(name, extensions.iter().map(|ext| ext.to_string()));
        }
        map
    }

    /// Appends a category, normalizing its extensions.
    ///
    /// Extensions already owned by an earlier category stay with that
    /// category. Inserting a name twice merges into the existing entry.
    pub fn insert<I>(&mut self, name: &str, extensions: I)
    where
        I: IntoIterator<Item = String>,
    {
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(Category {
                    name: name.to_string(),
                    extensions: Vec::new(),
                });
                self.categories.len() - 1
            }
        };

        for raw in extensions {
            let Some(ext) = normalize_extension(&raw) else {
                continue;
            };
            if self.categories[index].extensions.contains(&ext) {
                continue;
            }
            if let Some(owner) = self.extension_map.get(&ext)
                && *owner != index
            {
                log::debug!(
                    "extension {} already belongs to {}; {} entry is shadowed",
                    ext,
                    self.categories[*owner].name,
                    name
                );
            }
            self.extension_map.entry(ext.clone()).or_insert(index);
            self.categories[index].extensions.push(ext);
        }
    }

    /// Returns the category owning a normalized extension such as ".jpg".
    pub fn category_for(&self, extension: &str) -> Option<&str> {
        self.extension_map
            .get(extension)
            .map(|&index| self.categories[index].name.as_str())
    }

    /// Looks up a category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl PartialEq for CategoryMap {
    fn eq(&self, other: &Self) -> bool {
        self.categories == other.categories
    }
}

impl Eq for CategoryMap {}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.extensions)?;
        }
        map.end()
    }
}

/// Normalizes a configured extension: trimmed, lowercase, leading dot.
///
/// Returns `None` for blank input.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}

/// Extracts the lowercase extension of a file name, including the dot.
///
/// Names without a dot, dotfiles such as ".bashrc", and names ending in a
/// dot have no extension.
///
/// ```
/// use sortbin::file_category::extension_of;
///
/// assert_eq!(extension_of("archive.tar.GZ"), Some(".gz".to_string()));
/// assert_eq!(extension_of(".bashrc"), None);
/// assert_eq!(extension_of("Makefile"), None);
/// ```
pub fn extension_of(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_string_lossy();
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Returns the category a file name belongs to, or [`OTHER_CATEGORY`].
pub fn classify<'a>(file_name: &str, categories: &'a CategoryMap) -> &'a str {
    extension_of(file_name)
        .and_then(|ext| categories.category_for(&ext))
        .unwrap_or(OTHER_CATEGORY)
}

/// A scanned file paired with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub entry: FileEntry,
    pub category: String,
}

/// Classifies every entry, preserving scan order.
pub fn classify_entries(entries: &[FileEntry], categories: &CategoryMap) -> Vec<Classification> {
    entries
        .iter()
        .map(|entry| Classification {
            category: classify(&entry.name, categories).to_string(),
            entry: entry.clone(),
        })
        .collect()
}
