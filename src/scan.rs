//! Filesystem scanning for the public image trees.
//!
//! The site's images live under a public directory whose layout *is* the
//! catalog:
//!
//! ```text
//! public/
//! ├── gallery/                     # General gallery (any depth)
//! │   ├── events/
//! │   │   └── expo-booth.webp
//! │   └── factory-floor.jpg
//! └── catalog/
//!     ├── bakery/                  # Collection: any subdirectory qualifies
//!     │   ├── croissant.jpg
//!     │   └── croissant.webp       # Same logical name, preferred format
//!     ├── holiday/
//!     │   └── 2024/
//!     │       └── snowman.png
//!     ├── custom/                  # Reserved: fixed 1/2/3-color groups
//!     ├── pharmacy/                # Reserved: ty / gs / plastic-gs
//!     └── veterinary/              # Reserved: vb1 / vb2 / vb6
//! ```
//!
//! ## Failure semantics
//!
//! Scanning never fails. A missing root is an empty catalog section, not an
//! error. An entry that cannot be read partway through a walk (a dangling
//! symlink, an unreadable directory) is logged and skipped, and the walk
//! carries on, so a page always renders with the images that could be read.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Catalog subdirectories served by dedicated endpoints rather than the
/// generic collection listing.
pub const RESERVED_SECTIONS: &[&str] = &["custom", "pharmacy", "veterinary"];

/// A regular file found beneath a scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub absolute: PathBuf,
    /// Path relative to the scan root, always `/`-separated.
    pub relative: String,
}

impl ScannedFile {
    /// Build from a relative path alone. Used to feed the deduplicator
    /// synthetic listings without touching disk.
    pub fn from_relative(root: &Path, relative: &str) -> Self {
        Self {
            absolute: root.join(relative),
            relative: relative.to_string(),
        }
    }
}

/// Every regular file beneath `root`, at any depth, in directory-listing order.
pub fn scan_tree(root: &Path) -> Vec<ScannedFile> {
    let mut files = Vec::new();
    if !root.is_dir() {
        return files;
    }

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    root = %root.display(),
                    error = %err,
                    "skipping unreadable entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        files.push(ScannedFile {
            relative: to_slash_path(rel),
            absolute: entry.into_path(),
        });
    }

    files
}

/// Names of the catalog collections under `catalog_root`.
///
/// A collection is any immediate subdirectory that is neither hidden nor one
/// of the [`RESERVED_SECTIONS`]. Sorted by name.
pub fn list_collections(catalog_root: &Path) -> Vec<String> {
    let entries = match fs::read_dir(catalog_root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| is_collection_name(name))
        .collect();

    names.sort();
    names
}

/// Whether `name` may be served as a generic catalog collection.
pub fn is_collection_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('.') && !RESERVED_SECTIONS.contains(&name)
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
