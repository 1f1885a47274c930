//! Shared test utilities for the bagco-site test suite.
//!
//! Provides fixture builders for on-disk public trees and synthetic scan
//! listings for the pure manifest functions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_public();
//! let records = catalog_folder(tmp.path(), "bakery");
//! assert_eq!(srcs(&records)[0], "/catalog/bakery/croissant.webp");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::manifest::ImageRecord;
use crate::scan::ScannedFile;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a placeholder file at `root/rel`, creating parent directories.
pub fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, b"fake image").unwrap();
}

/// Synthetic scan result for `rel` paths under a fake `/public` root.
///
/// Order is preserved, which is what the dedup tie-break tests depend on.
pub fn listing(rels: &[&str]) -> Vec<ScannedFile> {
    rels.iter()
        .map(|rel| ScannedFile::from_relative(Path::new("/public"), rel))
        .collect()
}

/// A small public tree covering every listing the site serves.
///
/// ```text
/// catalog/bakery/{croissant.jpg, croissant.webp, rolls.png}
/// catalog/winery/cabernet.jpg
/// catalog/pharmacy/{ty/rx-1.jpg, gs/rx-2.webp}
/// catalog/veterinary/vb1/paw.png
/// catalog/custom/1-color/logo.jpg
/// gallery/{floor.jpg, events/booth.webp}
/// ```
pub fn setup_public() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in [
        "catalog/bakery/croissant.jpg",
        "catalog/bakery/croissant.webp",
        "catalog/bakery/rolls.png",
        "catalog/winery/cabernet.jpg",
        "catalog/pharmacy/ty/rx-1.jpg",
        "catalog/pharmacy/gs/rx-2.webp",
        "catalog/veterinary/vb1/paw.png",
        "catalog/custom/1-color/logo.jpg",
        "gallery/floor.jpg",
        "gallery/events/booth.webp",
    ] {
        touch(tmp.path(), rel);
    }
    tmp
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All `src` values in listing order.
pub fn srcs(records: &[ImageRecord]) -> Vec<&str> {
    records.iter().map(|r| r.src.as_str()).collect()
}
