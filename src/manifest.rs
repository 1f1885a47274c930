//! Catalog manifests: scanned files → deduplicated, URL-mapped image lists.
//!
//! Every listing is built the same way:
//!
//! ```text
//! scan_tree(root)          Vec<ScannedFile>       (filesystem, unordered)
//!   → dedup(files, prefix) Vec<ImageEntry>        (pure)
//!   → sort / shuffle       Vec<ImageEntry>        (pure)
//!   → ImageRecord          JSON wire shape
//! ```
//!
//! [`dedup`] and the ordering functions never touch the filesystem, so tests
//! feed them synthetic listings built with [`ScannedFile::from_relative`].
//!
//! ## Deduplication rule
//!
//! Files sharing a logical key (relative path minus extension) collapse to
//! one entry: the one whose extension ranks highest in
//! [`extension_priority`]. A candidate is skipped when the stored entry's
//! rank is `>=` its own, so on a tie the first file seen wins. Listing order
//! therefore matters for ties and must not be replaced by map-overwrite
//! semantics.

use crate::naming::{
    collection_copy, display_name, extension_priority, is_supported_extension, logical_key,
    normalize_extension,
};
use crate::scan::{ScannedFile, list_collections, scan_tree};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// One image that survived deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Relative path minus extension, e.g. `2024/snowman`.
    pub logical_key: String,
    /// Public URL, e.g. `/catalog/holiday/2024/snowman.webp`.
    pub served_path: String,
    pub display_name: String,
    /// Normalized extension of the chosen file, e.g. `.webp`.
    pub source_extension: String,
    /// Directory of the file relative to its scan root; empty at the root.
    pub folder: String,
}

/// Collapse same-key files to their highest-priority format.
///
/// `url_prefix` is joined to each relative path with a `/` to form the
/// served path. Keys keep the order in which they were first seen.
pub fn dedup(files: &[ScannedFile], url_prefix: &str) -> Vec<ImageEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut chosen: HashMap<String, (u8, ImageEntry)> = HashMap::new();

    for file in files {
        let Some(ext) = normalize_extension(Path::new(&file.relative)) else {
            continue;
        };
        if !is_supported_extension(&ext) {
            continue;
        }

        let key = logical_key(&file.relative);
        let rank = extension_priority(&ext);

        if let Some((stored_rank, _)) = chosen.get(&key)
            && *stored_rank >= rank
        {
            continue;
        }

        let entry = ImageEntry {
            logical_key: key.clone(),
            served_path: join_url(url_prefix, &file.relative),
            display_name: display_name(&file.relative),
            source_extension: ext,
            folder: parent_folder(&file.relative),
        };
        if chosen.insert(key.clone(), (rank, entry)).is_none() {
            order.push(key);
        }
    }

    order
        .into_iter()
        .filter_map(|key| chosen.remove(&key).map(|(_, entry)| entry))
        .collect()
}

/// Sort ascending by served path (plain string comparison).
pub fn sort_by_served_path(entries: &mut [ImageEntry]) {
    entries.sort_by(|a, b| a.served_path.cmp(&b.served_path));
}

/// Uniform random permutation (Fisher–Yates).
pub fn shuffle<R: Rng + ?Sized>(entries: &mut [ImageEntry], rng: &mut R) {
    entries.shuffle(rng);
}

/// Distinct, non-empty folder tags, sorted.
pub fn folders(entries: &[ImageEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.folder.as_str())
        .filter(|f| !f.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

fn join_url(prefix: &str, relative: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), relative)
}

fn parent_folder(relative: &str) -> String {
    relative
        .rfind('/')
        .map(|i| relative[..i].to_string())
        .unwrap_or_default()
}

// =============================================================================
// Wire shape
// =============================================================================

/// JSON record served for each image.
///
/// At most one discriminator is set, depending on the listing: `type` for
/// pharmacy bags, `design` for veterinary bags, `folder` for the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRecord {
    pub src: String,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl ImageRecord {
    pub fn plain(entry: &ImageEntry) -> Self {
        Self {
            src: entry.served_path.clone(),
            name: entry.display_name.clone(),
            kind: None,
            design: None,
            folder: None,
        }
    }

    /// Gallery form: carries the entry's folder tag.
    pub fn with_folder(entry: &ImageEntry) -> Self {
        Self {
            folder: Some(entry.folder.clone()),
            ..Self::plain(entry)
        }
    }

    fn tagged(entry: &ImageEntry, tag: GroupTag, value: &str) -> Self {
        let mut record = Self::plain(entry);
        match tag {
            GroupTag::None => {}
            GroupTag::Type => record.kind = Some(value.to_string()),
            GroupTag::Design => record.design = Some(value.to_string()),
        }
        record
    }
}

// =============================================================================
// Section builders
// =============================================================================

/// Which discriminator a grouped section stamps on its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTag {
    None,
    Type,
    Design,
}

/// A reserved catalog section made of fixed sub-groups.
#[derive(Debug, Clone, Copy)]
pub struct GroupedSection {
    pub name: &'static str,
    pub groups: &'static [&'static str],
    pub tag: GroupTag,
}

pub const CUSTOM: GroupedSection = GroupedSection {
    name: "custom",
    groups: &["1-color", "2-color", "3-color"],
    tag: GroupTag::None,
};

pub const PHARMACY: GroupedSection = GroupedSection {
    name: "pharmacy",
    groups: &["ty", "gs", "plastic-gs"],
    tag: GroupTag::Type,
};

pub const VETERINARY: GroupedSection = GroupedSection {
    name: "veterinary",
    groups: &["vb1", "vb2", "vb6"],
    tag: GroupTag::Design,
};

/// Sorted images of one generic collection, `public/catalog/<folder>`.
pub fn catalog_folder(public_dir: &Path, folder: &str) -> Vec<ImageRecord> {
    let root = public_dir.join("catalog").join(folder);
    let mut entries = dedup(&scan_tree(&root), &format!("/catalog/{folder}"));
    sort_by_served_path(&mut entries);
    entries.iter().map(ImageRecord::plain).collect()
}

/// Every group of a reserved section, each deduplicated and sorted on its own.
///
/// Groups with no directory on disk are present with an empty list.
pub fn grouped_section(
    public_dir: &Path,
    section: &GroupedSection,
) -> BTreeMap<String, Vec<ImageRecord>> {
    let base = public_dir.join("catalog").join(section.name);
    section
        .groups
        .iter()
        .map(|group| {
            let prefix = format!("/catalog/{}/{}", section.name, group);
            let mut entries = dedup(&scan_tree(&base.join(group)), &prefix);
            sort_by_served_path(&mut entries);
            let records = entries
                .iter()
                .map(|e| ImageRecord::tagged(e, section.tag, group))
                .collect();
            (group.to_string(), records)
        })
        .collect()
}

/// Flattened, shuffled listing of every gallery root under `public_dir`.
///
/// Each root (e.g. `gallery`, `catalog`) is deduplicated on its own and
/// served under `/<root>/...`. Files directly inside the `gallery` root are
/// tagged `gallery`; everything else is tagged with its directory relative
/// to `public_dir` minus a leading `gallery/` (`gallery/events` → `events`,
/// `catalog/bakery` stays `catalog/bakery`).
pub fn gallery<R: Rng + ?Sized>(
    public_dir: &Path,
    roots: &[String],
    rng: &mut R,
) -> Vec<ImageEntry> {
    let mut all = Vec::new();
    for root in roots {
        let root = root.trim_matches('/');
        let mut entries = dedup(&scan_tree(&public_dir.join(root)), &format!("/{root}"));
        for entry in &mut entries {
            entry.folder = gallery_folder_tag(root, &entry.folder);
        }
        all.extend(entries);
    }
    shuffle(&mut all, rng);
    all
}

/// One entry of the catalog index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub href: String,
}

/// Every generic collection under `public/catalog`, sorted by slug.
pub fn collections(public_dir: &Path) -> Vec<CollectionSummary> {
    list_collections(&public_dir.join("catalog"))
        .into_iter()
        .map(|slug| {
            let (title, description) = collection_copy(&slug);
            CollectionSummary {
                href: format!("/catalog/{slug}"),
                slug,
                title,
                description,
            }
        })
        .collect()
}

fn gallery_folder_tag(root: &str, folder: &str) -> String {
    match (root, folder.is_empty()) {
        ("gallery", true) => "gallery".to_string(),
        ("gallery", false) => folder.to_string(),
        (_, true) => root.to_string(),
        (_, false) => format!("{root}/{folder}"),
    }
}
