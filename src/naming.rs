//! Filename conventions shared by the scanner, the deduplicator and the
//! catalog listings.
//!
//! ## Extension priority
//!
//! The same picture is often present in several formats (`bag.jpg` next to a
//! compressed `bag.webp`). Listings show one file per logical name, picking
//! the format with the highest rank:
//!
//! | Extension | Rank |
//! |-----------|------|
//! | `.webp`   | 5    |
//! | `.png`    | 4    |
//! | `.jpg`    | 3    |
//! | `.jpeg`   | 2    |
//! | `.gif`    | 1    |
//! | anything else | 0 |
//!
//! ## Logical keys
//!
//! A logical key is a relative path with its extension stripped:
//! `holiday/snowman.webp` and `holiday/snowman.JPG` both map to
//! `holiday/snowman`.

use std::path::Path;

/// Extensions served as catalog images, normalized (lowercase, leading dot).
pub const IMAGE_EXTENSIONS: &[&str] = &[".webp", ".png", ".jpg", ".jpeg", ".gif"];

/// Rank of a normalized extension. Higher is preferred; unknown is 0.
pub fn extension_priority(ext: &str) -> u8 {
    match ext {
        ".webp" => 5,
        ".png" => 4,
        ".jpg" => 3,
        ".jpeg" => 2,
        ".gif" => 1,
        _ => 0,
    }
}

/// Whether a normalized extension belongs to the supported image set.
pub fn is_supported_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Lowercased extension with a leading dot, e.g. `Photo.JPG` → `.jpg`.
///
/// Returns `None` for files without an extension (including dotfiles such
/// as `.DS_Store`, whose whole name is the stem).
pub fn normalize_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Strip the extension from a `/`-separated relative path.
///
/// - `"snowman.webp"` → `"snowman"`
/// - `"2024/snowman.v2.png"` → `"2024/snowman.v2"`
/// - `"README"` → `"README"`
pub fn logical_key(relative: &str) -> String {
    let file_start = relative.rfind('/').map(|i| i + 1).unwrap_or(0);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => relative[..file_start + dot].to_string(),
        _ => relative.to_string(),
    }
}

/// Display name for an image: its file stem (`Snow-Man.webp` → `Snow-Man`).
pub fn display_name(relative: &str) -> String {
    let key = logical_key(relative);
    match key.rfind('/') {
        Some(i) => key[i + 1..].to_string(),
        None => key,
    }
}

/// Title-case a collection slug: `magazine-comics` → `Magazine Comics`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Curated (title, description) for the known catalog collections.
const COLLECTION_COPY: &[(&str, &str, &str)] = &[
    (
        "bakery",
        "Bakery Bags",
        "Browse bakery paper bag designs and request pricing for your preferred sizes.",
    ),
    (
        "college",
        "College & University Bags",
        "Campus-themed bag styles and related paper packaging designs.",
    ),
    (
        "dispensary",
        "Dispensary Bags",
        "Dispensary-ready paper bag options with multiple design styles.",
    ),
    (
        "faith",
        "Faith & Religious Bags",
        "Faith and religious-themed paper bag design collection.",
    ),
    (
        "grocery",
        "Grocery Bags",
        "Paper grocery bag options for retail and checkout use cases.",
    ),
    (
        "holiday",
        "Holiday Bags",
        "Holiday-themed paper bag designs including seasonal programs.",
    ),
    (
        "magazine-comics",
        "Dispensary Store Bags",
        "Bag options and print examples for dispensary storefront and counter use.",
    ),
    (
        "minicases",
        "Mini Cases",
        "Mini cases are typically cheaper per order and come in smaller case counts, \
         usually 500 or 1,000 bags per case. Email info@bagco.com for current options and pricing.",
    ),
    (
        "pride",
        "Pride Bags",
        "Pride-themed paper bag designs for inclusive retail programs.",
    ),
    (
        "seasonal",
        "Seasonal Bags",
        "Seasonal and holiday-style paper bag designs.",
    ),
    (
        "usa",
        "USA Bags",
        "USA-themed bag design collection with non-duplicate imported assets.",
    ),
    (
        "winery",
        "Winery Bags",
        "Winery and bottle-shop oriented paper bag design examples.",
    ),
];

/// Page title and blurb for a collection.
///
/// Unlisted slugs get `"{Title} Bags"` and a generic description.
pub fn collection_copy(slug: &str) -> (String, String) {
    match COLLECTION_COPY.iter().find(|(s, _, _)| *s == slug) {
        Some((_, title, description)) => (title.to_string(), description.to_string()),
        None => {
            let title = title_from_slug(slug);
            (
                format!("{title} Bags"),
                format!("Browse {title} bag designs and request pricing from Bagco."),
            )
        }
    }
}
