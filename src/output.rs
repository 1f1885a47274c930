//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every listing leads with what a person would call the thing (collection
//! title, image name, design) and shows the served URL as an indented
//! `Source:` line underneath, so the output reads like a catalog inventory
//! while still pointing at the exact file behind each entry.
//!
//! # Output Format
//!
//! ## Collection
//!
//! ```text
//! Bakery Bags (2 images)
//!     001 croissant
//!         Source: /catalog/bakery/croissant.webp
//!     002 rolls
//!         Source: /catalog/bakery/rolls.png
//! ```
//!
//! ## Grouped section
//!
//! ```text
//! pharmacy
//! 001 gs (1 images)
//!     001 rx-2
//!         Source: /catalog/pharmacy/gs/rx-2.webp
//! 002 plastic-gs (0 images)
//! ```
//!
//! ## Quote
//!
//! ```text
//! GS #25 (6" x 4" x 11")
//!     Cases: 4 (8,000 bags)
//!     Price per case: $65.91
//!     Subtotal: $263.64
//!     Setup fee: $50.00
//!     Total: $313.64
//! ```
//!
//! # Architecture
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::SiteConfig;
use crate::manifest::{CollectionSummary, ImageEntry, ImageRecord};
use crate::quote::{Dollars, Quote, group_thousands};
use std::collections::BTreeMap;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 name` followed by an indented `Source:` line.
fn image_lines(depth: usize, index: usize, name: &str, src: &str) -> [String; 2] {
    [
        format!("{}{} {}", indent(depth), format_index(index), name),
        format!("{}Source: {}", indent(depth + 1), src),
    ]
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Format the collection index.
///
/// ```text
/// 001 Bakery Bags
///     Slug: bakery → /catalog/bakery
///     Browse bakery paper bag designs and request pricing for your prefer...
/// ```
pub fn format_collections(collections: &[CollectionSummary]) -> Vec<String> {
    if collections.is_empty() {
        return vec!["No collections found".to_string()];
    }
    let mut lines = Vec::new();
    for (i, c) in collections.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), c.title));
        lines.push(format!("{}Slug: {} → {}", indent(1), c.slug, c.href));
        lines.push(format!("{}{}", indent(1), truncate_desc(&c.description, 60)));
    }
    lines
}

pub fn print_collections(collections: &[CollectionSummary]) {
    for line in format_collections(collections) {
        println!("{}", line);
    }
}

/// Format one collection's images under its title.
pub fn format_catalog_folder(title: &str, records: &[ImageRecord]) -> Vec<String> {
    let mut lines = vec![format!("{} ({} images)", title, records.len())];
    for (i, r) in records.iter().enumerate() {
        lines.extend(image_lines(1, i + 1, &r.name, &r.src));
    }
    lines
}

pub fn print_catalog_folder(title: &str, records: &[ImageRecord]) {
    for line in format_catalog_folder(title, records) {
        println!("{}", line);
    }
}

/// Format a reserved section: one numbered header per group.
pub fn format_grouped_section(
    section: &str,
    groups: &BTreeMap<String, Vec<ImageRecord>>,
) -> Vec<String> {
    let mut lines = vec![section.to_string()];
    for (gi, (group, records)) in groups.iter().enumerate() {
        lines.push(format!(
            "{} {} ({} images)",
            format_index(gi + 1),
            group,
            records.len()
        ));
        for (i, r) in records.iter().enumerate() {
            lines.extend(image_lines(1, i + 1, &r.name, &r.src));
        }
    }
    lines
}

pub fn print_grouped_section(section: &str, groups: &BTreeMap<String, Vec<ImageRecord>>) {
    for line in format_grouped_section(section, groups) {
        println!("{}", line);
    }
}

/// Format a gallery listing with its folder tags.
///
/// ```text
/// Gallery (3 images, 2 folders)
///     001 booth [events]
///         Source: /gallery/events/booth.webp
/// ```
pub fn format_gallery(entries: &[ImageEntry], folders: &[String]) -> Vec<String> {
    let mut lines = vec![format!(
        "Gallery ({} images, {} folders)",
        entries.len(),
        folders.len()
    )];
    for (i, e) in entries.iter().enumerate() {
        let label = format!("{} [{}]", e.display_name, e.folder);
        lines.extend(image_lines(1, i + 1, &label, &e.served_path));
    }
    lines
}

pub fn print_gallery(entries: &[ImageEntry], folders: &[String]) {
    for line in format_gallery(entries, folders) {
        println!("{}", line);
    }
}

// ============================================================================
// Quote
// ============================================================================

pub fn format_quote(quote: &Quote) -> Vec<String> {
    let mut lines = vec![format!(
        "{} #{} ({})",
        quote.design, quote.size, quote.dimensions
    )];
    if quote.size_substituted {
        lines.push(format!(
            "{}Note: requested size not offered; using #{}",
            indent(1),
            quote.size
        ));
    }
    lines.push(format!(
        "{}Cases: {} ({} bags)",
        indent(1),
        quote.cases,
        group_thousands(quote.units)
    ));
    lines.push(format!(
        "{}Price per case: {}",
        indent(1),
        Dollars(quote.case_price_cents)
    ));
    lines.push(format!("{}Subtotal: {}", indent(1), Dollars(quote.subtotal_cents)));
    if quote.setup_fee_cents > 0 {
        lines.push(format!(
            "{}Setup fee: {}",
            indent(1),
            Dollars(quote.setup_fee_cents)
        ));
    }
    lines.push(format!("{}Total: {}", indent(1), Dollars(quote.total_cents)));
    lines
}

pub fn print_quote(quote: &Quote) {
    for line in format_quote(quote) {
        println!("{}", line);
    }
}

// ============================================================================
// Config check
// ============================================================================

/// Summarize a resolved config for `bagco check`. Secrets are never shown.
pub fn format_check(config: &SiteConfig, collection_count: usize) -> Vec<String> {
    let on_off = |b: bool| if b { "configured" } else { "not configured" };
    vec![
        "Config OK".to_string(),
        format!("{}Public dir: {}", indent(1), config.public_dir.display()),
        format!("{}Collections: {}", indent(1), collection_count),
        format!("{}Submissions: {}", indent(1), config.submissions_file.display()),
        format!("{}Bind: {}", indent(1), config.server.bind),
        format!(
            "{}Webhook: {}",
            indent(1),
            on_off(!config.webhook.url.trim().is_empty())
        ),
        format!(
            "{}Employee password: {}",
            indent(1),
            on_off(config.employee.password.is_some())
        ),
    ]
}

pub fn print_check(config: &SiteConfig, collection_count: usize) {
    for line in format_check(config, collection_count) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{QuoteRequest, quote};

    fn record(src: &str, name: &str) -> ImageRecord {
        ImageRecord {
            src: src.to_string(),
            name: name.to_string(),
            kind: None,
            design: None,
            folder: None,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        assert_eq!(truncate_desc(&text, 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("ééééé", 2), "éé...");
    }

    // =========================================================================
    // Listing tests
    // =========================================================================

    #[test]
    fn catalog_folder_lines() {
        let lines = format_catalog_folder(
            "Bakery Bags",
            &[record("/catalog/bakery/croissant.webp", "croissant")],
        );
        assert_eq!(
            lines,
            vec![
                "Bakery Bags (1 images)",
                "    001 croissant",
                "        Source: /catalog/bakery/croissant.webp",
            ]
        );
    }

    #[test]
    fn grouped_section_lists_empty_groups() {
        let mut groups = BTreeMap::new();
        groups.insert("gs".to_string(), vec![record("/catalog/pharmacy/gs/a.jpg", "a")]);
        groups.insert("ty".to_string(), vec![]);
        let lines = format_grouped_section("pharmacy", &groups);
        assert_eq!(lines[0], "pharmacy");
        assert_eq!(lines[1], "001 gs (1 images)");
        assert_eq!(lines[4], "002 ty (0 images)");
    }

    #[test]
    fn empty_collection_index() {
        assert_eq!(format_collections(&[]), vec!["No collections found"]);
    }

    #[test]
    fn collection_index_lines() {
        let lines = format_collections(&[CollectionSummary {
            slug: "winery".into(),
            title: "Winery Bags".into(),
            description: "Winery bags.".into(),
            href: "/catalog/winery".into(),
        }]);
        assert_eq!(lines[0], "001 Winery Bags");
        assert_eq!(lines[1], "    Slug: winery → /catalog/winery");
    }

    #[test]
    fn gallery_shows_folder_tags() {
        let entries = vec![ImageEntry {
            logical_key: "events/booth".into(),
            served_path: "/gallery/events/booth.webp".into(),
            display_name: "booth".into(),
            source_extension: ".webp".into(),
            folder: "events".into(),
        }];
        let lines = format_gallery(&entries, &["events".to_string()]);
        assert_eq!(lines[0], "Gallery (1 images, 1 folders)");
        assert_eq!(lines[1], "    001 booth [events]");
    }

    #[test]
    fn quote_lines_include_fee_for_first_order() {
        let q = quote(&QuoteRequest {
            design: "GS".into(),
            size: "25".into(),
            cases: 4.0,
            reorder: false,
        })
        .unwrap();
        let lines = format_quote(&q);
        assert_eq!(lines[0], "GS #25 (6\" x 4\" x 11\")");
        assert!(lines.contains(&"    Setup fee: $50.00".to_string()));
        assert_eq!(lines.last().unwrap(), "    Total: $313.64");
    }

    #[test]
    fn quote_lines_note_substitution() {
        let q = quote(&QuoteRequest {
            design: "PlasticGS".into(),
            size: "21".into(),
            cases: 4.0,
            reorder: true,
        })
        .unwrap();
        let lines = format_quote(&q);
        assert!(lines[1].contains("using #32"));
        assert!(!lines.iter().any(|l| l.contains("Setup fee")));
    }

    #[test]
    fn check_hides_secrets() {
        let mut config = SiteConfig::default();
        config.employee.password = Some("hunter2".into());
        let lines = format_check(&config, 3);
        assert!(lines.iter().any(|l| l == "    Employee password: configured"));
        assert!(lines.iter().any(|l| l == "    Webhook: not configured"));
        assert!(!lines.iter().any(|l| l.contains("hunter2")));
    }
}
