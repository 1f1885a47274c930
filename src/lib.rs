//! # Bagco Site
//!
//! Catalog, gallery, quote and lead-capture service for a paper bag
//! manufacturer. The filesystem is the catalog: every image under
//! `public/catalog/<collection>/` is listed, and editing the catalog is a
//! matter of copying files.
//!
//! # Architecture: Scan → Dedup → Serve
//!
//! Every listing endpoint is the same pipeline, memoized per endpoint:
//!
//! ```text
//! 1. Scan    public/catalog/bakery/  →  Vec<ScannedFile>   (walkdir, blocking)
//! 2. Dedup   ScannedFile list        →  Vec<ImageEntry>    (pure)
//! 3. Order   sort by URL / shuffle   →  Vec<ImageRecord>   (pure)
//! 4. Cache   TtlCache<K, V>          →  Arc<V> until expiry
//! ```
//!
//! Steps 2 and 3 never touch the disk, so the rules that matter (which
//! format wins, how ties break, how listings are ordered) are tested with
//! synthetic listings.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Extension ranking, logical keys, display names, collection titles |
//! | [`scan`] | Recursive directory walk and collection discovery |
//! | [`manifest`] | Deduplication, ordering, and the per-section listing builders |
//! | [`cache`] | TTL cache with an injectable clock; response ETags |
//! | [`quote`] | Price tables and the order estimate calculator |
//! | [`contact`] | Form normalization, NDJSON store, chat webhook |
//! | [`auth`] | Employee password login and the session-cookie gate |
//! | [`pages`] | Maud-rendered login and quote builder pages |
//! | [`server`] | Axum router, handlers, caching headers |
//! | [`config`] | `bagco.toml` loading, merging, validation, env overrides |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Best Format Wins
//!
//! Designers drop JPEGs and optimized WebPs side by side. Listings show one
//! file per logical name (`webp > png > jpg > jpeg > gif`); on a tie the
//! first file seen is kept, so the choice never flips between requests.
//!
//! ## Cached Listings, Not a Database
//!
//! Listings are recomputed from disk at most once per TTL window (5 minutes
//! for the catalog, 10 for the gallery). The gallery is shuffled once per
//! window, so paging through it within the window shows a stable order.
//!
//! ## Leads Never Depend on One Sink
//!
//! A submission is appended to a local NDJSON file and posted to a chat
//! webhook. Either may fail; the visitor only sees an error when both did.

pub mod auth;
pub mod cache;
pub mod config;
pub mod contact;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod pages;
pub mod quote;
pub mod scan;
pub mod server;

#[cfg(test)]
pub(crate) mod test_helpers;
