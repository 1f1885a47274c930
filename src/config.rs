//! Service configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! 1. Stock defaults ([`SiteConfig::default`])
//! 2. `bagco.toml` (sparse: only the keys you want to change)
//! 3. Environment variables for deployment-specific values and secrets
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! public_dir = "public"                                # Image trees (catalog/, gallery/)
//! submissions_file = "data/contact-submissions.ndjson" # Append-only lead log
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! log_json = false
//!
//! [cache]
//! catalog_ttl_secs = 300              # Catalog listings rescanned at most this often
//! gallery_ttl_secs = 600              # Gallery reshuffled at most this often
//! max_age_secs = 300                  # Cache-Control for browsers
//! s_maxage_secs = 300                 # Cache-Control for shared caches
//! stale_while_revalidate_secs = 600
//!
//! [gallery]
//! roots = ["gallery", "catalog"]      # Directories under public_dir to mix in
//! default_limit = 96
//! max_limit = 200
//!
//! [webhook]
//! url = ""                            # Empty = submissions are only stored
//! timeout_secs = 10
//!
//! [employee]
//! # password = "..."                  # Unset = employee login disabled
//! secure_cookie = false
//! ```
//!
//! ## Environment
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `BAGCO_WEBHOOK_URL` | `webhook.url` |
//! | `BAGCO_EMPLOYEE_PASSWORD` | `employee.password` |
//! | `BAGCO_BIND` | `server.bind` |
//! | `BAGCO_PUBLIC_DIR` | `public_dir` |
//!
//! Unknown keys in the file are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "bagco.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `bagco.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root of the served image trees (`catalog/`, `gallery/`).
    pub public_dir: PathBuf,
    /// Append-only NDJSON log of contact and sample requests.
    pub submissions_file: PathBuf,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub gallery: GalleryConfig,
    pub webhook: WebhookConfig,
    pub employee: EmployeeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            submissions_file: PathBuf::from("data/contact-submissions.ndjson"),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            gallery: GalleryConfig::default(),
            webhook: WebhookConfig::default(),
            employee: EmployeeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.catalog_ttl_secs == 0 || self.cache.gallery_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache TTLs must be greater than zero".into(),
            ));
        }
        if self.cache.catalog_ttl_secs > MAX_TTL_SECS || self.cache.gallery_ttl_secs > MAX_TTL_SECS
        {
            return Err(ConfigError::Validation(format!(
                "cache TTLs must not exceed {MAX_TTL_SECS} seconds"
            )));
        }
        if self.gallery.default_limit == 0 {
            return Err(ConfigError::Validation(
                "gallery.default_limit must be at least 1".into(),
            ));
        }
        if self.gallery.default_limit > self.gallery.max_limit {
            return Err(ConfigError::Validation(
                "gallery.default_limit must not exceed gallery.max_limit".into(),
            ));
        }
        if self.gallery.roots.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.roots must not be empty".into(),
            ));
        }
        if self.webhook.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "webhook.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Validation("server.bind must be set".into()));
        }
        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production and a map lookup in tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("BAGCO_WEBHOOK_URL") {
            self.webhook.url = url;
        }
        if let Some(password) = non_empty("BAGCO_EMPLOYEE_PASSWORD") {
            self.employee.password = Some(password);
        }
        if let Some(bind) = non_empty("BAGCO_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = non_empty("BAGCO_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(dir);
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            log_json: false,
        }
    }
}

/// Longest accepted listing cache lifetime (one day).
pub const MAX_TTL_SECS: u64 = 24 * 60 * 60;

/// Manifest cache lifetimes and the HTTP caching headers sent with listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub catalog_ttl_secs: u64,
    pub gallery_ttl_secs: u64,
    pub max_age_secs: u64,
    pub s_maxage_secs: u64,
    pub stale_while_revalidate_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            catalog_ttl_secs: 300,
            gallery_ttl_secs: 600,
            max_age_secs: 300,
            s_maxage_secs: 300,
            stale_while_revalidate_secs: 600,
        }
    }
}

impl CacheConfig {
    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn gallery_ttl(&self) -> Duration {
        Duration::from_secs(self.gallery_ttl_secs)
    }

    /// `Cache-Control` value for listing responses.
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, s-maxage={}, stale-while-revalidate={}",
            self.max_age_secs, self.s_maxage_secs, self.stale_while_revalidate_secs
        )
    }
}

/// Whole-site gallery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Directories under `public_dir` whose images are mixed into the gallery.
    pub roots: Vec<String>,
    /// Images returned when the request carries no usable `limit`.
    pub default_limit: usize,
    /// Upper bound for `limit`.
    pub max_limit: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            roots: vec!["gallery".to_string(), "catalog".to_string()],
            default_limit: 96,
            max_limit: 200,
        }
    }
}

impl GalleryConfig {
    /// Resolve a raw `limit` query value: unparsable → default, else clamped
    /// to `1..=max_limit`.
    pub fn effective_limit(&self, raw: Option<&str>) -> usize {
        raw.and_then(|v| v.trim().parse::<usize>().ok())
            .map(|n| n.clamp(1, self.max_limit))
            .unwrap_or(self.default_limit)
    }
}

/// Lead notification webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// Chat webhook URL. Empty disables forwarding.
    pub url: String,
    /// Hard timeout for one delivery attempt.
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 10,
        }
    }
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Employee login for the quote builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmployeeConfig {
    /// Shared panel password. When unset every login attempt is rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Mark the session cookie `Secure` (serve over HTTPS).
    pub secure_cookie: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    Ok(config)
}

/// Load the config file at `path` over stock defaults, apply environment
/// overrides and validate the result.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    config.apply_env(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `bagco.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Bagco site configuration
# ========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding the served image trees (catalog/, gallery/).
public_dir = "public"

# Append-only log of contact and sample requests (one JSON object per line).
submissions_file = "data/contact-submissions.ndjson"

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Env: BAGCO_BIND
bind = "127.0.0.1:3000"
# Emit JSON log lines (for log shippers) instead of plain text.
log_json = false

# ---------------------------------------------------------------------------
# Listing cache
# ---------------------------------------------------------------------------
[cache]
# How long a scanned catalog listing is reused before rescanning (1..=86400).
catalog_ttl_secs = 300
# How long the shuffled gallery keeps its order.
gallery_ttl_secs = 600
# Cache-Control sent with listing responses.
max_age_secs = 300
s_maxage_secs = 300
stale_while_revalidate_secs = 600

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Directories under public_dir mixed into the gallery.
roots = ["gallery", "catalog"]
# Images returned without a ?limit= parameter.
default_limit = 96
# Largest ?limit= honoured.
max_limit = 200

# ---------------------------------------------------------------------------
# Lead notifications
# ---------------------------------------------------------------------------
[webhook]
# Chat webhook receiving new submissions. Empty = store only.
# Env: BAGCO_WEBHOOK_URL
url = ""
timeout_secs = 10

# ---------------------------------------------------------------------------
# Employee quote builder
# ---------------------------------------------------------------------------
[employee]
# Shared password for /employee-login. Leave unset to disable the login.
# Env: BAGCO_EMPLOYEE_PASSWORD
# password = ""
# Set when serving over HTTPS.
secure_cookie = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.cache.catalog_ttl(), Duration::from_secs(300));
        assert_eq!(config.gallery.max_limit, 200);
        assert_eq!(config.webhook.timeout(), Duration::from_secs(10));
        assert_eq!(config.employee.password, None);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[gallery]
max_limit = 50
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gallery.max_limit, 50);
        // Defaults preserved
        assert_eq!(config.gallery.default_limit, 96);
        assert_eq!(config.cache.gallery_ttl_secs, 600);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[cache]\nttl = 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn cache_control_header_value() {
        assert_eq!(
            CacheConfig::default().cache_control(),
            "public, max-age=300, s-maxage=300, stale-while-revalidate=600"
        );
    }

    // =========================================================================
    // Gallery limit
    // =========================================================================

    #[test]
    fn limit_missing_uses_default() {
        assert_eq!(GalleryConfig::default().effective_limit(None), 96);
    }

    #[test]
    fn limit_unparsable_uses_default() {
        let g = GalleryConfig::default();
        assert_eq!(g.effective_limit(Some("lots")), 96);
        assert_eq!(g.effective_limit(Some("-3")), 96);
    }

    #[test]
    fn limit_is_clamped() {
        let g = GalleryConfig::default();
        assert_eq!(g.effective_limit(Some("5")), 5);
        assert_eq!(g.effective_limit(Some("0")), 1);
        assert_eq!(g.effective_limit(Some("100000")), 200);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn zero_ttl_rejected() {
        let mut config = SiteConfig::default();
        config.cache.gallery_ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn oversized_ttl_rejected() {
        let mut config = SiteConfig::default();
        config.cache.catalog_ttl_secs = MAX_TTL_SECS;
        assert!(config.validate().is_ok());

        config.cache.catalog_ttl_secs = u64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SiteConfig::default();
        config.cache.gallery_ttl_secs = MAX_TTL_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_limit_above_max_rejected() {
        let mut config = SiteConfig::default();
        config.gallery.default_limit = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_roots_rejected() {
        let mut config = SiteConfig::default();
        config.gallery.roots.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_webhook_timeout_rejected() {
        let mut config = SiteConfig::default();
        config.webhook.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_overlay_wins_and_base_survives() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn merge_replaces_arrays_wholesale() {
        let base: toml::Value = toml::from_str("roots = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("roots = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["roots"].as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // load_config
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_with_env(&tmp.path().join(CONFIG_FILENAME), no_env).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
public_dir = "/srv/bagco/public"

[employee]
password = "from-file"
"#,
        )
        .unwrap();

        let config = load_config_with_env(&path, no_env).unwrap();
        assert_eq!(config.public_dir, PathBuf::from("/srv/bagco/public"));
        assert_eq!(config.employee.password.as_deref(), Some("from-file"));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[gallery]\ndefault_limit = 0\n").unwrap();
        assert!(matches!(
            load_config_with_env(&path, no_env),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "public_dir = ").unwrap();
        assert!(matches!(
            load_config_with_env(&path, no_env),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn env_overrides_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[webhook]\nurl = \"https://file.example/hook\"\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("BAGCO_WEBHOOK_URL", "https://env.example/hook"),
            ("BAGCO_EMPLOYEE_PASSWORD", "s3cret"),
            ("BAGCO_BIND", "0.0.0.0:8080"),
        ]
        .into_iter()
        .collect();
        let config =
            load_config_with_env(&path, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.webhook.url, "https://env.example/hook");
        assert_eq!(config.employee.password.as_deref(), Some("s3cret"));
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = SiteConfig::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
