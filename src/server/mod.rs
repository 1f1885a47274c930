//! HTTP service.
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/healthz` | liveness probe |
//! | GET | `/api/catalog` | collection index |
//! | GET | `/api/catalog/custom` | 1/2/3-color groups |
//! | GET | `/api/catalog/pharmacy` | `ty`, `gs`, `plastic-gs` groups |
//! | GET | `/api/catalog/veterinary` | `vb1`, `vb2`, `vb6` groups |
//! | GET | `/api/catalog/:folder` | one collection |
//! | GET | `/api/gallery?limit=N` | shuffled site-wide gallery |
//! | POST | `/api/contact` | contact and sample requests |
//! | POST | `/api/employee-login` | JSON login |
//! | GET, POST | `/employee-login` | HTML login |
//! | GET | `/quote-builder[/estimate]` | employee-only quote tools |
//! | GET | `/catalog/**`, `/gallery/**` | image files |
//!
//! Listing endpoints share one [`ManifestCaches`] per process; see
//! [`crate::cache`] for the expiry rules.

mod handlers;
mod responses;

use crate::auth::{EmployeeAuth, require_employee};
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::SiteConfig;
use crate::contact::{SubmissionStore, WebhookNotifier};
use crate::manifest::{CollectionSummary, ImageEntry, ImageRecord};
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Every listing the service caches, one slot per logical endpoint.
pub struct ManifestCaches {
    pub index: TtlCache<(), Vec<CollectionSummary>>,
    pub sections: TtlCache<&'static str, BTreeMap<String, Vec<ImageRecord>>>,
    pub folders: TtlCache<String, Vec<ImageRecord>>,
    pub gallery: TtlCache<(), Vec<ImageEntry>>,
}

impl ManifestCaches {
    pub fn new(config: &SiteConfig, clock: Arc<dyn Clock>) -> Self {
        let catalog_ttl = config.cache.catalog_ttl();
        Self {
            index: TtlCache::new(catalog_ttl, clock.clone()),
            sections: TtlCache::new(catalog_ttl, clock.clone()),
            folders: TtlCache::new(catalog_ttl, clock.clone()),
            gallery: TtlCache::new(config.cache.gallery_ttl(), clock),
        }
    }
}

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub caches: Arc<ManifestCaches>,
    pub store: Arc<SubmissionStore>,
    pub notifier: Arc<WebhookNotifier>,
    pub auth: Arc<EmployeeAuth>,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Result<Self, ServeError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build state with an explicit clock for the listing caches.
    pub fn with_clock(config: SiteConfig, clock: Arc<dyn Clock>) -> Result<Self, ServeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bagco-site/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            caches: Arc::new(ManifestCaches::new(&config, clock)),
            store: Arc::new(SubmissionStore::new(config.submissions_file.clone())),
            notifier: Arc::new(WebhookNotifier::new(client, &config.webhook)),
            auth: Arc::new(EmployeeAuth::new(&config.employee)),
            config: Arc::new(config),
        })
    }
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    let public = state.config.public_dir.clone();

    let employee_only = Router::new()
        .route("/quote-builder", get(handlers::quote_builder))
        .route("/quote-builder/estimate", get(handlers::quote_estimate))
        .route("/quote-builder/*rest", get(handlers::not_found))
        .route_layer(from_fn_with_state(state.auth.clone(), require_employee));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/catalog", get(handlers::catalog_index))
        .route("/api/catalog/custom", get(handlers::catalog_custom))
        .route("/api/catalog/pharmacy", get(handlers::catalog_pharmacy))
        .route("/api/catalog/veterinary", get(handlers::catalog_veterinary))
        .route("/api/catalog/:folder", get(handlers::catalog_folder))
        .route("/api/gallery", get(handlers::gallery))
        .route("/api/contact", post(handlers::contact))
        .route(
            "/api/employee-login",
            post(handlers::employee_login_api),
        )
        .route(
            "/employee-login",
            get(handlers::employee_login_page).post(handlers::employee_login_form),
        )
        .merge(employee_only)
        .nest_service("/catalog", ServeDir::new(public.join("catalog")))
        .nest_service("/gallery", ServeDir::new(public.join("gallery")))
        .with_state(state)
        .layer(CatchPanicLayer::custom(responses::panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Bind `config.server.bind` and serve until SIGINT/SIGTERM.
pub async fn serve(config: SiteConfig) -> Result<(), ServeError> {
    let addr = config.server.bind.clone();
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(
        addr = %listener.local_addr()?,
        public_dir = %state.config.public_dir.display(),
        webhook = state.notifier.is_configured(),
        employee_login = state.auth.is_enabled(),
        "bagco-site listening"
    );

    spawn_cache_janitor(state.caches.clone());

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Periodically drop expired per-folder listings so arbitrary folder names
/// cannot grow the cache without bound.
fn spawn_cache_janitor(caches: Arc<ManifestCaches>) {
    let period = caches.folders.ttl();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = caches.folders.purge_expired();
            if purged > 0 {
                debug!(purged, "expired folder listings dropped");
            }
        }
    });
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
