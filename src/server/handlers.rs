//! Route handlers.

use super::AppState;
use super::responses::{SERVER_ERROR, cached_json, error_json};
use crate::auth::sanitize_next;
use crate::contact::{self, ContactError, Submission};
use crate::manifest::{self, CUSTOM, GroupedSection, ImageRecord, PHARMACY, VETERINARY};
use crate::pages;
use crate::quote::{self, QuoteRequest, find_design};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

const INVALID_PASSWORD: &str = "Invalid password";

/// Run blocking filesystem work off the async workers.
///
/// A panic inside `work` is re-raised on the calling task so the panic
/// layer answers with a 500 instead of a cached empty listing.
async fn blocking<T, F>(work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(value) => value,
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}

pub async fn healthz() -> &'static str {
    "ok"
}

// =============================================================================
// Catalog
// =============================================================================

pub async fn catalog_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let public = state.config.public_dir.clone();
    let index = state
        .caches
        .index
        .get_or_compute_async((), || blocking(move || manifest::collections(&public)))
        .await;
    cached_json(
        &headers,
        &state.config.cache,
        &json!({ "collections": &*index }),
    )
}

async fn grouped(state: AppState, headers: HeaderMap, section: &'static GroupedSection) -> Response {
    let public = state.config.public_dir.clone();
    let groups = state
        .caches
        .sections
        .get_or_compute_async(section.name, || {
            blocking(move || manifest::grouped_section(&public, section))
        })
        .await;
    cached_json(&headers, &state.config.cache, &*groups)
}

pub async fn catalog_custom(State(state): State<AppState>, headers: HeaderMap) -> Response {
    grouped(state, headers, &CUSTOM).await
}

pub async fn catalog_pharmacy(State(state): State<AppState>, headers: HeaderMap) -> Response {
    grouped(state, headers, &PHARMACY).await
}

pub async fn catalog_veterinary(State(state): State<AppState>, headers: HeaderMap) -> Response {
    grouped(state, headers, &VETERINARY).await
}

/// Folder names that must never reach the filesystem.
fn is_blocked_folder(folder: &str) -> bool {
    folder == "api"
        || folder.is_empty()
        || folder.starts_with('.')
        || folder.contains('/')
        || folder.contains('\\')
        || folder.contains("..")
}

pub async fn catalog_folder(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    headers: HeaderMap,
) -> Response {
    if is_blocked_folder(&folder) {
        warn!(folder = %folder, "rejected catalog folder");
        return (StatusCode::NOT_FOUND, Json(json!({ "images": [] }))).into_response();
    }

    let public = state.config.public_dir.clone();
    let name = folder.clone();
    let images = state
        .caches
        .folders
        .get_or_compute_async(folder, || {
            blocking(move || manifest::catalog_folder(&public, &name))
        })
        .await;
    cached_json(&headers, &state.config.cache, &json!({ "images": &*images }))
}

// =============================================================================
// Gallery
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    limit: Option<String>,
}

pub async fn gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
    headers: HeaderMap,
) -> Response {
    let public = state.config.public_dir.clone();
    let roots = state.config.gallery.roots.clone();
    let entries = state
        .caches
        .gallery
        .get_or_compute_async((), || {
            blocking(move || manifest::gallery(&public, &roots, &mut rand::thread_rng()))
        })
        .await;

    let limit = state.config.gallery.effective_limit(params.limit.as_deref());
    let images: Vec<ImageRecord> = entries
        .iter()
        .take(limit)
        .map(ImageRecord::with_folder)
        .collect();
    let folders = manifest::folders(&entries);

    cached_json(
        &headers,
        &state.config.cache,
        &json!({ "images": images, "folders": folders }),
    )
}

// =============================================================================
// Contact
// =============================================================================

/// `POST /api/contact`. The body is parsed as JSON whatever its
/// `Content-Type`.
pub async fn contact(State(state): State<AppState>, body: Bytes) -> Response {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "contact body rejected");
            return error_json(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    let submission = Submission::from_json(&body);
    match contact::process(&submission, &state.store, &state.notifier).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err @ ContactError::MissingFields) => {
            error_json(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(err @ ContactError::Undeliverable) => {
            error!("submission could not be stored or forwarded");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
        Err(err) => {
            error!(error = %err, "contact handler failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
        }
    }
}

// =============================================================================
// Employee login
// =============================================================================

/// `POST /api/employee-login` with `{ password, next? }`.
pub async fn employee_login_api(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    let next = sanitize_next(body.get("next").and_then(Value::as_str));

    match state.auth.login(password) {
        Some(token) => {
            info!(next = %next, "employee login");
            state
                .auth
                .with_session(&token, Json(json!({ "success": true, "next": next })))
        }
        None => {
            warn!("employee login rejected");
            error_json(StatusCode::UNAUTHORIZED, INVALID_PASSWORD)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

/// `GET /employee-login`: the form, or straight on to `next` when the
/// session is already valid.
pub async fn employee_login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Response {
    let next = sanitize_next(query.next.as_deref());
    if state.auth.is_authorized(&headers) {
        return Redirect::to(&next).into_response();
    }
    Html(pages::login_page(&next, None).into_string()).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
    next: Option<String>,
}

/// `POST /employee-login` from the HTML form.
pub async fn employee_login_form(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let next = sanitize_next(form.next.as_deref());

    match state.auth.login(&form.password) {
        Some(token) => {
            info!(next = %next, "employee login");
            state.auth.with_session(&token, Redirect::to(&next))
        }
        None => {
            warn!("employee login rejected");
            (
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(&next, Some(INVALID_PASSWORD)).into_string()),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Quote builder (gated)
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    design: Option<String>,
    size: Option<String>,
    cases: Option<String>,
    reorder: Option<String>,
}

impl QuoteParams {
    /// Fill in defaults: `GS`, the design's first size, 4 cases, first order.
    fn into_request(self) -> QuoteRequest {
        let design = self
            .design
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "GS".to_string());
        let size = self.size.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            find_design(&design)
                .and_then(|d| d.sizes().first().map(|s| s.to_string()))
                .unwrap_or_default()
        });
        let cases = self
            .cases
            .and_then(|c| c.trim().parse::<f64>().ok())
            .unwrap_or(f64::from(quote::MIN_CASES));
        let reorder = matches!(
            self.reorder.as_deref().map(str::trim),
            Some("true" | "1" | "on" | "yes")
        );
        QuoteRequest {
            design,
            size,
            cases,
            reorder,
        }
    }
}

pub async fn quote_builder(Query(params): Query<QuoteParams>) -> Html<String> {
    let request = params.into_request();
    let result = quote::quote(&request);
    Html(pages::quote_builder_page(&request, &result).into_string())
}

pub async fn quote_estimate(Query(params): Query<QuoteParams>) -> Response {
    let request = params.into_request();
    match quote::quote(&request) {
        Ok(estimate) => Json(estimate).into_response(),
        Err(err) => error_json(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

pub async fn not_found() -> Response {
    error_json(StatusCode::NOT_FOUND, "Not found")
}
