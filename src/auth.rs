//! Employee session gate for the quote builder.
//!
//! There are no user accounts: one shared password unlocks the internal
//! pages. A successful login sets [`COOKIE_NAME`] to a token derived from
//! that password, and [`require_employee`] admits any request carrying the
//! current token. Rotating the password invalidates every outstanding
//! session.
//!
//! When no password is configured the gate stays shut: every login attempt
//! is rejected and every gated request is redirected to the login page.

use crate::config::EmployeeConfig;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

pub const COOKIE_NAME: &str = "bagco_employee_auth";

/// Session lifetime in seconds (12 hours).
pub const SESSION_MAX_AGE_SECS: u64 = 12 * 60 * 60;

/// Landing page after login when no usable `next` is given.
pub const DEFAULT_NEXT: &str = "/quote-builder";

pub const LOGIN_PATH: &str = "/employee-login";

const TOKEN_LABEL: &str = "bagco-employee-session:v1:";

/// Hex SHA-256 session token for `password`.
pub fn session_token(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(TOKEN_LABEL.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Keep `next` only if it is a same-site absolute path.
///
/// Browsers read `//host` and `/\host` as protocol-relative and drop
/// control characters before resolving, so those forms are rejected along
/// with anything not starting with `/`.
pub fn sanitize_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => DEFAULT_NEXT.to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    let mut chars = path.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !path.chars().any(|c| c.is_ascii_control())
}

/// Login URL that returns to `path` afterwards.
pub fn login_redirect_target(path: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(path))
}

/// Value of cookie `name` in the request headers, if present.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Password check and cookie issuance for the employee pages.
#[derive(Debug, Clone)]
pub struct EmployeeAuth {
    password: Option<String>,
    token: Option<String>,
    secure_cookie: bool,
}

impl EmployeeAuth {
    pub fn new(config: &EmployeeConfig) -> Self {
        let password = config
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(String::from);
        if password.is_none() {
            warn!("no employee password configured; employee login is disabled");
        }
        Self {
            token: password.as_deref().map(session_token),
            password,
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    /// The session token to issue if `attempt` is the configured password.
    pub fn login(&self, attempt: &str) -> Option<String> {
        match &self.password {
            Some(expected) if expected == attempt => self.token.clone(),
            _ => None,
        }
    }

    /// Whether the request carries the current session cookie.
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        match (&self.token, cookie_value(headers, COOKIE_NAME)) {
            (Some(expected), Some(presented)) => expected == presented,
            _ => false,
        }
    }

    /// `Set-Cookie` header value carrying `token`.
    pub fn set_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_MAX_AGE_SECS}"
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Attach the session cookie to `response`.
    pub fn with_session(&self, token: &str, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        match HeaderValue::from_str(&self.set_cookie(token)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(err) => warn!(error = %err, "session cookie is not a valid header value"),
        }
        response
    }
}

/// Middleware: pass authorized requests through, send everyone else to the
/// login page with the original path as `next`.
pub async fn require_employee(
    State(auth): State<Arc<EmployeeAuth>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if auth.is_authorized(request.headers()) {
        return next.run(request).await;
    }
    let path = request.uri().path().to_string();
    debug!(path = %path, "unauthenticated employee request");
    Redirect::to(&login_redirect_target(&path)).into_response()
}
