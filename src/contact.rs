//! Contact and sample-request submissions.
//!
//! A submission arrives as loosely-typed JSON from the public forms. It is
//! normalized into a [`Submission`], validated, and then handed to two
//! independent sinks:
//!
//! - [`SubmissionStore`] appends it as one JSON line to a local NDJSON file.
//! - [`WebhookNotifier`] posts a formatted message to a chat webhook.
//!
//! Either sink may fail without affecting the other. The request only fails
//! when neither sink accepted the lead; see [`process`].

use crate::config::WebhookConfig;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

const DEFAULT_SUBMISSION_TYPE: &str = "Contact Form";
const NOT_PROVIDED: &str = "N/A";

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Unable to process submission right now")]
    Undeliverable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),
    #[error("webhook responded with {status}: {body}")]
    WebhookStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A normalized form submission. Serialized with the form's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_type: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub bag_type: String,
    pub quantity: String,
    pub message: String,
}

impl Submission {
    /// Normalize a raw request body.
    ///
    /// Strings are trimmed. Missing, non-string and blank fields take their
    /// default: `Contact Form` for the type, `N/A` for the optional fields,
    /// empty for the required ones.
    pub fn from_json(body: &Value) -> Self {
        let field = |key: &str, fallback: &str| normalize(body.get(key), fallback);
        Self {
            submission_type: field("submissionType", DEFAULT_SUBMISSION_TYPE),
            name: field("name", ""),
            email: field("email", ""),
            phone: field("phone", NOT_PROVIDED),
            company: field("company", NOT_PROVIDED),
            bag_type: field("bagType", NOT_PROVIDED),
            quantity: field("quantity", NOT_PROVIDED),
            message: field("message", ""),
        }
    }

    /// Name, email and message must be non-empty.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.is_empty() || self.email.is_empty() || self.message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        Ok(())
    }

    /// Markdown body posted to the chat webhook.
    pub fn webhook_message(&self) -> String {
        format!(
            "**New Contact Form Submission**\n\
             **Type:** {}\n\
             **Name:** {}\n\
             **Email:** {}\n\
             **Phone:** {}\n\
             **Company:** {}\n\
             **Bag Type:** {}\n\
             **Quantity:** {}\n\
             **Message:** {}",
            self.submission_type,
            self.name,
            self.email,
            or_not_provided(&self.phone),
            or_not_provided(&self.company),
            or_not_provided(&self.bag_type),
            or_not_provided(&self.quantity),
            self.message,
        )
    }
}

fn normalize(value: Option<&Value>, fallback: &str) -> String {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => fallback.to_string(),
    }
}

fn or_not_provided(value: &str) -> &str {
    if value.is_empty() { NOT_PROVIDED } else { value }
}

/// Line written to the submissions log.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredSubmission<'a> {
    #[serde(flatten)]
    submission: &'a Submission,
    created_at: String,
}

/// Append-only NDJSON log of submissions.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line with a `createdAt` timestamp, creating the parent
    /// directory if needed.
    pub async fn append(&self, submission: &Submission) -> Result<(), ContactError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let record = StoredSubmission {
            submission,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Posts submissions to a chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, config: &WebhookConfig) -> Self {
        Self {
            client,
            url: config.url.trim().to_string(),
            timeout: config.timeout(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// Deliver one message. `false` when unconfigured or on any failure;
    /// failures are logged, never retried.
    pub async fn notify(&self, submission: &Submission) -> bool {
        if !self.is_configured() {
            debug!("webhook not configured, skipping");
            return false;
        }
        match self.deliver(submission).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "webhook delivery failed");
                false
            }
        }
    }

    async fn deliver(&self, submission: &Submission) -> Result<(), ContactError> {
        let payload = serde_json::json!({ "content": submission.webhook_message() });
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContactError::WebhookStatus { status, body });
        }
        Ok(())
    }
}

/// Result of a submission that reached at least one sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContactOutcome {
    pub success: bool,
    pub forwarded: bool,
    pub stored: bool,
}

/// Validate, store and forward a submission.
///
/// Validation failures return before either sink runs. The sinks run
/// independently; the call fails with [`ContactError::Undeliverable`] only
/// if both of them failed.
pub async fn process(
    submission: &Submission,
    store: &SubmissionStore,
    notifier: &WebhookNotifier,
) -> Result<ContactOutcome, ContactError> {
    submission.validate()?;

    let stored = match store.append(submission).await {
        Ok(()) => true,
        Err(err) => {
            error!(path = %store.path().display(), error = %err, "failed to save submission");
            false
        }
    };
    let forwarded = notifier.notify(submission).await;

    if !stored && !forwarded {
        return Err(ContactError::Undeliverable);
    }

    info!(
        kind = %submission.submission_type,
        stored,
        forwarded,
        "submission accepted"
    );
    Ok(ContactOutcome {
        success: true,
        forwarded,
        stored,
    })
}
