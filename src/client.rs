use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use crate::review::{Language, ReviewEnvelope, ReviewResult};
use crate::telemetry::FailureSink;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Draws the sequence number for the next submission. Completions carrying a
/// stale number are discarded by the app state, so only the most recently
/// initiated request can update the view.
pub fn next_request_id() -> u64 {
    REQUEST_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Everything that can go wrong between pressing Review and showing a result.
/// The `Display` form is the user-visible message.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Empty or whitespace-only code, caught before any network traffic.
    #[error("Please enter some code to review")]
    EmptyCode,
    #[error("Network error: {0}")]
    Transport(String),
    /// Non-success status; carries the service-provided message when present.
    #[error("{message}")]
    Service { status: u16, message: String },
    /// Success status but a body that does not match the envelope schema.
    #[error("Received an unexpected response from the review service")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: Option<String>,
}

/// Submits `code` for review. Exactly one outbound call per invocation, and
/// exactly one telemetry event on each failed call (none for local validation
/// failures or successes).
pub async fn submit_review(
    base_url: String,
    code: String,
    language: Language,
    request_id: u64,
    telemetry: Arc<dyn FailureSink>,
) -> Result<ReviewResult, ReviewError> {
    if code.trim().is_empty() {
        return Err(ReviewError::EmptyCode);
    }

    let start = Instant::now();
    tracing::debug!(request_id, language = language.wire_name(), code_len = code.len(), "submitting review");

    match call_backend(&base_url, &code, language).await {
        Ok(envelope) => {
            tracing::debug!(
                request_id,
                elapsed = ?start.elapsed(),
                response_time = envelope.response_time,
                issues = envelope.review.issues.len(),
                "review completed"
            );
            Ok(envelope.review)
        }
        Err(err) => {
            tracing::debug!(request_id, elapsed = ?start.elapsed(), error = %err, "review failed");

            let tags = [
                ("language", language.wire_name().to_string()),
                ("code_len", code.len().to_string()),
            ];
            let extra: Vec<(&'static str, String)> = match &err {
                ReviewError::Service { status, .. } => vec![("status", status.to_string())],
                ReviewError::Malformed(detail) => vec![("detail", detail.clone())],
                _ => Vec::new(),
            };
            telemetry.capture(&err, &tags, &extra);

            Err(err)
        }
    }
}

async fn call_backend(
    base_url: &str,
    code: &str,
    language: Language,
) -> Result<ReviewEnvelope, ReviewError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| ReviewError::Transport(e.to_string()))?;

    let url = format!("{}/api/review/", base_url.trim_end_matches('/'));
    let body = serde_json::json!({ "code": code, "language": language });

    let response = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ReviewError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ServiceErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("Review failed (HTTP {})", status.as_u16()));
        return Err(ReviewError::Service {
            status: status.as_u16(),
            message,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| ReviewError::Transport(e.to_string()))?;

    let envelope: ReviewEnvelope =
        serde_json::from_str(&text).map_err(|e| ReviewError::Malformed(e.to_string()))?;

    Ok(envelope)
}
