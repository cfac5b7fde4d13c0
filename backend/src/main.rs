use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, response::Response, routing::post,
    Json, Router,
};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

const MAX_CODE_LEN: usize = 10_000;
const SLOW_RESPONSE_SECS: f64 = 5.0;

#[derive(Clone)]
struct AppState {
    llm: LlmClient,
}

#[derive(Clone)]
struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
}

#[derive(Debug, thiserror::Error)]
enum ReviewFailure {
    #[error("AI analysis failed")]
    Upstream(#[source] anyhow::Error),
    #[error("Failed to parse AI response")]
    Malformed(#[source] anyhow::Error),
}

impl LlmClient {
    fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("CRITIQ_LLM_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                std::env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .context("OPENAI_API_KEY is required to enable the LLM")?;

        let api_base = std::env::var("CRITIQ_LLM_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model =
            std::env::var("CRITIQ_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Self::new(api_base, api_key, model)
    }

    fn new(api_base: String, api_key: String, model: String) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("invalid API key")?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base,
            model,
        })
    }

    async fn review(&self, code: &str, language: &str) -> Result<ReviewResult, ReviewFailure> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let system = "You are a code review assistant. Always respond with valid JSON only.";
        let user = format!(
            r#"Analyze the following {language} code and provide a code review.
Return a JSON response with the following structure:
{{
    "issues": [
        {{
            "line": <line_number>,
            "severity": "<error|warning|info>",
            "message": "<description>",
            "suggestion": "<suggested_fix>"
        }}
    ],
    "summary": "<overall_summary>",
    "score": <0-100>
}}

Code to review:
```
{code}
```

Only return the JSON, no other text."#
        );

        let body = ChatCompletionsRequest {
            model: self.model.clone(),
            temperature: Some(0.3),
            max_tokens: Some(2000),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            response_format: Some(ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let res = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")
            .map_err(ReviewFailure::Upstream)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ReviewFailure::Upstream(anyhow::anyhow!(
                "LLM error {}: {}",
                status,
                text
            )));
        }

        let payload: ChatCompletionsResponse = res
            .json()
            .await
            .context("invalid LLM JSON")
            .map_err(ReviewFailure::Upstream)?;

        let content = payload
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        serde_json::from_str(strip_code_fences(&content))
            .context("LLM returned non-JSON output")
            .map_err(ReviewFailure::Malformed)
    }
}

/// Models tend to wrap the requested JSON in a markdown code block; unwrap it
/// before parsing.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
    Warning,
    Info,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Issue {
    line: i64,
    #[serde(default)]
    severity: Severity,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct ReviewResult {
    #[serde(default)]
    issues: Vec<Issue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    #[serde(default)]
    code: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "python".to_string()
}

#[derive(Debug, Serialize)]
struct ReviewEnvelope {
    review: ReviewResult,
    response_time: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let llm = match LlmClient::from_env() {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!(
                "Set OPENAI_API_KEY (or CRITIQ_LLM_API_KEY override) to run the server."
            );
            std::process::exit(1);
        }
    };

    let state = AppState { llm };

    let app = Router::new()
        .route("/api/review/", post(api_review))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app).await.expect("server error");
}

async fn api_review(State(state): State<AppState>, Json(req): Json<ReviewRequest>) -> Response {
    let started = Instant::now();

    if let Some(error) = validate_request(&req) {
        tracing::warn!(code_len = req.code.len(), "rejecting review request");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response();
    }

    match state.llm.review(&req.code, &req.language).await {
        Ok(review) => {
            let response_time = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
            if response_time > SLOW_RESPONSE_SECS {
                tracing::warn!(response_time, "slow code review response");
            }
            (
                StatusCode::OK,
                Json(ReviewEnvelope {
                    review,
                    response_time,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "code review failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn validate_request(req: &ReviewRequest) -> Option<&'static str> {
    if req.code.trim().is_empty() {
        Some("Code is required")
    } else if req.code.len() > MAX_CODE_LEN {
        Some("Code is too long. Maximum 10000 characters allowed")
    } else {
        None
    }
}
