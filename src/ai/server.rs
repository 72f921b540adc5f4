//! Companion HTTP service that forwards prompts to a text model
//!
//! `POST /generate` takes `{"prompt": "..."}` and answers
//! `{"response": "..."}`, or `{"error": "..."}` with 400 for a missing
//! prompt and 500 when the model fails. `GET /` is a liveness check.

use super::{ErrorBody, GenerateRequest, GenerateResponse};
use crate::config::AiConfig;
use crate::{NeboKrugError, Result};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

const MAX_BODY_BYTES: usize = 64 * 1024;
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Anything that turns a prompt into text
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub fn router(model: Arc<dyn TextModel>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/generate", post(generate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(model)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, model: Arc<dyn TextModel>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "AI companion service listening on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, router(model))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("AI companion service stopped");
    Ok(())
}

async fn home() -> &'static str {
    "NeboKrug AI service is running"
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

async fn generate(
    State(model): State<Arc<dyn TextModel>>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let prompt = match payload {
        Ok(Json(request)) => request.prompt,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if prompt.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt text is required");
    }

    match model.generate(&prompt).await {
        Ok(response) => (StatusCode::OK, Json(GenerateResponse { response })).into_response(),
        Err(e) => {
            error!("Model generation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: [GeminiPart<'a>; 1],
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiResponse {
    /// Text of the first candidate, parts concatenated
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Google Generative Language API (`generateContent`)
pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiModel {
    /// The API key comes from `ai.api_key` or the `GOOGLE_API_KEY` environment variable
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                NeboKrugError::config(format!(
                    "No API key for the text model. Set ai.api_key or {API_KEY_ENV}."
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| NeboKrugError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GeminiRequest {
            contents: [GeminiContent {
                parts: [GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NeboKrugError::api(format!("Model request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(NeboKrugError::api(format!("Model returned {status}: {message}")));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| NeboKrugError::api(format!("Invalid model response: {e}")))?;
        parsed
            .into_text()
            .ok_or_else(|| NeboKrugError::api("Model returned no text"))
    }
}
