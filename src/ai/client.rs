use super::{ErrorBody, GenerateRequest, GenerateResponse};
use super::prompts::clothing_prompt;
use crate::config::AiConfig;
use crate::models::CurrentConditions;
use crate::settings::Locale;
use crate::{NeboKrugError, Result};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Client for the companion `/generate` service
pub struct RecommendationClient {
    client: Client,
    base_url: String,
}

impl RecommendationClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("NeboKrug/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NeboKrugError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a prompt and return the generated text
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/generate", self.base_url);
        let start_time = Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| NeboKrugError::api(format!("AI service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!("AI service answered {}: {}", status, message);
            return Err(NeboKrugError::service(status.as_u16(), message));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| NeboKrugError::api(format!("Invalid AI service response: {e}")))?;

        info!(
            "Received recommendation in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
        debug!("Recommendation length: {} chars", body.response.len());
        Ok(body.response)
    }

    /// Clothing advice for the given conditions
    pub async fn recommend_clothing(
        &self,
        locale: Locale,
        conditions: &CurrentConditions,
    ) -> Result<String> {
        self.generate(&clothing_prompt(locale, conditions)).await
    }
}
