//! AI clothing recommendations
//!
//! The desktop side ([`RecommendationClient`]) talks to a small companion
//! service ([`server`]) that holds the model credentials.

pub mod client;
pub mod prompts;
pub mod server;

pub use client::RecommendationClient;
pub use prompts::clothing_prompt;
pub use server::{GeminiModel, TextModel};

use serde::{Deserialize, Serialize};

/// Wire format shared by client and server
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GenerateResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
