use axum::body::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::CompletionRequest;
use crate::config::OpenRouterConfig;
use crate::upstream::{send_json, UpstreamError};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Missing OpenRouter API key")]
    MissingKey,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Client for the OpenRouter chat completion endpoint.
pub struct OpenRouterClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig, http: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            http,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(
        &self,
        messages: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<Bytes, ChatError> {
        let key = self.api_key.as_deref().ok_or(ChatError::MissingKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let payload = CompletionRequest {
            model: &self.model,
            messages,
        };
        debug!(model = %self.model, messages = %messages, "Sending chat completion");

        let request = self.http.post(url).bearer_auth(key).json(&payload);
        Ok(send_json(request, cancel).await?)
    }
}
