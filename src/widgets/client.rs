use async_trait::async_trait;
use tracing::debug;

use super::chat::{ChatRelay, ChatRequest, RelayOutcome};
use super::detail::DetailRelay;
use super::lists::{ListKind, ListRelay};
use crate::movie::MovieAggregate;

/// Talks to a running relay server over HTTP.
#[derive(Clone)]
pub struct HttpRelay {
    base_url: String,
    http: reqwest::Client,
}

impl HttpRelay {
    pub fn new(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatRelay for HttpRelay {
    async fn post_chat(&self, request: &ChatRequest) -> RelayOutcome {
        debug!(messages = request.messages.len(), "Posting to chat relay");

        let response = match self.http.post(self.url("/api/chat")).json(request).send().await {
            Ok(response) => response,
            Err(e) => return RelayOutcome::Failed(e.to_string()),
        };
        let status = response.status();
        let body = match response.json::<serde_json::Value>().await {
            Ok(body) => body,
            Err(e) => return RelayOutcome::Failed(e.to_string()),
        };

        if status.is_success() {
            RelayOutcome::Completed(body)
        } else {
            RelayOutcome::Rejected {
                status: status.as_u16(),
                body,
            }
        }
    }
}

#[async_trait]
impl ListRelay for HttpRelay {
    async fn get_list(&self, kind: ListKind) -> Result<serde_json::Value, String> {
        self.http
            .get(self.url(kind.path()))
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl DetailRelay for HttpRelay {
    async fn get_movie(&self, id: &str) -> Result<MovieAggregate, String> {
        let path = format!("/api/movie/{}", urlencoding::encode(id));
        let response = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("relay returned {}: {}", status.as_u16(), body));
        }
        response.json().await.map_err(|e| e.to_string())
    }
}
