use axum::body::Bytes;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::UpstreamConfig;

/// Failure of a single outbound call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned status {status}")]
    Status {
        status: u16,
        body: serde_json::Value,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON in upstream response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("request cancelled")]
    Cancelled,
}

impl UpstreamError {
    /// Status to mirror back to our own caller.
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            _ => 500,
        }
    }
}

pub fn build_http_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    build_http_client_with(config.timeout(), config.connect_timeout())
}

pub fn build_http_client_with(
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(concat!("cinemate/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send one request and return the raw JSON body on success.
///
/// The body is parsed once to make sure it is JSON, but the bytes handed back
/// are exactly what the upstream sent. A non-success status comes back as
/// `UpstreamError::Status` carrying the parsed error body. A body that is not
/// JSON is a parse error regardless of status.
pub async fn send_json(
    request: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<Bytes, UpstreamError> {
    let exchange = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok::<_, reqwest::Error>((status, body))
    };

    let (status, body) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
        res = exchange => res.map_err(|e| {
            error!("Upstream request failed: {}", e);
            UpstreamError::Transport(e)
        })?,
    };

    let parsed: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        error!(status = status.as_u16(), "Upstream sent invalid JSON: {}", e);
        UpstreamError::Parse(e)
    })?;

    if !status.is_success() {
        error!(status = status.as_u16(), body = %parsed, "Upstream returned an error");
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: parsed,
        });
    }

    debug!(status = status.as_u16(), length = body.len(), "Upstream response");
    Ok(body)
}
