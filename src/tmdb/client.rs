use axum::body::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::MoviePart;
use crate::config::TmdbConfig;
use crate::upstream::{send_json, UpstreamError};

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("Missing TMDB API key")]
    MissingKey,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Thin client for the TMDB v3 REST API.
pub struct TmdbClient {
    api_key: Option<String>,
    public_api_key: Option<String>,
    base_url: String,
    image_base_url: String,
    language: String,
    http: reqwest::Client,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, http: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            public_api_key: config.public_api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.clone(),
            language: config.language.clone(),
            http,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Key used for per-movie lookups.
    pub fn detail_key(&self) -> Option<&str> {
        self.public_api_key.as_deref().or(self.api_key.as_deref())
    }

    pub fn image_base_url(&self) -> &str {
        &self.image_base_url
    }

    /// Weekly trending movies, body returned verbatim.
    pub async fn trending(&self, cancel: &CancellationToken) -> Result<Bytes, TmdbError> {
        let key = self.api_key.as_deref().ok_or(TmdbError::MissingKey)?;
        let url = format!("{}/trending/movie/week", self.base_url);
        debug!(url = %url, "TMDB trending");

        let request = self.http.get(url).query(&[("api_key", key)]);
        Ok(send_json(request, cancel).await?)
    }

    /// First page of top rated movies, body returned verbatim.
    pub async fn top_rated(&self, cancel: &CancellationToken) -> Result<Bytes, TmdbError> {
        let key = self.api_key.as_deref().ok_or(TmdbError::MissingKey)?;
        let url = format!("{}/movie/top_rated", self.base_url);
        debug!(url = %url, "TMDB top rated");

        let request = self.http.get(url).query(&[
            ("api_key", key),
            ("language", self.language.as_str()),
            ("page", "1"),
        ]);
        Ok(send_json(request, cancel).await?)
    }

    /// One of the four per-movie resources. The id is not validated, a
    /// malformed id simply comes back as whatever error TMDB returns.
    pub async fn movie_part<T: DeserializeOwned>(
        &self,
        id: &str,
        part: MoviePart,
        cancel: &CancellationToken,
    ) -> Result<T, TmdbError> {
        let key = self.detail_key().ok_or(TmdbError::MissingKey)?;
        let url = format!(
            "{}/movie/{}{}",
            self.base_url,
            urlencoding::encode(id),
            part.suffix()
        );
        debug!(url = %url, part = part.as_str(), "TMDB movie lookup");

        let request = self.http.get(url).query(&[("api_key", key)]);
        let body = send_json(request, cancel).await?;
        let value = serde_json::from_slice(&body).map_err(UpstreamError::Parse)?;
        Ok(value)
    }
}
