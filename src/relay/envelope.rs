use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::openrouter::ChatError;
use crate::tmdb::TmdbError;
use crate::upstream::UpstreamError;

/// A JSON body passed through untouched.
#[derive(Debug, Clone)]
pub struct RawJson(pub Bytes);

impl IntoResponse for RawJson {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.0));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// The `{"error": ...}` envelope with its status.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayError {
    pub status: StatusCode,
    pub error: Value,
}

impl RelayError {
    pub fn new(status: u16, error: impl Into<Value>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            error: error.into(),
        }
    }

    pub fn internal(message: &str) -> Self {
        Self::new(500, message)
    }

    /// Upstream rejections are mirrored with their own status and body,
    /// anything else collapses into a 500 carrying `fallback`.
    pub fn from_upstream(err: UpstreamError, fallback: &str) -> Self {
        match err {
            UpstreamError::Status { status, body } => Self::new(status, body),
            _ => Self::internal(fallback),
        }
    }

    pub fn from_tmdb(err: TmdbError, fallback: &str) -> Self {
        match err {
            TmdbError::MissingKey => Self::internal(&TmdbError::MissingKey.to_string()),
            TmdbError::Upstream(e) => Self::from_upstream(e, fallback),
        }
    }

    pub fn from_chat(err: ChatError, fallback: &str) -> Self {
        match err {
            ChatError::MissingKey => Self::internal(&ChatError::MissingKey.to_string()),
            ChatError::Upstream(e) => Self::from_upstream(e, fallback),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error }))).into_response()
    }
}
