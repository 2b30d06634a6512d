use axum::{body::HttpBody, extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// One structured event per request; 5xx responses go out at warn.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let length = response_length(&response);

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            length,
            elapsed_ms,
            "Relay request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            length,
            elapsed_ms,
            "HTTP request"
        );
    }

    response
}

/// Body size when it is known up front. Hyper only adds `Content-Length`
/// after the middleware stack, so the header is the fallback.
fn response_length(response: &Response) -> u64 {
    response
        .body()
        .size_hint()
        .exact()
        .or_else(|| {
            response
                .headers()
                .get(axum::http::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        })
        .unwrap_or(0)
}
