use axum::{
    extract::Request,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::openrouter::OpenRouterClient;
use crate::tmdb::TmdbClient;
use crate::upstream::build_http_client;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tmdb: Arc<TmdbClient>,
    pub openrouter: Arc<OpenRouterClient>,
    /// Cancelled on shutdown; every outbound call runs under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Config,
        tmdb: Arc<TmdbClient>,
        openrouter: Arc<OpenRouterClient>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tmdb,
            openrouter,
            shutdown,
        }
    }

    /// Build both provider clients from the configuration.
    pub fn from_config(config: Config, shutdown: CancellationToken) -> Result<Self, reqwest::Error> {
        let http = build_http_client(&config.upstream)?;
        let tmdb = Arc::new(TmdbClient::new(&config.tmdb, http.clone()));
        let openrouter = Arc::new(OpenRouterClient::new(&config.openrouter, http));
        Ok(Self::new(config, tmdb, openrouter, shutdown))
    }
}

pub fn build_router(state: AppState) -> Router {
    let relay_routes = Router::new()
        .route("/api/trending", get(crate::relay::trending))
        .route("/api/top-rated", get(crate::relay::top_rated))
        .route("/api/chat", post(crate::relay::chat))
        .route("/api/movie/:id", get(crate::relay::movie));

    let mut router = Router::new()
        .route("/robots.txt", get(robots_txt_handler))
        .route("/health", get(health_handler))
        .merge(relay_routes)
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        router = router.fallback_service(ServeDir::new(appdir));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /api/\n"
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-cache, no-store")],
        "Healthy",
    )
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
