pub mod config;
pub mod middleware;
pub mod movie;
pub mod openrouter;
pub mod relay;
pub mod server;
pub mod tmdb;
pub mod upstream;
pub mod widgets;

use std::net::SocketAddr;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Failed to load TLS config: {0}")]
    Tls(std::io::Error),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the configuration: the file when given, then credentials from the
/// environment.
pub fn load_config(config_path: Option<&str>) -> Result<config::Config, ServerError> {
    let mut config = match config_path {
        Some(path) => {
            info!("Using config file: {}", path);
            config::Config::from_file(path)?
        }
        None => config::Config::default(),
    };
    config.apply_env();
    Ok(config)
}

pub async fn run(config_path: Option<&str>, debug_logs: bool) -> Result<(), ServerError> {
    let mut config = load_config(config_path)?;
    config.debug_logs = debug_logs;

    if debug_logs {
        info!("Debug logging enabled");
    }
    if config.tmdb.api_key.is_none() {
        warn!("No TMDB API key configured, movie endpoints will return 500");
    }
    if config.openrouter.api_key.is_none() {
        warn!("No OpenRouter API key configured, chat endpoint will return 500");
    }
    info!("Chat model: {}", config.openrouter.model);

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port).parse()?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let shutdown = CancellationToken::new();
    let state = server::AppState::from_config(config, shutdown.clone())?;
    let app = server::build_router(state);

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(ServerError::Tls)?;

        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_token.cancel();
            signal_handle.graceful_shutdown(None);
        });

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let signal_token = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                signal_token.cancel();
            })
            .await?;
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
