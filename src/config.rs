use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(alias = "apikey", default)]
    pub api_key: Option<String>,
    /// Key handed to the movie detail composer. Falls back to `api_key`.
    #[serde(alias = "publicapikey", default)]
    pub public_api_key: Option<String>,
    #[serde(alias = "baseurl", default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(alias = "imagebaseurl", default = "default_tmdb_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            public_api_key: None,
            base_url: default_tmdb_base_url(),
            image_base_url: default_tmdb_image_base_url(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    #[serde(alias = "apikey", default)]
    pub api_key: Option<String>,
    #[serde(alias = "baseurl", default = "default_openrouter_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openrouter_base_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "mistralai/mistral-7b-instruct".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.normalize_keys();
        Ok(config)
    }

    /// Overlay credentials from the process environment. Called once at startup;
    /// nothing else in the crate reads the environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(key) = lookup("TMDB_PUBLIC_API_KEY") {
            self.tmdb.public_api_key = Some(key);
        }
        if let Some(key) = lookup("OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }
        self.normalize_keys();
    }

    // An empty key is the same as no key.
    fn normalize_keys(&mut self) {
        for key in [
            &mut self.tmdb.api_key,
            &mut self.tmdb.public_api_key,
            &mut self.openrouter.api_key,
        ] {
            if key.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *key = None;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
