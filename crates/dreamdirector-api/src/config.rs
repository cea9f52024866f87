//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dreamdirector_providers::ProviderConfig;

use crate::error::AppError;

/// Origins allowed by CORS when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Everything the server reads at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Where generated media is written.
    pub media_dir: PathBuf,
    /// Further directories searched when listing and serving media.
    pub media_search_dirs: Vec<PathBuf>,
    /// Built frontend to serve for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins.
    pub cors_allowed_origins: Vec<String>,
    /// OTLP collector endpoint; spans are exported only when set.
    pub otlp_endpoint: Option<String>,
    /// Provider settings; `None` without `GOOGLE_API_KEY`.
    pub providers: Option<ProviderConfig>,
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let providers = match get("GOOGLE_API_KEY") {
            Some(api_key) => {
                let mut providers = ProviderConfig::new(api_key);
                if let Some(base_url) = get("GENAI_BASE_URL") {
                    providers.base_url = base_url;
                }
                if let Some(model) = get("GENAI_TEXT_MODEL") {
                    providers.text_model = model;
                }
                if let Some(model) = get("GENAI_IMAGE_MODEL") {
                    providers.image_model = model;
                }
                if let Some(model) = get("GENAI_VIDEO_MODEL") {
                    providers.video_model = model;
                }
                if let Some(model) = get("GENAI_MUSIC_MODEL") {
                    providers.music_model = model;
                }
                if let Some(secs) = parse::<u64>(&get, "VIDEO_POLL_INTERVAL_SECS")? {
                    providers.video_poll_interval = Duration::from_secs(secs);
                }
                if let Some(polls) = parse::<u32>(&get, "VIDEO_MAX_POLLS")? {
                    providers.video_max_polls = polls;
                }
                Some(providers)
            }
            None => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse(&get, "PORT")?.unwrap_or(8000),
            media_dir: get("MEDIA_DIR")
                .map_or_else(|| PathBuf::from("generated_media"), PathBuf::from),
            media_search_dirs: get("MEDIA_SEARCH_DIRS")
                .map(|dirs| split_list(&dirs).map(PathBuf::from).collect())
                .unwrap_or_default(),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS").map_or_else(
                || DEFAULT_CORS_ORIGINS.map(str::to_owned).to_vec(),
                |origins| split_list(&origins).map(str::to_owned).collect(),
            ),
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            providers,
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable `HOST:PORT`.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AppError::Config(format!("{key} is invalid ({raw}): {e}")))
        })
        .transpose()
}
