//! DreamDirector HTTP API.
//!
//! Exposes the story director and the media library over JSON endpoints
//! under `/api`, optionally serving a single-page frontend for every other
//! path.

use std::path::Path;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .merge(routes::health::router())
        .merge(routes::story::router())
        .merge(routes::media::router())
        .merge(routes::api_not_found_router());

    let router = match &config.static_dir {
        Some(dir) => with_frontend(router, dir),
        None => router.merge(routes::root::router()),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}

/// Serves `dir` for every unmatched path, falling back to `index.html` so
/// client-side routes resolve.
fn with_frontend(router: Router<AppState>, dir: &Path) -> Router<AppState> {
    tracing::info!(static_dir = %dir.display(), "serving frontend");
    let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
    router.fallback_service(spa)
}

/// Allowed origins may be exact (`https://app.example.com`), a subdomain
/// pattern (`https://*.example.com`) or `*` for any origin. Credentials are
/// only allowed when every origin is named.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS allows any origin; credentials are disabled");
        return layer.allow_origin(AllowOrigin::any());
    }

    let mut exact: Vec<HeaderValue> = Vec::new();
    let mut patterns: Vec<OriginPattern> = Vec::new();
    for origin in origins {
        if let Some(pattern) = OriginPattern::parse(origin) {
            patterns.push(pattern);
            continue;
        }
        match HeaderValue::from_str(origin) {
            Ok(value) => exact.push(value),
            Err(e) => tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin"),
        }
    }

    layer
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            exact.contains(origin)
                || origin
                    .to_str()
                    .is_ok_and(|origin| patterns.iter().any(|p| p.matches(origin)))
        }))
        .allow_credentials(true)
}

/// `scheme://*.domain`: any subdomain of `domain` over `scheme`.
#[derive(Debug)]
struct OriginPattern {
    scheme: String,
    domain_suffix: String,
}

impl OriginPattern {
    fn parse(origin: &str) -> Option<Self> {
        let (scheme, domain) = origin.split_once("://*.")?;
        if scheme.is_empty() || domain.is_empty() || domain.contains(['*', '/']) {
            return None;
        }
        Some(Self {
            scheme: format!("{scheme}://"),
            domain_suffix: format!(".{domain}"),
        })
    }

    fn matches(&self, origin: &str) -> bool {
        origin
            .strip_prefix(&self.scheme)
            .and_then(|host| host.strip_suffix(&self.domain_suffix))
            .is_some_and(|sub| !sub.is_empty() && !sub.contains(['/', '@']))
    }
}
