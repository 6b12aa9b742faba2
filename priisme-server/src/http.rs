//! PRIISME analysis proxy over HTTP
//!
//! Axum-based server in front of the AI gateway. Each endpoint has a thin
//! handler that delegates to an inner function returning
//! `(StatusCode, serde_json::Value)`, so the logic is testable without the
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET     /health — liveness plus whether a gateway credential is configured
//!   (other methods on `/health` are handled like any other path)
//! - OPTIONS (any)   — CORS preflight, 204 with an empty body
//! - POST    (any)   — analyze `{imageBase64}`
//!
//! Every response carries the permissive CORS headers.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use priisme_core::gateway::GatewaySettings;
use priisme_core::{GatewayError, PriismeConfig, StyleModelClient};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::proxy::analyze_inner;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Base64 photos are large; axum's 2 MB default is too small.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Shared state for all HTTP handlers
pub struct HttpState {
    pub config: PriismeConfig,
    /// `None` when the gateway credential is missing; analyze requests then
    /// fail with "AI service not configured".
    pub gateway: Option<StyleModelClient>,
}

impl HttpState {
    pub fn from_config(config: PriismeConfig) -> Result<Self, GatewayError> {
        let gateway = match StyleModelClient::new(GatewaySettings::from_config(&config.gateway)) {
            Ok(client) => Some(client),
            Err(GatewayError::MissingApiKey) => {
                tracing::warn!(
                    env = %config.gateway.api_key_env,
                    "AI gateway API key not set; analyze requests will fail"
                );
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self { config, gateway })
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler).fallback(dispatch_handler))
        .fallback(dispatch_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    config: PriismeConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState::from_config(config)?);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("PRIISME analysis proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner health check (pure, no IO).
pub fn health_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "configured": state.gateway.is_some(),
            "model": state.config.gateway.model,
        }),
    )
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state);
    (status, Json(body))
}

/// Everything except `GET /health`: preflight or analyze, depending on method.
pub async fn dispatch_handler(
    State(state): State<Arc<HttpState>>,
    method: Method,
    body: Bytes,
) -> Response {
    match method {
        Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
        Method::POST => {
            let (status, body) = analyze_inner(state.gateway.as_ref(), &body).await;
            (status, Json(body)).into_response()
        }
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({ "error": "Method not allowed" })),
        )
            .into_response(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_state() -> HttpState {
        HttpState {
            config: PriismeConfig::default(),
            gateway: None,
        }
    }

    // ========================================================================
    // TEST 1: health_inner reports version and configuration
    // ========================================================================
    #[test]
    fn test_health_inner_pure() {
        let (status, body) = health_inner(&unconfigured_state());
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["configured"], false);
        assert_eq!(body["model"], "google/gemini-2.5-flash");
    }

    // ========================================================================
    // TEST 2: a configured gateway shows up in health
    // ========================================================================
    #[test]
    fn test_health_inner_configured() {
        let settings = GatewaySettings {
            api_key: "test-key".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            base_url: "http://localhost:1".to_string(),
        };
        let state = HttpState {
            config: PriismeConfig::default(),
            gateway: Some(StyleModelClient::new(settings).unwrap()),
        };
        let (_, body) = health_inner(&state);
        assert_eq!(body["configured"], true);
    }
}
