//! APOD proxy server
//!
//! A stateless HTTP front for NASA's Astronomy Picture of the Day API. The
//! handler injects the server-held key, forwards the optional `date` query
//! value, and returns the upstream JSON with a wildcard CORS header.
//!
//! Status mapping:
//!
//! - non-GET: `405 {"error": "Method not allowed"}`
//! - no key configured: `500 {"error": "NASA API key is not configured"}`
//! - any upstream failure: `500 {"error": "Failed to fetch from NASA API", "message": ...}`

pub mod apod;

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::ProxyConfig;
use crate::error::{Result, StargazerError};

pub use apod::{ApodClient, ImageOfDayClient};

/// Path the proxy serves
pub const APOD_PATH: &str = "/api/apod";

/// Shared, immutable handler state
pub struct ProxyState {
    api_key: Option<String>,
    client: Arc<dyn ImageOfDayClient>,
}

impl ProxyState {
    /// Create handler state
    ///
    /// A blank key is treated as missing.
    pub fn new(api_key: Option<String>, client: Arc<dyn ImageOfDayClient>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }
}

/// First `date` value in a raw query string
///
/// Parsing never fails: repeated keys keep the first value and invalid
/// percent-escapes decode lossily, so the value is forwarded rather than
/// rejected.
pub fn date_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "date")
        .map(|(_, value)| value.into_owned())
}

/// Error payload returned by the proxy
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Short error description
    pub error: String,
    /// Optional detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn error_response(status: StatusCode, error: &str, message: Option<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
            message,
        }),
    )
        .into_response()
}

/// Build the proxy router
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(APOD_PATH, any(apod_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(state))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn apod_handler(
    method: Method,
    State(state): State<Arc<ProxyState>>,
    RawQuery(query): RawQuery,
) -> Response {
    if method != Method::GET {
        tracing::debug!(%method, "Rejected non-GET request");
        let mut response =
            error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None);
        response
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("GET"));
        return response;
    }

    let Some(api_key) = state.api_key.as_deref() else {
        tracing::error!("APOD request received but NASA_API_KEY is not set");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "NASA API key is not configured",
            None,
        );
    };

    let date = date_param(query.as_deref());
    match state.client.fetch(api_key, date.as_deref()).await {
        Ok(body) => {
            tracing::info!(date = ?date, "Served APOD");
            let mut response = Json(body).into_response();
            response.headers_mut().insert(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            );
            response
        }
        Err(e) => {
            tracing::warn!(date = ?date, "APOD upstream failure: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch from NASA API",
                Some(e.to_string()),
            )
        }
    }
}

/// Run the proxy until Ctrl-C
///
/// # Errors
///
/// Returns error if the client cannot be built or the address cannot be bound
pub async fn serve(config: &ProxyConfig) -> Result<()> {
    if config.api_key.is_none() {
        tracing::warn!("NASA_API_KEY is not set; /api/apod will answer 500");
    }

    let client = Arc::new(ApodClient::new(config)?);
    let app = router(ProxyState::new(config.api_key.clone(), client));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|e| StargazerError::Server(format!("Failed to bind {}: {}", config.bind, e)))?;
    tracing::info!("APOD proxy listening on http://{}{}", config.bind, APOD_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down APOD proxy");
        })
        .await
        .map_err(|e| StargazerError::Server(format!("Proxy server failed: {}", e)))?;

    Ok(())
}
