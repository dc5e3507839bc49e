use crate::config::Listener as ListenerConfig;
use crate::types::ServiceStatusRecord;
use crate::upstream::{StatusSource, UpstreamError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const BEARER_PREFIX: &str = "Bearer ";
const STATUS_SUFFIX: &str = "/status";

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn StatusSource>,
    strict_status: bool,
}

impl AppState {
    pub fn new(source: Arc<dyn StatusSource>, strict_status: bool) -> Self {
        AppState {
            source,
            strict_status,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/services/status", get(list_statuses))
        // Catch-all so that an empty static URL segment still reaches the handler.
        .route("/api/service/{*lookup}", get(lookup_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn serve(listener: &ListenerConfig, state: AppState) -> std::io::Result<()> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp_listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(tcp_listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: API token is required")]
    Unauthorized,
    #[error("Bad request: staticUrl is required")]
    MissingStaticUrl,
    #[error("Service not found")]
    NotFound,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::MissingStaticUrl => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Upstream(err) if err.is_transport() => {
                tracing::error!(error = %err, "Error fetching service statuses");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch from Railway API".to_string(),
                )
            }
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "Error fetching service statuses");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse { error: message })).into_response()
    }
}

/// Extracts the caller's token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    if token.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    Ok(token)
}

async fn root() -> &'static str {
    "Railway service status API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_statuses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServiceStatusRecord>>, ApiError> {
    let token = bearer_token(&headers)?;
    let records = state.source.service_statuses(token).await?;
    Ok(Json(records))
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    service_name: String,
    status: String,
}

async fn lookup_status(
    State(state): State<AppState>,
    Path(lookup): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // The only route below /api/service/ is {staticUrl}/status.
    let static_url = lookup
        .strip_suffix(STATUS_SUFFIX)
        .ok_or(ApiError::NotFound)?;

    let token = bearer_token(&headers)?;

    if static_url.is_empty() {
        return Err(ApiError::MissingStaticUrl);
    }

    let records = state.source.service_statuses(token).await?;
    let record = records
        .into_iter()
        .find(|record| record.static_url.as_deref() == Some(static_url))
        .ok_or(ApiError::NotFound)?;

    let status = if state.strict_status && !record.is_succeeded() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = LookupResponse {
        service_name: record.service_name,
        status: record.status,
    };

    Ok((status, Json(body)).into_response())
}
