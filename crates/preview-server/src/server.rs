//! HTTP server for the preview endpoints
//!
//! Provides PUT/GET on the configured report path, /health, and static files
//! for the designer.

use crate::config::Config;
use crate::error::{AppError, PreviewError};
use crate::protocol::PreviewService;
use crate::types::{
    FetchQuery, HealthResponse, InlineReport, ReportErrorsResponse, SubmitOutcome, SubmitRequest,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared state for the HTTP server
pub struct ServerState {
    pub service: PreviewService,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(service: PreviewService) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            &config.path,
            get(fetch_report).put(submit_report).options(preflight),
        )
        .route("/", get(index))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, config: &Config) -> std::io::Result<()> {
    let router = create_router(state, config);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}{}", addr, config.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let cache_stats = state.service.store().stats().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: cache_stats,
    })
}

async fn index() -> Redirect {
    Redirect::to("/index.html")
}

/// CORS headers are added by the layer; the body stays empty
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Render and cache a preview, answering with its key
async fn submit_report(State(state): State<SharedState>, body: Bytes) -> Response {
    let request: SubmitRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "BAD REQUEST - invalid request body");
            return AppError::BadRequest("invalid request body".to_string()).into_response();
        }
    };

    match state.service.submit(request).await {
        Ok(SubmitOutcome::Cached(handle)) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("key:{}", handle),
        )
            .into_response(),
        Ok(SubmitOutcome::Rejected(errors)) => {
            warn!(?errors, "Report errors returned to designer");
            Json(ReportErrorsResponse { errors }).into_response()
        }
        Err(e) => reject(e).into_response(),
    }
}

/// Return a cached or freshly rendered artifact
async fn fetch_report(
    State(state): State<SharedState>,
    Query(query): Query<FetchQuery>,
    body: Bytes,
) -> Response {
    // Only consulted when the key is absent or not handle-shaped
    let inline = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<InlineReport>(&body) {
            Ok(inline) => Some(inline),
            Err(e) => {
                warn!(error = %e, "BAD REQUEST - invalid request body");
                return AppError::BadRequest("invalid request body".to_string()).into_response();
            }
        }
    };

    let artifact = match state
        .service
        .fetch(query.output_format.as_deref(), query.key.as_deref(), inline)
        .await
    {
        Ok(artifact) => artifact,
        Err(e) => return reject(e).into_response(),
    };

    let filename = format!(
        "report-{}.{}",
        Utc::now().format("%Y-%m-%d_%H-%M-%S"),
        artifact.format.extension()
    );
    let cache_status = if artifact.from_cache { "HIT" } else { "MISS" };

    (
        [
            (header::CONTENT_TYPE, artifact.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
            (X_CACHE, cache_status.to_string()),
        ],
        artifact.bytes,
    )
        .into_response()
}

fn reject(err: PreviewError) -> AppError {
    warn!(
        reason = %err,
        report_errors = ?err.report_errors(),
        "BAD REQUEST"
    );
    AppError::from(err)
}
