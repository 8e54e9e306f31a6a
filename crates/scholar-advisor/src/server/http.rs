//! HTTP API.
//!
//! - `GET /health`
//! - `POST /api/profile` resolve a profile for a form submission
//! - `POST /api/analyze` resolve a profile and generate the assessment
//!
//! Each client carries its session in the `x-session-id` header. A missing or
//! unknown id starts a fresh session; the id is echoed on every response.
//! Idle sessions expire.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{render_analysis, render_error, render_profile};
use crate::advisor::Advisor;
use crate::config::api;
use crate::error::{AdvisorError, FetchError};
use crate::fetcher::CancelSignal;
use crate::models::{AdvisorRequest, ResponseFormat};
use crate::session::SessionCache;

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Maximum number of live sessions.
const MAX_SESSIONS: u64 = 10_000;

type SharedSession = Arc<Mutex<SessionCache>>;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub advisor: Advisor,
    pub sessions: Cache<String, SharedSession>,
}

impl HttpState {
    /// Create state with sessions expiring after `idle_timeout` without use.
    #[must_use]
    pub fn new(advisor: Advisor, idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle_timeout)
            .build();
        Self { advisor, sessions }
    }

    /// Look up the caller's session, creating one when needed.
    async fn session(&self, headers: &HeaderMap) -> (String, SharedSession) {
        let id = headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

        let session = self
            .sessions
            .get_with(id.clone(), async { Arc::new(Mutex::new(SessionCache::new())) })
            .await;
        (id, session)
    }
}

/// Create the HTTP router with the default session idle timeout.
pub fn create_router(advisor: Advisor) -> Router {
    create_router_with_state(HttpState::new(advisor, api::SESSION_IDLE_TIMEOUT))
}

/// Create the HTTP router over existing state.
pub fn create_router_with_state(state: HttpState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/profile", post(handle_profile))
        .route("/api/analyze", post(handle_analyze))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "scholar-advisor",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_profile(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Json(req): Json<AdvisorRequest>,
) -> Response {
    let (session_id, session) = state.session(&headers).await;
    let mut session = session.lock().await;

    let response = match state.advisor.profile(&req, &mut session, CancelSignal::never()).await {
        Ok(lookup) => (StatusCode::OK, Json(render_profile(&lookup, req.response_format))),
        Err(e) => error_response(&e, req.response_format),
    };
    with_session(response, &session_id)
}

async fn handle_analyze(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    Json(req): Json<AdvisorRequest>,
) -> Response {
    let (session_id, session) = state.session(&headers).await;
    let mut session = session.lock().await;

    let response = match state.advisor.analyze(&req, &mut session, CancelSignal::never()).await {
        Ok(analysis) => (StatusCode::OK, Json(render_analysis(&analysis, req.response_format))),
        Err(e) => error_response(&e, req.response_format),
    };
    with_session(response, &session_id)
}

fn error_response(
    err: &AdvisorError,
    format: ResponseFormat,
) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!(kind = err.kind(), error = %err, "Request failed");
    (status_for(err), Json(render_error(err, format)))
}

/// HTTP status for a pipeline error.
#[must_use]
pub const fn status_for(err: &AdvisorError) -> StatusCode {
    match err {
        AdvisorError::Validation { .. } => StatusCode::BAD_REQUEST,
        AdvisorError::Fetch(FetchError::NotFound { .. }) => StatusCode::NOT_FOUND,
        AdvisorError::Fetch(FetchError::Exhausted { .. } | FetchError::Cancelled) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AdvisorError::Generation(_) => StatusCode::BAD_GATEWAY,
        AdvisorError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn with_session(response: impl IntoResponse, session_id: &str) -> Response {
    let mut response = response.into_response();
    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
