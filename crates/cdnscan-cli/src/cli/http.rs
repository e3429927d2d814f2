//! HTTP lookup endpoint: `GET /api/scan?url=..&min=..&max=..`.
//!
//! Found → 302 with `Location`; nothing live → 404; refused input → 400/403.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use cdnscan_core::probe::Probe;
use cdnscan_core::{RequestError, RequestPolicy, Resolution, ResolutionEngine};
use serde::Deserialize;

pub struct AppState<P> {
    engine: Arc<ResolutionEngine<P>>,
    policy: Arc<RequestPolicy>,
}

impl<P> AppState<P> {
    pub fn new(engine: Arc<ResolutionEngine<P>>, policy: RequestPolicy) -> Self {
        Self {
            engine,
            policy: Arc::new(policy),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            policy: Arc::clone(&self.policy),
        }
    }
}

pub fn router<P: Probe>(state: AppState<P>) -> Router {
    Router::new()
        .route("/api/scan", get(handle_scan::<P>))
        .with_state(state)
}

/// Raw query values; validated by `RequestPolicy::admit`.
#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub url: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        let status = match err {
            RequestError::DomainNotAllowed(_) => StatusCode::FORBIDDEN,
            RequestError::MissingUrl
            | RequestError::InvalidUrl
            | RequestError::InvalidRangeParam
            | RequestError::InvertedRange
            | RequestError::ZeroMin => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

async fn handle_scan<P: Probe>(
    State(state): State<AppState<P>>,
    Query(query): Query<ScanQuery>,
    request: Request,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_ip(request.headers(), peer);
    tracing::info!(
        client = %client,
        url = query.url.as_deref().unwrap_or(""),
        min = query.min.as_deref().unwrap_or(""),
        max = query.max.as_deref().unwrap_or(""),
        "lookup request"
    );

    let admitted = state.policy.admit(
        query.url.as_deref(),
        query.min.as_deref(),
        query.max.as_deref(),
    );
    let resolution_request = match admitted {
        Ok(r) => r,
        Err(e) => {
            tracing::info!(client = %client, "rejected lookup: {}", e);
            return AppError::from(e).into_response();
        }
    };

    match state.engine.resolve(&resolution_request).await {
        Resolution::Found(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
        Resolution::NotFound => AppError::new(
            StatusCode::NOT_FOUND,
            "No valid CDN found in given range",
        )
        .into_response(),
    }
}

/// First `X-Forwarded-For` entry, else `X-Real-IP`, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    header_value("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        .or_else(|| header_value("x-real-ip"))
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
