/// HTTP license server: `POST /validate` and `POST /generate`
pub mod api;
pub mod error;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, Method, header},
    routing::post,
};
use chrono::{NaiveDate, Utc};
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{LicenseError, LicenseResult};
use crate::license::issue;
use crate::validate::{Verdict, validate_encoded};

pub use api::{API_KEY_HEADER, EncodedLicense, ErrorMessage, GenerateRequest, ResultMessage};
pub use error::ApiError;

/// Shared, immutable server state.
pub struct AppState {
    secret: Vec<u8>,
    api_key: String,
    clock: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(secret: impl Into<Vec<u8>>, api_key: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            api_key: api_key.into(),
            clock: utc_today,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.secret.as_bytes(), config.api_key.as_str())
    }

    /// Replaces the source of "today" used for validity windows.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    fn api_key_matches(&self, presented: &[u8]) -> bool {
        presented.ct_eq(self.api_key.as_bytes()).into()
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ResultMessage>, ApiError> {
    let request: EncodedLicense =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest)?;

    match validate_encoded(&request.license, &state.secret, (state.clock)()) {
        Ok(Verdict::Valid) => Ok(Json(ResultMessage {
            result: "Valid!".to_string(),
        })),
        Ok(verdict) => {
            warn!(%verdict, "license rejected");
            Err(ApiError::InvalidLicense)
        }
        Err(e) => {
            info!(error = %e, "unusable license submitted");
            Err(ApiError::InvalidLicense)
        }
    }
}

async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ResultMessage>, ApiError> {
    let presented = headers.get(API_KEY_HEADER).ok_or(ApiError::MissingApiKey)?;
    if !state.api_key_matches(presented.as_bytes()) {
        warn!("generate request with wrong API key");
        return Err(ApiError::InvalidApiKey);
    }

    let request: GenerateRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest)?;
    let issue_request = request
        .into_issue_request()
        .map_err(|_| ApiError::InvalidGenerateRequest)?;

    let issued = issue(issue_request, &state.secret, (state.clock)()).map_err(|e| match e {
        LicenseError::InvalidInput(_) | LicenseError::UnsafeFieldValue { .. } => {
            ApiError::InvalidGenerateRequest
        }
        other => {
            warn!(error = %other, "license generation failed");
            ApiError::Internal
        }
    })?;

    info!(
        id = issued.assertion.license.id.as_deref().unwrap_or_default(),
        valid_until = %issued.assertion.license.valid_until,
        "generated license"
    );
    Ok(Json(ResultMessage {
        result: issued.encoded,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([HeaderName::from_static(API_KEY_HEADER), header::CONTENT_TYPE]);

    Router::new()
        .route("/validate", post(validate_handler))
        .route("/generate", post(generate_handler))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the license server until Ctrl-C.
pub async fn serve(config: ServerConfig) -> LicenseResult<()> {
    config.validate()?;
    let addr = config.listen_addr();
    let app = build_router(Arc::new(AppState::from_config(&config)));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| LicenseError::Network(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "license server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LicenseError::Network(format!("server error: {e}")))?;

    info!("license server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
