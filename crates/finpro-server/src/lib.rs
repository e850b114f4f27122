//! FinPro Web Server
//!
//! Axum-based REST API for the FinPro cash-flow dashboard.
//!
//! Security features:
//! - Bearer API-key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Request body size limit (receipt images)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use finpro_core::ai::AIBackend;
use finpro_core::insights::InsightService;
use finpro_core::store::{InMemoryStore, TransactionStore};

mod handlers;

/// Maximum request body size (10 MB, sized for receipt photos)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Accepted API keys, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

impl ServerConfig {
    /// Read `FINPRO_API_KEYS` and `FINPRO_ALLOWED_ORIGINS` (both comma-separated)
    pub fn from_env(require_auth: bool) -> Self {
        Self {
            require_auth,
            allowed_origins: parse_list(&std::env::var("FINPRO_ALLOWED_ORIGINS").unwrap_or_default()),
            api_keys: parse_list(&std::env::var("FINPRO_API_KEYS").unwrap_or_default()),
        }
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    /// Transactions of the current session
    pub store: Arc<dyn TransactionStore>,
    /// `None` when no AI backend is configured; AI endpoints then answer
    /// with their fallbacks
    pub insights: Option<InsightService>,
    pub config: ServerConfig,
}

/// Authentication middleware - validates the bearer API key
///
/// Keys are compared in constant time.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid API key");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // ct_eq is constant-time only for equal lengths
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router with an empty in-memory session store
pub fn create_router(insights: Option<InsightService>, config: ServerConfig) -> Router {
    create_router_with_store(Arc::new(InMemoryStore::new()), insights, config)
}

/// Create the application router over an existing store
pub fn create_router_with_store(
    store: Arc<dyn TransactionStore>,
    insights: Option<InsightService>,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        store,
        insights,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Session transactions
        .route(
            "/transactions",
            get(handlers::list_transactions)
                .post(handlers::add_transactions)
                .delete(handlers::clear_transactions),
        )
        .route("/transactions/:id", delete(handlers::delete_transaction))
        // Dashboard totals
        .route("/summary", get(handlers::get_summary))
        // AI
        .route("/insights", get(handlers::get_insights))
        .route("/forecast", get(handlers::get_forecast))
        .route("/receipts/analyze", post(handlers::analyze_receipt))
        .route("/advisor", post(handlers::ask_advisor));

    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(
    insights: Option<InsightService>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("⚠️  Authentication required but FINPRO_API_KEYS is empty - every request will be rejected");
    }

    check_ai_connection(insights.as_ref()).await;

    let app = create_router(insights, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(insights: Option<&InsightService>) {
    match insights {
        Some(service) => {
            let ai = service.ai();
            if ai.health_check().await {
                info!(
                    "✅ AI backend connected: {} at {} (model: {})",
                    ai.backend_name(),
                    ai.host(),
                    ai.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} at {}",
                    ai.backend_name(),
                    ai.host()
                );
            }
        }
        None => {
            info!("ℹ️  AI backend not configured (set GEMINI_API_KEY or AI_BACKEND to enable AI features)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
