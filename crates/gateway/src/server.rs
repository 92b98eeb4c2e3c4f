use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        extract::{FromRef, State},
        response::{IntoResponse, Json},
        routing::get,
    },
    servicegenius_config::ServiceGeniusConfig,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
};

use crate::{
    agent_routes::agent_router,
    api_error::ApiError,
    auth_middleware::{AuthSession, require_session},
    auth_routes::auth_router,
    customer_routes::customer_router,
    dashboard_routes::dashboard_router,
    state::GatewayState,
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

impl FromRef<AppState> for Arc<GatewayState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.gateway)
    }
}

impl AppState {
    /// Error converter for a facade call, applying the configured mapping
    /// policy with `message` as the route's failure text.
    pub fn facade_error(
        &self,
        message: &'static str,
    ) -> impl FnOnce(servicegenius_salesforce::Error) -> ApiError {
        let policy = self.gateway.error_mapping;
        move |err| ApiError::from_facade(policy, &err, message)
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// JSON API routes without the edge gate. Handlers still reject requests
/// without a session with 401.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_router())
        .nest("/api/agents", agent_router())
        .nest("/api/customer-service", customer_router())
        .nest("/api/dashboard", dashboard_router())
        .route("/api/salesforce/status", get(salesforce_status_handler))
}

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_state = AppState { gateway: state };

    Router::new()
        .route("/", get(root_handler))
        .route("/login", get(login_page_handler))
        .route("/health", get(health_handler))
        .merge(api_router())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the gateway HTTP server.
pub async fn start_gateway(config: &ServiceGeniusConfig) -> anyhow::Result<()> {
    let state = GatewayState::from_config(config)?;
    if config.auth.uses_default_secret() {
        warn!("session tokens are signed with the default secret; set JWT_SECRET");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let app = build_gateway_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "servicegenius gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
    }))
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "ServiceGenius",
        "login": "/login",
    }))
}

async fn login_page_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "login": "/api/auth/login",
        "modes": ["demo", "salesforce"],
    }))
}

async fn salesforce_status_handler(
    State(state): State<AppState>,
    _session: AuthSession,
) -> impl IntoResponse {
    let connected = state.gateway.salesforce.is_connected().await;
    Json(serde_json::json!({ "connected": connected }))
}
