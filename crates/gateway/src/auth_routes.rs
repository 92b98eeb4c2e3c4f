use {
    axum::{
        Json, Router,
        extract::{State, rejection::JsonRejection},
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    secrecy::ExposeSecret,
    serde::Deserialize,
    servicegenius_auth::{Role, User, attach_session, clear_session},
    servicegenius_oauth::{Error as OAuthError, SalesforceTokens},
    tracing::{error, info, warn},
};

use crate::{
    api_error::{ApiError, json_body},
    auth_middleware::AuthSession,
    server::AppState,
    state::GatewayState,
};

/// Build the auth router with all `/api/auth/*` routes.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route("/check-demo", get(check_demo_handler))
}

// ── Login ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
    /// `"demo"` or `"salesforce"`; anything but `"demo"` is a Salesforce login.
    #[serde(default)]
    mode: Option<String>,
}

async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload, "Invalid login request")?;
    let gw = &state.gateway;

    if body.mode.as_deref() == Some("demo") {
        info!("logging in with demo credentials");
        return demo_login(gw, None);
    }

    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return Err(ApiError::bad_request(
            "Username and password are required for Salesforce login",
        ));
    };

    info!(username = %username, "attempting Salesforce authentication");
    let grant = gw.user_grant(&username, &password);
    let tokens = match gw.login_flow.authenticate(&grant).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(error = %e, "Salesforce authentication failed, falling back to demo mode");
            return demo_login(gw, Some(salesforce_error(&e)));
        },
    };

    let user = salesforce_user(gw, &tokens, &username).await;
    info!(user_id = %user.id, "Salesforce authentication successful");
    let body = serde_json::json!({
        "user": user.public(),
        "salesforceConnected": true,
    });
    session_response(gw, &user, body)
}

/// Build the session identity for a Salesforce login, falling back to a
/// generic user when the identity endpoint cannot be read.
async fn salesforce_user(gw: &GatewayState, tokens: &SalesforceTokens, username: &str) -> User {
    let token = Some(tokens.access_token.expose_secret().clone());
    let instance_url = Some(tokens.instance_url.clone());
    match gw.login_flow.fetch_identity(tokens).await {
        Ok(identity) => User {
            name: identity.display_name(),
            email: identity.email.clone().unwrap_or_default(),
            id: identity.user_id,
            role: Role::Admin,
            salesforce_token: token,
            salesforce_instance_url: instance_url,
        },
        Err(e) => {
            error!(error = %e, "error fetching user info from Salesforce");
            User {
                id: "sf-user".into(),
                name: "Salesforce User".into(),
                email: username.to_string(),
                role: Role::Admin,
                salesforce_token: token,
                salesforce_instance_url: instance_url,
            }
        },
    }
}

fn demo_login(gw: &GatewayState, salesforce_error: Option<String>) -> Result<Response, ApiError> {
    let user = User::demo();
    let mut body = serde_json::json!({
        "user": user,
        "demoMode": true,
    });
    if let Some(reason) = salesforce_error {
        body["salesforceError"] = serde_json::Value::String(reason);
    }
    session_response(gw, &user, body)
}

/// The reason reported back to the browser when a Salesforce login fails.
fn salesforce_error(err: &OAuthError) -> String {
    match err {
        OAuthError::Authentication {
            code, description, ..
        } => description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(code.as_deref().filter(|c| !c.is_empty()))
            .unwrap_or("Authentication failed")
            .to_string(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// JSON response carrying a fresh session cookie for `user`.
fn session_response(
    gw: &GatewayState,
    user: &User,
    body: serde_json::Value,
) -> Result<Response, ApiError> {
    let token = gw.tokens.sign(user).map_err(|e| {
        error!(error = %e, "error signing session token");
        ApiError::internal("An unexpected error occurred")
    })?;
    let mut response = Json(body).into_response();
    attach_session(&mut response, &token, gw.tokens.ttl(), gw.secure_cookies);
    Ok(response)
}

// ── Logout ───────────────────────────────────────────────────────────────────

async fn logout_handler(State(state): State<AppState>) -> Response {
    let mut response = Json(serde_json::json!({ "success": true })).into_response();
    clear_session(&mut response, state.gateway.secure_cookies);
    response
}

// ── Session info ─────────────────────────────────────────────────────────────

async fn me_handler(AuthSession(user): AuthSession) -> impl IntoResponse {
    Json(serde_json::json!({ "user": user.public() }))
}

async fn check_demo_handler(AuthSession(user): AuthSession) -> impl IntoResponse {
    Json(serde_json::json!({ "demoMode": user.is_demo() }))
}
