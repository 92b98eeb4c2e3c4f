use std::sync::Arc;

use {
    axum::{
        body::Body,
        extract::{FromRef, FromRequestParts, State},
        http::{HeaderMap, Request, request::Parts},
        middleware::Next,
        response::{IntoResponse, Redirect, Response},
    },
    servicegenius_auth::{Role, User, session_token},
    tracing::debug,
};

use crate::{api_error::ApiError, server::AppState, state::GatewayState};

/// Paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/", "/login", "/api/auth/login", "/health"];

/// Path prefixes reachable without a session.
const PUBLIC_PREFIXES: &[&str] = &["/assets/"];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Axum extractor that resolves the session cookie into a [`User`].
/// Rejects with a JSON 401 when the cookie is missing, expired or forged.
pub struct AuthSession(pub User);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    Arc<GatewayState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(AuthSession(user.clone()));
        }
        let gw = Arc::<GatewayState>::from_ref(state);
        current_user(&gw, &parts.headers)
            .map(AuthSession)
            .ok_or_else(ApiError::unauthorized)
    }
}

impl AuthSession {
    /// Fail with 403 unless the session's role is in `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.0.has_role(allowed) {
            Ok(())
        } else {
            debug!(user_id = %self.0.id, role = %self.0.role, "role not permitted");
            Err(ApiError::forbidden())
        }
    }
}

/// Resolve the session user from request headers.
pub fn current_user(state: &GatewayState, headers: &HeaderMap) -> Option<User> {
    session_token(headers).and_then(|token| state.tokens.verify(&token))
}

/// Edge gate in front of every route.
///
/// Public paths pass through. Everything else needs a valid session; without
/// one the browser is redirected to `/login?from=<path>`.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(request).await;
    }

    match current_user(&state.gateway, request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        },
        None => {
            debug!(path = %path, "no session, redirecting to login");
            Redirect::temporary(&login_redirect(&path)).into_response()
        },
    }
}

fn login_redirect(from: &str) -> String {
    format!("/login?from={}", urlencoding::encode(from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/login"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/assets/app.js"));
        assert!(!is_public_path("/api/agents"));
        assert!(!is_public_path("/api/auth/logout"));
        assert!(!is_public_path("/loginx"));
    }

    #[test]
    fn redirect_carries_origin_path() {
        assert_eq!(login_redirect("/dashboard"), "/login?from=%2Fdashboard");
        assert_eq!(
            login_redirect("/api/agents/a00xx"),
            "/login?from=%2Fapi%2Fagents%2Fa00xx"
        );
    }
}
