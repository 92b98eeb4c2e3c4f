use {
    axum::{
        http::{HeaderMap, HeaderValue, header::SET_COOKIE},
        response::Response,
    },
    axum_extra::extract::cookie::{Cookie, CookieJar, SameSite},
    time::Duration,
    tracing::warn,
};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "token";

/// Build the session cookie carrying `token` for `ttl`.
pub fn session_cookie(token: &str, ttl: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Build an empty, immediately-expiring session cookie.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Append the session cookie to an outgoing response.
pub fn attach_session(
    response: &mut Response,
    token: &str,
    ttl: chrono::Duration,
    secure: bool,
) {
    append_cookie(response, session_cookie(token, ttl, secure));
}

/// Overwrite the session cookie on an outgoing response.
pub fn clear_session(response: &mut Response, secure: bool) {
    append_cookie(response, clear_session_cookie(secure));
}

/// Read the session token from a request's `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

fn append_cookie(response: &mut Response, cookie: Cookie<'static>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        },
        Err(e) => warn!(error = %e, "session cookie is not a valid header value"),
    }
}
