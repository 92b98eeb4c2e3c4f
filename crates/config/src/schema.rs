/// Config schema types (server, session auth, Salesforce connection, API policy).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// JWT secret used when neither the config file nor `JWT_SECRET` provide one.
pub const DEFAULT_JWT_SECRET: &str = "default-secret-key-change-in-production";

/// Default Salesforce login host for the OAuth2 password grant.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

/// Salesforce REST API version used for every `/services/data/...` path.
pub const DEFAULT_API_VERSION: &str = "v58.0";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceGeniusConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub salesforce: SalesforceConfig,
    pub api: ApiConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Session token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for signing session tokens.
    #[serde(serialize_with = "serialize_secret")]
    pub jwt_secret: Secret<String>,
    /// Mark the session cookie `Secure`. Enable in production.
    pub secure_cookies: bool,
    /// Session lifetime in hours, applied to both the token and the cookie.
    pub session_ttl_hours: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::new(DEFAULT_JWT_SECRET.to_string()),
            secure_cookies: false,
            session_ttl_hours: 24,
        }
    }
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEFAULT_JWT_SECRET
    }
}

/// Salesforce connected-app and service-account credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesforceConfig {
    pub client_id: Option<String>,
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_secret: Option<Secret<String>>,
    pub username: Option<String>,
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Secret<String>>,
    /// Appended to the password for logins from untrusted IP ranges.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub security_token: Option<Secret<String>>,
    pub login_url: String,
    pub api_version: String,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            security_token: None,
            login_url: DEFAULT_LOGIN_URL.into(),
            api_version: DEFAULT_API_VERSION.into(),
        }
    }
}

impl SalesforceConfig {
    /// Names of the service-account settings that are unset or empty.
    ///
    /// An empty list means the shared service account can authenticate.
    pub fn missing_service_account_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if is_blank(self.client_id.as_deref()) {
            missing.push("client_id".to_string());
        }
        if is_blank_secret(self.client_secret.as_ref()) {
            missing.push("client_secret".to_string());
        }
        if is_blank(self.username.as_deref()) {
            missing.push("username".to_string());
        }
        if is_blank_secret(self.password.as_ref()) {
            missing.push("password".to_string());
        }
        if is_blank_secret(self.security_token.as_ref()) {
            missing.push("security_token".to_string());
        }
        if self.login_url.trim().is_empty() {
            missing.push("login_url".to_string());
        }
        missing
    }
}

/// How route handlers translate facade errors into HTTP statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMapping {
    /// Every facade failure becomes a 500 with a route-specific message.
    #[default]
    Generic,
    /// Invalid input and upstream 400/404 keep their status; the rest are 500.
    Typed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub error_mapping: ErrorMapping,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn is_blank_secret(value: Option<&Secret<String>>) -> bool {
    value.is_none_or(|v| v.expose_secret().trim().is_empty())
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_salesforce_login_host() {
        let cfg = ServiceGeniusConfig::default();
        assert_eq!(cfg.salesforce.login_url, "https://login.salesforce.com");
        assert_eq!(cfg.salesforce.api_version, "v58.0");
        assert_eq!(cfg.auth.session_ttl_hours, 24);
        assert!(cfg.auth.uses_default_secret());
        assert_eq!(cfg.api.error_mapping, ErrorMapping::Generic);
    }

    #[test]
    fn missing_keys_lists_every_blank_field() {
        let cfg = SalesforceConfig {
            client_id: Some("abc".into()),
            username: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.missing_service_account_keys(), vec![
            "client_secret",
            "username",
            "password",
            "security_token",
        ]);
    }

    #[test]
    fn error_mapping_parses_lowercase() {
        let api: ApiConfig = toml::from_str("error_mapping = \"typed\"").unwrap();
        assert_eq!(api.error_mapping, ErrorMapping::Typed);
    }
}
