use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    servicegenius_auth::TokenCodec,
    servicegenius_config::{ErrorMapping, SalesforceConfig, ServiceGeniusConfig},
    servicegenius_oauth::{PasswordFlow, PasswordGrant},
    servicegenius_salesforce::SalesforceConnector,
};

/// Shared gateway state, built once at startup and handed to every handler.
pub struct GatewayState {
    /// Server version string.
    pub version: String,
    /// Session token signer/verifier.
    pub tokens: TokenCodec,
    /// Salesforce access: per-user tokens with the service account as fallback.
    pub salesforce: SalesforceConnector,
    /// Password grant used by interactive Salesforce logins.
    pub login_flow: PasswordFlow,
    /// Connected-app credentials for interactive logins.
    salesforce_config: SalesforceConfig,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// How facade errors become HTTP statuses.
    pub error_mapping: ErrorMapping,
}

impl GatewayState {
    pub fn new(
        tokens: TokenCodec,
        salesforce: SalesforceConnector,
        salesforce_config: SalesforceConfig,
        secure_cookies: bool,
        error_mapping: ErrorMapping,
    ) -> Arc<Self> {
        let login_flow = PasswordFlow::new(
            salesforce_config.login_url.clone(),
            salesforce.http_client().clone(),
        );
        Arc::new(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            tokens,
            salesforce,
            login_flow,
            salesforce_config,
            secure_cookies,
            error_mapping,
        })
    }

    pub fn from_config(config: &ServiceGeniusConfig) -> anyhow::Result<Arc<Self>> {
        let ttl = chrono::Duration::hours(i64::from(config.auth.session_ttl_hours));
        let tokens = TokenCodec::new(&config.auth.jwt_secret, ttl)?;
        let salesforce = SalesforceConnector::from_config(&config.salesforce);
        Ok(Self::new(
            tokens,
            salesforce,
            config.salesforce.clone(),
            config.auth.secure_cookies,
            config.api.error_mapping,
        ))
    }

    /// Password grant for a user logging in with their own Salesforce
    /// credentials, using the configured connected app.
    pub fn user_grant(&self, username: &str, password: &str) -> PasswordGrant {
        let sf = &self.salesforce_config;
        PasswordGrant {
            client_id: sf.client_id.clone().unwrap_or_default(),
            client_secret: sf
                .client_secret
                .clone()
                .unwrap_or_else(|| Secret::new(String::new())),
            username: username.to_string(),
            password: Secret::new(password.to_string()),
            security_token: sf
                .security_token
                .clone()
                .filter(|t| !t.expose_secret().is_empty()),
        }
    }
}
