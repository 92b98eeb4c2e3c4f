use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

/// Credentials for the OAuth 2.0 username-password grant.
#[derive(Clone)]
pub struct PasswordGrant {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub username: String,
    pub password: Secret<String>,
    /// Appended to `password` when present and non-empty.
    pub security_token: Option<Secret<String>>,
}

impl PasswordGrant {
    /// The `password` form value: password followed by the security token.
    pub(crate) fn password_with_token(&self) -> String {
        let mut combined = self.password.expose_secret().clone();
        if let Some(token) = &self.security_token {
            combined.push_str(token.expose_secret());
        }
        combined
    }
}

impl std::fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field(
                "security_token",
                &self.security_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Successful response from `/services/oauth2/token`.
#[derive(Clone, Deserialize)]
pub struct SalesforceTokens {
    pub access_token: Secret<String>,
    pub instance_url: String,
    /// Identity URL for the authenticated user.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl std::fmt::Debug for SalesforceTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceTokens")
            .field("access_token", &"[REDACTED]")
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Error body returned by the token endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OAuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Subset of the Salesforce identity record used to build a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesforceIdentity {
    pub user_id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SalesforceIdentity {
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
