use {
    base64::{
        Engine,
        engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    },
    chrono::{DateTime, Duration, Utc},
    secrecy::ExposeSecret,
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    types::{OAuthErrorBody, PasswordGrant, SalesforceIdentity, SalesforceTokens},
};

/// Token lifetime assumed when the access token carries no readable `exp`.
pub const FALLBACK_TOKEN_LIFETIME_SECS: i64 = 2 * 60 * 60;

/// Runs the OAuth 2.0 username-password grant against a Salesforce login host.
#[derive(Debug, Clone)]
pub struct PasswordFlow {
    login_url: String,
    client: reqwest::Client,
}

impl PasswordFlow {
    pub fn new(login_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            login_url: login_url.into(),
            client,
        }
    }

    /// `{login_url}/services/oauth2/token`
    pub fn token_url(&self) -> String {
        format!(
            "{}/services/oauth2/token",
            self.login_url.trim_end_matches('/')
        )
    }

    /// Exchange the grant's credentials for an access token and instance URL.
    pub async fn authenticate(&self, grant: &PasswordGrant) -> Result<SalesforceTokens> {
        let token_url = self.token_url();
        info!(url = %token_url, username = %grant.username, "authenticating with Salesforce");

        let password = grant.password_with_token();
        let form = [
            ("grant_type", "password"),
            ("client_id", grant.client_id.as_str()),
            ("client_secret", grant.client_secret.expose_secret().as_str()),
            ("username", grant.username.as_str()),
            ("password", password.as_str()),
        ];

        let resp = self.client.post(&token_url).form(&form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str::<OAuthErrorBody>(&text).unwrap_or(OAuthErrorBody {
                error: Some("Unknown error".into()),
                error_description: Some(text),
            });
            warn!(
                status = status.as_u16(),
                error = body.error.as_deref().unwrap_or(""),
                description = body.error_description.as_deref().unwrap_or(""),
                "Salesforce authentication rejected"
            );
            return Err(Error::Authentication {
                status: status.as_u16(),
                code: body.error,
                description: body.error_description,
            });
        }

        let tokens = resp
            .json::<SalesforceTokens>()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;
        debug!(instance_url = %tokens.instance_url, "Salesforce authentication succeeded");
        Ok(tokens)
    }

    /// Load the identity record behind `tokens.id`.
    pub async fn fetch_identity(&self, tokens: &SalesforceTokens) -> Result<SalesforceIdentity> {
        let id_url = tokens
            .id
            .as_deref()
            .ok_or_else(|| Error::InvalidResponse("missing identity URL".into()))?;

        let resp = self
            .client
            .get(id_url)
            .bearer_auth(tokens.access_token.expose_secret())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Identity {
                status: status.as_u16(),
            });
        }

        resp.json::<SalesforceIdentity>()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Expiry of `access_token`, read from its JWT `exp` claim when it has one,
/// else `now` plus [`FALLBACK_TOKEN_LIFETIME_SECS`].
pub fn token_expiry(access_token: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    parse_jwt_claims(access_token)
        .and_then(|claims| claims.get("exp").and_then(serde_json::Value::as_i64))
        .and_then(|exp| DateTime::from_timestamp(exp, 0))
        .unwrap_or(now + Duration::seconds(FALLBACK_TOKEN_LIFETIME_SECS))
}

fn parse_jwt_claims(token: &str) -> Option<serde_json::Value> {
    let payload_b64 = token.split('.').nth(1)?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64).or_else(|_| {
        let padded = match payload_b64.len() % 4 {
            2 => format!("{payload_b64}=="),
            3 => format!("{payload_b64}="),
            _ => payload_b64.to_string(),
        };
        STANDARD.decode(padded)
    });
    serde_json::from_slice(&payload.ok()?).ok()
}
