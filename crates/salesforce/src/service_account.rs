//! Shared service-account credential.
//!
//! One instance lives for the whole process and is injected wherever a request
//! has no Salesforce token of its own. The cached token is reused until
//! [`REFRESH_BUFFER_SECS`] before its expiry, then the password grant runs
//! again. Refresh happens under a mutex so concurrent cold starts
//! authenticate once.

use {
    chrono::{DateTime, Duration, Utc},
    secrecy::{ExposeSecret, Secret},
    servicegenius_config::SalesforceConfig,
    servicegenius_oauth::{PasswordFlow, PasswordGrant, token_expiry},
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
};

use crate::{Error, Result, credentials::BearerCredential};

/// Re-authenticate once the cached token is this close to expiring.
pub const REFRESH_BUFFER_SECS: i64 = 5 * 60;

#[derive(Clone)]
struct CachedToken {
    access_token: Secret<String>,
    instance_url: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(REFRESH_BUFFER_SECS)
    }

    fn credential(&self) -> BearerCredential {
        BearerCredential {
            access_token: self.access_token.clone(),
            instance_url: self.instance_url.clone(),
        }
    }
}

pub struct ServiceAccountAuth {
    flow: PasswordFlow,
    grant: PasswordGrant,
    state: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("flow", &self.flow)
            .field("grant", &self.grant)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    pub fn new(flow: PasswordFlow, grant: PasswordGrant) -> Self {
        Self {
            flow,
            grant,
            state: Mutex::new(None),
        }
    }

    /// Build from config, failing with [`Error::MissingConfig`] when any
    /// service-account setting is blank.
    pub fn from_config(config: &SalesforceConfig, client: reqwest::Client) -> Result<Self> {
        let missing = config.missing_service_account_keys();
        if !missing.is_empty() {
            return Err(Error::MissingConfig(missing));
        }
        let (Some(client_id), Some(client_secret), Some(username), Some(password)) = (
            config.client_id.clone(),
            config.client_secret.clone(),
            config.username.clone(),
            config.password.clone(),
        ) else {
            return Err(Error::MissingConfig(missing));
        };

        let grant = PasswordGrant {
            client_id,
            client_secret,
            username,
            password,
            security_token: config.security_token.clone(),
        };
        Ok(Self::new(
            PasswordFlow::new(config.login_url.clone(), client),
            grant,
        ))
    }

    /// Current credential, authenticating first if none is cached or the
    /// cached one is inside the refresh buffer.
    pub async fn grant(&self) -> Result<BearerCredential> {
        self.grant_at(Utc::now()).await
    }

    pub async fn grant_at(&self, now: DateTime<Utc>) -> Result<BearerCredential> {
        let mut state = self.state.lock().await;
        if let Some(cached) = state.as_ref().filter(|c| c.is_fresh(now)) {
            return Ok(cached.credential());
        }

        if state.is_some() {
            debug!("service-account token inside refresh buffer, re-authenticating");
        }

        let tokens = self.flow.authenticate(&self.grant).await.inspect_err(|e| {
            warn!(error = %e, "service-account authentication failed");
        })?;
        let expires_at = token_expiry(tokens.access_token.expose_secret(), now);
        info!(
            instance_url = %tokens.instance_url,
            expires_at = %expires_at,
            "service-account authenticated"
        );

        let cached = CachedToken {
            access_token: tokens.access_token,
            instance_url: tokens.instance_url,
            expires_at,
        };
        let credential = cached.credential();
        *state = Some(cached);
        Ok(credential)
    }

    /// When the cached token expires, if one is cached.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.as_ref().map(|c| c.expires_at)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, servicegenius_config::SalesforceConfig};

    #[test]
    fn from_config_reports_missing_keys() {
        let config = SalesforceConfig {
            client_id: Some("id".into()),
            ..Default::default()
        };
        let err = ServiceAccountAuth::from_config(&config, reqwest::Client::new()).unwrap_err();
        match err {
            Error::MissingConfig(keys) => {
                assert!(keys.contains(&"client_secret".to_string()));
                assert!(!keys.contains(&"client_id".to_string()));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn freshness_honours_buffer() {
        let now = Utc::now();
        let cached = CachedToken {
            access_token: Secret::new("t".into()),
            instance_url: "https://x".into(),
            expires_at: now + Duration::minutes(10),
        };
        assert!(cached.is_fresh(now));
        assert!(cached.is_fresh(now + Duration::minutes(4)));
        assert!(!cached.is_fresh(now + Duration::minutes(5)));
        assert!(!cached.is_fresh(now + Duration::minutes(11)));
    }
}
