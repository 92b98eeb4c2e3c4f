use std::sync::Arc;

use {
    secrecy::Secret,
    servicegenius_auth::User,
};

use crate::{Error, Result, service_account::ServiceAccountAuth};

/// Bearer token plus the org instance it is valid for.
#[derive(Clone)]
pub struct BearerCredential {
    pub access_token: Secret<String>,
    pub instance_url: String,
}

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerCredential")
            .field("access_token", &"[REDACTED]")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Where a request's Salesforce credential comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Token captured at login and embedded in the caller's session.
    PerUser(BearerCredential),
    /// The shared service account, authenticated lazily and refreshed on expiry.
    ServiceAccount(Arc<ServiceAccountAuth>),
    /// No service account is configured; lists the missing settings.
    Unconfigured(Vec<String>),
}

impl CredentialSource {
    /// The session user's own credential when it carries one, else `fallback`.
    pub fn for_user(user: Option<&User>, fallback: &CredentialSource) -> Self {
        match user.and_then(User::salesforce_credential) {
            Some((token, instance_url)) => Self::PerUser(BearerCredential {
                access_token: Secret::new(token.to_string()),
                instance_url: instance_url.to_string(),
            }),
            None => fallback.clone(),
        }
    }

    pub async fn resolve(&self) -> Result<BearerCredential> {
        match self {
            Self::PerUser(credential) => Ok(credential.clone()),
            Self::ServiceAccount(auth) => auth.grant().await,
            Self::Unconfigured(missing) => Err(Error::MissingConfig(missing.clone())),
        }
    }

    pub fn is_per_user(&self) -> bool {
        matches!(self, Self::PerUser(_))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret, servicegenius_auth::Role};

    fn salesforce_user() -> User {
        User {
            id: "005xx".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Manager,
            salesforce_token: Some("00D!user".into()),
            salesforce_instance_url: Some("https://ada.my.salesforce.com".into()),
        }
    }

    #[tokio::test]
    async fn user_token_wins_over_fallback() {
        let fallback = CredentialSource::Unconfigured(vec!["client_id".into()]);
        let user = salesforce_user();
        let source = CredentialSource::for_user(Some(&user), &fallback);
        assert!(source.is_per_user());

        let credential = source.resolve().await.unwrap();
        assert_eq!(credential.access_token.expose_secret(), "00D!user");
        assert_eq!(credential.instance_url, "https://ada.my.salesforce.com");
    }

    #[tokio::test]
    async fn demo_user_uses_fallback() {
        let fallback = CredentialSource::Unconfigured(vec!["client_id".into()]);
        let demo = User::demo();
        let source = CredentialSource::for_user(Some(&demo), &fallback);
        assert!(!source.is_per_user());

        let err = source.resolve().await.unwrap_err();
        assert!(matches!(err, Error::MissingConfig(keys) if keys == vec!["client_id".to_string()]));
    }

    #[test]
    fn debug_redacts_token() {
        let credential = BearerCredential {
            access_token: Secret::new("00D!user".into()),
            instance_url: "https://x".into(),
        };
        assert!(!format!("{credential:?}").contains("00D!user"));
    }
}
