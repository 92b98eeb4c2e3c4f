//! Signed session tokens.
//!
//! A session is an HS256 JWT whose payload embeds the full [`User`]. Nothing
//! is stored server-side: a token is valid exactly as long as its signature
//! verifies and `exp` has not passed.

use {
    chrono::{DateTime, Duration, Utc},
    jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{Error, Result, user::User};

/// Default session lifetime.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    user: User,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &Secret<String>, ttl: Duration) -> Result<Self> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.is_empty() {
            return Err(Error::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        })
    }

    /// Session lifetime applied by [`sign`](Self::sign).
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user`, valid from now for the configured lifetime.
    pub fn sign(&self, user: &User) -> Result<String> {
        self.sign_at(user, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`.
    pub fn sign_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = SessionClaims {
            user: user.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(Error::Sign)
    }

    /// Return the embedded user, or `None` for a tampered, expired or
    /// malformed token.
    pub fn verify(&self, token: &str) -> Option<User> {
        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims.user),
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            },
        }
    }
}
