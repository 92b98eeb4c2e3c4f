//! Salesforce OAuth 2.0 username-password grant.

pub mod error;
pub mod flow;
pub mod types;

pub use {
    error::{Error, Result},
    flow::{FALLBACK_TOKEN_LIFETIME_SECS, PasswordFlow, token_expiry},
    types::{PasswordGrant, SalesforceIdentity, SalesforceTokens},
};
