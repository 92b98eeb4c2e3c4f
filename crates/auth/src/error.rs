use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to sign session token")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("session secret must not be empty")]
    InvalidSecret,
}

pub type Result<T> = std::result::Result<T, Error>;
