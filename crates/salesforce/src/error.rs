use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Service-account settings are absent, so there is no shared credential.
    #[error("Missing Salesforce configuration: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error(transparent)]
    Auth(#[from] servicegenius_oauth::Error),

    /// Salesforce answered a REST call with a non-success status.
    #[error("Salesforce API error: {status} {status_text}")]
    Api { status: u16, status_text: String },

    #[error("Salesforce request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected Salesforce response: {0}")]
    Decode(String),

    /// Salesforce accepted the request but reported `success: false`.
    #[error("{0}")]
    OperationFailed(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Status of the failed upstream REST call, if that is what failed.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_lists_keys() {
        let err = Error::MissingConfig(vec!["client_id".into(), "password".into()]);
        assert_eq!(
            err.to_string(),
            "Missing Salesforce configuration: client_id, password"
        );
    }

    #[test]
    fn api_error_keeps_status() {
        let err = Error::Api {
            status: 404,
            status_text: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Salesforce API error: 404 Not Found");
        assert_eq!(err.upstream_status(), Some(404));
        assert_eq!(Error::InvalidInput("x".into()).upstream_status(), None);
    }
}
