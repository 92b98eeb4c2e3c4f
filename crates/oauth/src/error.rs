use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The token endpoint answered with a non-success status.
    #[error("Salesforce authentication failed: {}", auth_reason(.code, .description))]
    Authentication {
        status: u16,
        code: Option<String>,
        description: Option<String>,
    },

    /// The identity endpoint answered with a non-success status.
    #[error("Salesforce identity request failed with status {status}")]
    Identity { status: u16 },

    #[error("Salesforce request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),
}

fn auth_reason<'a>(code: &'a Option<String>, description: &'a Option<String>) -> &'a str {
    description
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(code.as_deref().filter(|c| !c.is_empty()))
        .unwrap_or("Unknown error")
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_description_then_code() {
        let err = Error::Authentication {
            status: 400,
            code: Some("invalid_grant".into()),
            description: Some("authentication failure".into()),
        };
        assert_eq!(
            err.to_string(),
            "Salesforce authentication failed: authentication failure"
        );

        let err = Error::Authentication {
            status: 400,
            code: Some("invalid_client_id".into()),
            description: None,
        };
        assert_eq!(
            err.to_string(),
            "Salesforce authentication failed: invalid_client_id"
        );

        let err = Error::Authentication {
            status: 500,
            code: None,
            description: None,
        };
        assert_eq!(err.to_string(), "Salesforce authentication failed: Unknown error");
    }
}
