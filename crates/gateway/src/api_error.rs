use {
    axum::{
        Json,
        extract::{
            Query,
            rejection::{JsonRejection, QueryRejection},
        },
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    servicegenius_config::ErrorMapping,
    tracing::{debug, error},
};

/// JSON error response: `{"error": "<message>"}` with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Not authorized")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Salesforce could not be reached; clients fall back to sample data.
    pub fn salesforce_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Salesforce connection not available",
        )
    }

    /// Translate a facade failure under `policy`, logging the cause.
    ///
    /// `message` is the route's generic failure text ("Failed to fetch
    /// agents"). Under [`ErrorMapping::Typed`], invalid input keeps its own
    /// message as a 400 and upstream 400/404 keep their status.
    pub fn from_facade(
        policy: ErrorMapping,
        err: &servicegenius_salesforce::Error,
        message: &str,
    ) -> Self {
        error!(error = %err, "{message}");
        match policy {
            ErrorMapping::Generic => Self::internal(message),
            ErrorMapping::Typed => match err {
                servicegenius_salesforce::Error::InvalidInput(reason) => Self::bad_request(reason),
                _ => match err.upstream_status() {
                    Some(404) => Self::new(StatusCode::NOT_FOUND, message),
                    Some(400) => Self::bad_request(message),
                    _ => Self::internal(message),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Unwrap a JSON body, turning a rejection into a 400 carrying `message`.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(error = %rejection, "rejected request body");
            Err(ApiError::bad_request(message))
        },
    }
}

/// Message for a query string that does not fit the route's parameters.
pub const INVALID_QUERY: &str = "Invalid query parameters";

/// Unwrap query parameters, turning a rejection into a JSON 400.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => {
            debug!(error = %rejection, "rejected query string");
            Err(ApiError::bad_request(INVALID_QUERY))
        },
    }
}

#[cfg(test)]
mod tests {
    use {super::*, servicegenius_salesforce::Error};

    fn not_found() -> Error {
        Error::Api {
            status: 404,
            status_text: "Not Found".into(),
        }
    }

    #[test]
    fn generic_policy_is_always_500() {
        for err in [not_found(), Error::InvalidInput("Agent ID is required for update".into())] {
            let api = ApiError::from_facade(ErrorMapping::Generic, &err, "Failed to fetch agent");
            assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api.message, "Failed to fetch agent");
        }
    }

    #[test]
    fn typed_policy_keeps_client_errors() {
        let api = ApiError::from_facade(ErrorMapping::Typed, &not_found(), "Failed to fetch agent");
        assert_eq!(api.status, StatusCode::NOT_FOUND);

        let api = ApiError::from_facade(
            ErrorMapping::Typed,
            &Error::InvalidInput("Agent ID is required for update".into()),
            "Failed to update agent",
        );
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Agent ID is required for update");

        let api = ApiError::from_facade(
            ErrorMapping::Typed,
            &Error::MissingConfig(vec!["client_id".into()]),
            "Failed to fetch agents",
        );
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
