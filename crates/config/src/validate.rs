//! Semantic checks over a loaded configuration.
//!
//! Parsing already rejects malformed files; these diagnostics flag settings
//! that parse fine but will misbehave at runtime.

use crate::schema::ServiceGeniusConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "salesforce.login_url"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
pub fn validate(config: &ServiceGeniusConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.auth.uses_default_secret() {
        result.push(
            Severity::Warning,
            "auth.jwt_secret",
            "using the built-in default secret; set JWT_SECRET before exposing the gateway",
        );
    }
    if config.auth.session_ttl_hours == 0 {
        result.push(
            Severity::Error,
            "auth.session_ttl_hours",
            "session lifetime must be at least one hour",
        );
    }

    let missing = config.salesforce.missing_service_account_keys();
    if !missing.is_empty() {
        result.push(
            Severity::Warning,
            "salesforce",
            format!(
                "service account disabled, missing: {}",
                missing.join(", ")
            ),
        );
    }

    if let Err(e) = url::Url::parse(&config.salesforce.login_url) {
        result.push(
            Severity::Error,
            "salesforce.login_url",
            format!("invalid URL: {e}"),
        );
    }

    result
}
