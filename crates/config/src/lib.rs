//! Configuration loading, env substitution, env overrides and validation.
//!
//! Config files: `servicegenius.toml`, `servicegenius.yaml`, or `servicegenius.json`
//! Searched in `./` then `~/.config/servicegenius/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, apply_env_overrides_with, config_dir, discover_and_load,
        find_config_file, load_config, set_config_dir,
    },
    schema::{
        ApiConfig, AuthConfig, DEFAULT_API_VERSION, DEFAULT_JWT_SECRET, DEFAULT_LOGIN_URL,
        ErrorMapping, SalesforceConfig, ServerConfig, ServiceGeniusConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
