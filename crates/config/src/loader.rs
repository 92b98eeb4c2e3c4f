use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::ServiceGeniusConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "servicegenius.toml",
    "servicegenius.yaml",
    "servicegenius.yml",
    "servicegenius.json",
];

static CONFIG_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Use `dir` instead of the user-global config directory.
///
/// Only the first call takes effect; later calls are ignored.
pub fn set_config_dir(dir: PathBuf) {
    if CONFIG_DIR_OVERRIDE.set(dir).is_err() {
        warn!("config directory already set, ignoring override");
    }
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ServiceGeniusConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply environment
/// overrides.
///
/// Search order:
/// 1. `./servicegenius.{toml,yaml,yml,json}` (project-local)
/// 2. `<config dir>/servicegenius.{toml,yaml,yml,json}`
///
/// Falls back to `ServiceGeniusConfig::default()` if no file is found or the
/// file fails to parse.
pub fn discover_and_load() -> ServiceGeniusConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                ServiceGeniusConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        ServiceGeniusConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

/// Overlay well-known environment variables onto `config`.
pub fn apply_env_overrides(config: &mut ServiceGeniusConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Same as [`apply_env_overrides`] with a custom lookup, so tests don't touch
/// the process environment.
pub fn apply_env_overrides_with(
    config: &mut ServiceGeniusConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let lookup = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.jwt_secret = Secret::new(secret);
    }
    if let Some(flag) = lookup("SERVICEGENIUS_SECURE_COOKIES") {
        config.auth.secure_cookies = matches!(flag.as_str(), "1" | "true" | "yes");
    }

    let sf = &mut config.salesforce;
    if let Some(v) = lookup("SALESFORCE_CLIENT_ID") {
        sf.client_id = Some(v);
    }
    if let Some(v) = lookup("SALESFORCE_CLIENT_SECRET") {
        sf.client_secret = Some(Secret::new(v));
    }
    if let Some(v) = lookup("SALESFORCE_USERNAME") {
        sf.username = Some(v);
    }
    if let Some(v) = lookup("SALESFORCE_PASSWORD") {
        sf.password = Some(Secret::new(v));
    }
    if let Some(v) = lookup("SALESFORCE_SECURITY_TOKEN") {
        sf.security_token = Some(Secret::new(v));
    }
    if let Some(v) = lookup("SALESFORCE_LOGIN_URL") {
        sf.login_url = v;
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the config directory (override, else `~/.config/servicegenius/`).
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE.get() {
        return Some(dir.clone());
    }
    directories::ProjectDirs::from("", "", "servicegenius").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ServiceGeniusConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
