//! Configuration loader for vectorlab.
//!
//! Reads `config.toml` (by default `{config_dir}/vectorlab/config.toml`) and
//! deserializes it into [`AppConfig`]. Falls back to defaults when the file
//! is missing or malformed, then layers environment variables on top.

use std::path::{Path, PathBuf};

use vectorlab_types::config::AppConfig;
use vectorlab_types::error::ConfigError;

/// `{config_dir}/vectorlab/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vectorlab").join("config.toml"))
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply environment overrides using `lookup` (normally [`env_var`]).
///
/// Empty values are treated as unset.
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Some(host) = get("POSTGRES_HOST") {
        config.database.host = host;
    }
    if let Some(port) = get("POSTGRES_PORT") {
        config.database.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "POSTGRES_PORT".to_string(),
            message: format!("'{port}' is not a port number"),
        })?;
    }
    if let Some(user) = get("POSTGRES_USER") {
        config.database.user = user;
    }
    if let Some(password) = get("POSTGRES_PASSWORD") {
        config.database.password = password;
    }
    if let Some(database) = get("POSTGRES_DB") {
        config.database.database = database;
    }

    if let Some(host) = get("OLLAMA_HOST") {
        config.ollama.host = host;
    }
    if let Some(model) = get("OLLAMA_EMBED_MODEL") {
        config.ollama.embed_model = model;
    }
    if let Some(model) = get("OLLAMA_TITLE_MODEL") {
        config.ollama.title_model = model;
    }

    if let Some(key) = get("OPENROUTER_API_KEY") {
        config.openrouter.api_key = Some(key);
    }
    if let Some(backend) = get("VECTORLAB_EMBEDDING_BACKEND") {
        config.embedding.backend = backend.trim().parse()?;
    }

    if let Some(flag) = get("VECTORLAB_OTEL") {
        config.telemetry.enabled = matches!(flag.trim(), "1" | "true" | "yes" | "on");
    }
    if let Some(name) = get("OTEL_SERVICE_NAME") {
        config.telemetry.service_name = name;
    }

    Ok(())
}

/// Process environment lookup for [`apply_env_overrides`].
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Load from `path` (or the default location), apply the process
/// environment, and validate.
pub async fn resolve_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => load_config(&path).await,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, env_var)?;
    config.validate()?;
    Ok(config)
}
