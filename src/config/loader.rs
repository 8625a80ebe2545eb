//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::mode::{Mode, ModeError};
use crate::config::schema::ServiceConfig;
use crate::lifecycle::timeout::GracefulTimeout;
use crate::observability::logging::LogLevel;

pub const ENV_SERVICE_NAME: &str = "SERVICE_NAME";
pub const ENV_SERVICE_VERSION: &str = "SERVICE_VERSION";
pub const ENV_CLOSER_GRACEFUL_TIMEOUT: &str = "CLOSER_GRACEFUL_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_MODE: &str = "MODE";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading TOML config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing TOML config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("reading ENV config {var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: ModeError,
    },
}

/// Load configuration from an optional TOML file, then the process environment.
///
/// Environment variables take precedence over file values; unset or empty
/// variables leave the file value in place.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading variables through `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_env(&mut config, lookup)?;

    tracing::debug!(
        service_name = %config.service_name,
        mode = %config.mode,
        "Configuration loaded"
    );
    Ok(config)
}

fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(name) = var(ENV_SERVICE_NAME) {
        config.service_name = name;
    }
    if let Some(version) = var(ENV_SERVICE_VERSION) {
        config.service_version = version;
    }
    if let Some(timeout) = var(ENV_CLOSER_GRACEFUL_TIMEOUT) {
        config.closer_graceful_timeout = GracefulTimeout::from(timeout);
    }
    if let Some(level) = var(ENV_LOG_LEVEL) {
        config.log_level = LogLevel::parse(&level);
    }
    if let Some(mode) = var(ENV_MODE) {
        config.mode = mode
            .parse::<Mode>()
            .map_err(|source| ConfigError::Env { var: ENV_MODE, source })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = load_config_with(None, env(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.mode, Mode::Prod);
        assert_eq!(config.closer_graceful_timeout.duration(), Duration::from_secs(5));
    }

    #[test]
    fn env_only() {
        let config = load_config_with(
            None,
            env(&[
                (ENV_SERVICE_NAME, "name env"),
                (ENV_MODE, "DEV"),
                (ENV_CLOSER_GRACEFUL_TIMEOUT, "6"),
                (ENV_LOG_LEVEL, "debug"),
            ]),
        )
        .unwrap();

        assert_eq!(config.service_name, "name env");
        assert_eq!(config.mode, Mode::Dev);
        assert_eq!(config.closer_graceful_timeout.as_str(), "6");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let lookup = env(&[(ENV_MODE, ""), (ENV_SERVICE_NAME, "")]);
        let config = load_config_with(None, lookup).unwrap();
        assert_eq!(config.mode, Mode::Prod);
        assert!(config.service_name.is_empty());
    }

    #[test]
    fn invalid_env_mode_is_rejected() {
        let err = load_config_with(None, env(&[(ENV_MODE, "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_MODE, .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let path = std::env::temp_dir().join("graceful-closer-missing-config.toml");
        let err = load_config_with(Some(path.as_path()), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
