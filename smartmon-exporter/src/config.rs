//! Exporter configuration
//!
//! Optional YAML file (path from `SMARTMON_EXPORTER_CONFIG`, default
//! `smartmon.yaml`), then `SMARTMON_*` environment overrides. A missing or
//! empty file means defaults.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

pub const CONFIG_PATH_ENV: &str = "SMARTMON_EXPORTER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "smartmon.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid listen_address `{value}`")]
    Address {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid {key} `{value}`")]
    Duration {
        key: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("poll_interval must be greater than zero")]
    ZeroInterval,
    #[error("invalid log_level `{0}`")]
    LogLevel(String),
}

/// Fichier YAML tel qu'écrit, toutes les clés optionnelles
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    listen_address: Option<String>,
    poll_interval: Option<String>,
    smartctl_path: Option<String>,
    probe_timeout: Option<String>,
    log_level: Option<String>,
}

impl RawConfig {
    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        let overrides: [(&str, &mut Option<String>); 5] = [
            ("SMARTMON_LISTEN_ADDRESS", &mut self.listen_address),
            ("SMARTMON_POLL_INTERVAL", &mut self.poll_interval),
            ("SMARTMON_SMARTCTL_PATH", &mut self.smartctl_path),
            ("SMARTMON_PROBE_TIMEOUT", &mut self.probe_timeout),
            ("SMARTMON_LOG_LEVEL", &mut self.log_level),
        ];
        for (key, slot) in overrides {
            if let Some(value) = env(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub poll_interval: Duration,
    pub smartctl_path: String,
    pub probe_timeout: Option<Duration>,
    pub log_level: Level,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from(([0, 0, 0, 0], 9101)),
            poll_interval: smartmon_core::DEFAULT_POLL_INTERVAL,
            smartctl_path: "smartctl".into(),
            probe_timeout: None,
            log_level: Level::DEBUG,
        }
    }
}

/// Résultat du chargement: la config et le fichier lu, s'il y en avait un
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ExporterConfig,
    pub source: Option<PathBuf>,
}

/// Charge la config depuis le process (fichier + variables d'environnement)
pub fn load() -> Result<LoadedConfig, ConfigError> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    load_from(Path::new(&path), &|key| std::env::var(key).ok())
}

pub fn load_from(path: &Path, env: &dyn Fn(&str) -> Option<String>) -> Result<LoadedConfig, ConfigError> {
    let (mut raw, source) = if path.exists() {
        let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = if txt.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(&txt).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };
        (raw, Some(path.to_path_buf()))
    } else {
        (RawConfig::default(), None)
    };
    raw.apply_env(env);

    Ok(LoadedConfig {
        config: resolve(raw)?,
        source,
    })
}

fn resolve(raw: RawConfig) -> Result<ExporterConfig, ConfigError> {
    let mut config = ExporterConfig::default();

    if let Some(value) = raw.listen_address {
        config.listen_address = value
            .parse()
            .map_err(|source| ConfigError::Address { value, source })?;
    }
    if let Some(value) = raw.poll_interval {
        config.poll_interval = parse_duration("poll_interval", value)?;
        if config.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
    }
    if let Some(value) = raw.smartctl_path {
        config.smartctl_path = value;
    }
    if let Some(value) = raw.probe_timeout {
        config.probe_timeout = Some(parse_duration("probe_timeout", value)?);
    }
    if let Some(value) = raw.log_level {
        config.log_level = value.trim().parse().map_err(|_| ConfigError::LogLevel(value))?;
    }
    Ok(config)
}

fn parse_duration(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|source| ConfigError::Duration { key, value, source })
}
