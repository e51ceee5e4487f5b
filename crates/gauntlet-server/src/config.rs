//! Server configuration loading from file and environment variables.

use gauntlet_engine::{ClassifierConfig, PressureConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pressure controller tuning.
    #[serde(default)]
    pub pressure: PressureConfig,

    /// Lexicon additions for the response classifier.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub scorecards: ScorecardConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// How long a request waits for a pooled connection before failing.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "gauntlet_engine=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Where finished scorecards go besides the database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScorecardConfig {
    /// Directory for `scorecard_<session>.json` exports. Disabled when unset.
    #[serde(default)]
    pub export_dir: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "gauntlet.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_acquire_timeout_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `GAUNTLET_HOST` overrides `server.host`
/// - `GAUNTLET_PORT` overrides `server.port`
/// - `GAUNTLET_DB_PATH` overrides `database.path`
/// - `GAUNTLET_LOG_LEVEL` overrides `logging.level`
/// - `GAUNTLET_LOG_JSON` overrides `logging.json` ("true" or "1" to enable)
/// - `GAUNTLET_SCORECARD_DIR` overrides `scorecards.export_dir`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if the pressure settings are out of range.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(host) = var("GAUNTLET_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("GAUNTLET_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("GAUNTLET_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("GAUNTLET_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("GAUNTLET_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(dir) = var("GAUNTLET_SCORECARD_DIR") {
        config.scorecards.export_dir = Some(dir).filter(|d| !d.trim().is_empty());
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let pressure = &config.pressure;
    if !(pressure.step.is_finite() && pressure.step > 0.0 && pressure.step <= 1.0) {
        return Err(ConfigError::Invalid(format!(
            "pressure.step must be in (0, 1], got {}",
            pressure.step
        )));
    }
    if !(0.0..=1.0).contains(&pressure.default_start) {
        return Err(ConfigError::Invalid(format!(
            "pressure.default_start must be in [0, 1], got {}",
            pressure.default_start
        )));
    }
    if config.database.pool_max_size == 0 {
        return Err(ConfigError::Invalid(
            "database.pool_max_size must be at least 1".to_string(),
        ));
    }
    if config.database.acquire_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "database.acquire_timeout_ms must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_without_file() {
        let config = load_config(Some("/nonexistent/gauntlet.toml")).expect("defaults");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "gauntlet.db");
        assert_eq!(config.pressure.step, 0.25);
        assert_eq!(config.pressure.default_start, 0.6);
        assert!(config.scorecards.export_dir.is_none());
    }

    #[test]
    fn toml_sections_are_parsed() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            path = "/var/lib/gauntlet.db"
            pool_max_size = 4

            [pressure]
            step = 0.2

            [classifier]
            extra_vague = ["ballpark"]

            [scorecards]
            export_dir = "exports"
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.pool_max_size, 4);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.database.acquire_timeout_ms, 30_000);
        assert_eq!(config.pressure.step, 0.2);
        assert_eq!(config.pressure.default_start, 0.6);
        assert_eq!(config.classifier.extra_vague, vec!["ballpark".to_string()]);
        assert_eq!(config.scorecards.export_dir.as_deref(), Some("exports"));
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("GAUNTLET_PORT", "9090"),
            ("GAUNTLET_HOST", "not-an-ip"),
            ("GAUNTLET_LOG_JSON", "1"),
            ("GAUNTLET_SCORECARD_DIR", "/tmp/cards"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, default_host());
        assert!(config.logging.json);
        assert_eq!(config.scorecards.export_dir.as_deref(), Some("/tmp/cards"));
    }

    #[test]
    fn out_of_range_pressure_is_rejected() {
        let mut config = Config::default();
        config.pressure.step = 0.0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.pressure.default_start = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let mut config = Config::default();
        config.database.acquire_timeout_ms = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }
}
