use crate::core::{ConflictScope, DEFAULT_LOOKBACK_DAYS, DEFAULT_RECENT_ENCOUNTER_LIMIT};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub pairing: PairingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

/// Tuning of the auto-match engine
#[derive(Debug, Clone, Deserialize)]
pub struct PairingSettings {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_recent_encounter_limit")]
    pub recent_encounter_limit: usize,
    /// Requests with more distinct participants are rejected
    #[serde(default = "default_max_participants")]
    pub max_participants: usize,
    #[serde(default)]
    pub conflict_scope: ConflictScope,
    /// Fixed tie-break seed; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            recent_encounter_limit: default_recent_encounter_limit(),
            max_participants: default_max_participants(),
            conflict_scope: ConflictScope::default(),
            seed: None,
        }
    }
}

fn default_lookback_days() -> u32 { DEFAULT_LOOKBACK_DAYS }
fn default_recent_encounter_limit() -> usize { DEFAULT_RECENT_ENCOUNTER_LIMIT }
fn default_max_participants() -> usize { 64 }

/// Layout of the `tracing_subscriber::fmt` output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Full,
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with KARUTA)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., KARUTA__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("KARUTA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// `DATABASE_URL` takes precedence over every other source
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
