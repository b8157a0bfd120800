use super::ConfigError;
use ::config::Environment;
use serde::Deserialize;
use std::time::Duration;

/// Default bound on a single directory walk.
pub const DEFAULT_WALK_TIMEOUT_MS: u64 = 3000;

/// Runtime settings for the proto set resolver.
///
/// Loaded from `PROTOSET_*` environment variables layered over defaults:
/// - `PROTOSET_WALK_TIMEOUT_MS`: walk bound in milliseconds, `0` disables it
/// - `PROTOSET_CONFIG_DATA`: inline configuration overriding every config file
/// - `PROTOSET_DEBUG`: debug-level logging
/// - `PROTOSET_LOG_DIR`: directory for rolling log files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_walk_timeout_ms")]
    pub walk_timeout_ms: u64,

    #[serde(default)]
    pub config_data: Option<String>,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            walk_timeout_ms: DEFAULT_WALK_TIMEOUT_MS,
            config_data: None,
            debug: false,
            log_dir: None,
        }
    }
}

fn default_walk_timeout_ms() -> u64 {
    DEFAULT_WALK_TIMEOUT_MS
}

impl ResolverSettings {
    /// Load settings from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix("PROTOSET"))
    }

    /// Load settings from the given environment source.
    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .set_default("walk_timeout_ms", DEFAULT_WALK_TIMEOUT_MS as i64)?
            .set_default("debug", false)?
            .add_source(environment.try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn walk_timeout(&self) -> Duration {
        Duration::from_millis(self.walk_timeout_ms)
    }

    /// Inline configuration data, if any was given and it is non-empty.
    pub fn config_data(&self) -> Option<&str> {
        self.config_data.as_deref().filter(|data| !data.is_empty())
    }
}
