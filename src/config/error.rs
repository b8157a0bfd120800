use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors from locating, reading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to check for configuration file {path}: {source}")]
    Lookup {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("multiple configuration files in {dir}: {}", .files.join(", "))]
    MultipleConfigFiles { dir: Utf8PathBuf, files: Vec<String> },

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{field} entry {value:?} in configuration for {dir} must be a relative path")]
    AbsolutePath {
        dir: Utf8PathBuf,
        field: &'static str,
        value: String,
    },

    #[error("exclude {value:?} in configuration for {dir} must name a path beneath {dir}")]
    ExcludeOutsideConfigDir { dir: Utf8PathBuf, value: String },

    #[error("lint rule {rule} in configuration for {dir} is both added and removed")]
    ConflictingLintRule { dir: Utf8PathBuf, rule: String },

    #[error("generate plugin in configuration for {dir} has an empty name")]
    InvalidPlugin { dir: Utf8PathBuf },

    #[error("invalid resolver settings: {0}")]
    Settings(#[from] ::config::ConfigError),
}
