//! Data models for proto set discovery.
//!
//! - [`ProtoFile`]: one discovered `.proto` file (absolute path + display path)
//! - [`ProtoSet`]: files grouped under one owning configuration
//! - [`Config`]: resolved configuration, produced from an on-disk
//!   [`ExternalConfig`] or from inline configuration data
//!
//! All of these are plain values: built fresh per discovery call and never
//! mutated after being handed to the caller.

pub mod config;
pub mod proto_set;

pub use self::config::{
    CompileConfig, Config, ExternalConfig, ExternalGenPlugin, ExternalGenerateConfig,
    ExternalLintConfig, ExternalLintRules, ExternalProtocConfig, GenPlugin, GenerateConfig,
    LintConfig,
};
pub use proto_set::{ProtoFile, ProtoSet};
