// protoset - discovers .proto files and partitions them by owning configuration
//
// This is the library crate containing the discovery core and its data structures.
// The binary crate (main.rs) provides a small command-line entry point.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod paths;
pub mod services;

// Re-export commonly used types for convenience
pub use crate::config::{ConfigError, ConfigProvider, FileConfigProvider, ResolverSettings};
pub use crate::error::DiscoveryError;
pub use crate::models::{Config, ProtoFile, ProtoSet};
pub use crate::services::ProtoSetProvider;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
