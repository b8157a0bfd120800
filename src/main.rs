//! protoset - prints the proto sets governing a directory.
//!
//! # Usage
//!
//! ```text
//! protoset [DIR]
//! ```
//!
//! Resolves `DIR` (default `.`) relative to the current directory, walks the
//! tree of the configuration file owning it, and prints every resulting proto
//! set as YAML on stdout. Logs go to stderr.
//!
//! # Settings
//!
//! Read from the environment (see [`ResolverSettings`]):
//! - `PROTOSET_WALK_TIMEOUT_MS`: walk bound, `0` for none (default 3000)
//! - `PROTOSET_CONFIG_DATA`: inline configuration replacing every config file
//! - `PROTOSET_DEBUG`: debug logging
//! - `PROTOSET_LOG_DIR`: also write rolling log files here

use anyhow::{Context, Result};
use protoset::{APP_NAME, ProtoSetProvider, ResolverSettings, VERSION};

fn main() -> Result<()> {
    let settings = ResolverSettings::load().context("Failed to load PROTOSET_* settings")?;

    let _guard = protoset::logging::setup_logging_with_console(
        settings.log_dir.as_deref(),
        APP_NAME,
        settings.debug,
    )?;

    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    // The walk runs on the blocking pool; two workers are plenty for one call
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("protoset-worker")
        .build()
        .context("Failed to start tokio runtime")?;

    let provider = ProtoSetProvider::from_settings(&settings);
    let proto_sets = runtime
        .block_on(provider.get_multiple_for_dir(".", &dir))
        .with_context(|| format!("Failed to resolve proto sets for {}", dir))?;

    tracing::info!("Found {} proto sets under {}", proto_sets.len(), dir);

    let yaml = serde_yaml_ng::to_string(&proto_sets).context("Failed to serialize proto sets")?;
    print!("{}", yaml);

    Ok(())
}
