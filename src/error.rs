use crate::config::ConfigError;
use camino::Utf8PathBuf;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by proto set discovery.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("could not resolve absolute path for {path:?}: {source}")]
    InputNormalization {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("error walking {path}: {source}")]
    WalkIo {
        path: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error(
        "walking the directory structure looking for proto files timed out after {budget:?} \
         and having seen {visited} files, are you sure you are operating in the right context?"
    )]
    WalkTimeout { budget: Duration, visited: usize },

    #[error("internal error: directory walk timed out but did not report the timeout")]
    InternalInconsistency,

    #[error("no proto files found for directory {0}")]
    NoFilesFound(Utf8PathBuf),

    #[error(
        "expected exactly one configuration file for directory {dir}, but found multiple in directories: {}",
        format_dirs(.config_dirs)
    )]
    AmbiguousConfiguration {
        dir: Utf8PathBuf,
        config_dirs: Vec<Utf8PathBuf>,
    },

    #[error("not a .proto file: {0}")]
    NotProtoFile(Utf8PathBuf),
}

impl DiscoveryError {
    pub(crate) fn input(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::InputNormalization {
            path: path.into(),
            source,
        }
    }
}

fn format_dirs(dirs: &[Utf8PathBuf]) -> String {
    let quoted: Vec<String> = dirs
        .iter()
        .map(|dir| {
            if dir.as_str().is_empty() {
                "<none>".to_string()
            } else {
                dir.to_string()
            }
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}
