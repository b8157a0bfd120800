use super::Config;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;

/// A discovered `.proto` file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProtoFile {
    /// Absolute, cleaned path. Unique within one discovery run.
    pub path: Utf8PathBuf,

    /// Path relative to the work directory, for presentation only.
    pub display_path: Utf8PathBuf,
}

/// A group of proto files sharing one owning configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ProtoSet {
    /// Directory the operation was invoked from.
    pub work_dir_path: Utf8PathBuf,

    /// Directory the caller asked about. May be deeper than `config.dir_path`.
    pub dir_path: Utf8PathBuf,

    pub config: Config,

    /// Files keyed by the directory that directly contains them. Keys are in
    /// first-seen order; files within a key are in walk order.
    pub dir_path_to_files: IndexMap<Utf8PathBuf, Vec<ProtoFile>>,
}

impl ProtoSet {
    /// All files in this set.
    pub fn files(&self) -> impl Iterator<Item = &ProtoFile> {
        self.dir_path_to_files.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.dir_path_to_files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Directory of the owning configuration, empty when unconfigured.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config.dir_path
    }
}
