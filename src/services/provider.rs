use crate::config::{ConfigProvider, FileConfigProvider, ResolverSettings};
use crate::error::DiscoveryError;
use crate::models::{ProtoFile, ProtoSet};
use crate::paths::{abs_clean, display_path};
use crate::services::grouping::group_proto_files;
use crate::services::walker::{PROTO_EXTENSION, ProtoWalker};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::sync::Arc;
use std::time::Duration;

/// Resolves proto sets for a directory or an explicit list of files.
///
/// # Usage
///
/// ```ignore
/// let provider = ProtoSetProvider::from_settings(&ResolverSettings::load()?);
/// let proto_set = provider.get_for_dir(".", "api/v1").await?;
/// for file in proto_set.files() {
///     println!("{}", file.display_path);
/// }
/// ```
///
/// When inline configuration data is set, it replaces every configuration
/// file for every call made through this provider.
#[derive(Clone)]
pub struct ProtoSetProvider {
    config_provider: Arc<dyn ConfigProvider>,
    walker: ProtoWalker,
    config_data: Option<String>,
}

impl ProtoSetProvider {
    /// Provider with the default walk timeout and no inline configuration.
    pub fn new(config_provider: Arc<dyn ConfigProvider>) -> Self {
        let walk_timeout = ResolverSettings::default().walk_timeout();
        Self {
            walker: ProtoWalker::new(Arc::clone(&config_provider), walk_timeout),
            config_provider,
            config_data: None,
        }
    }

    /// Provider reading configuration files from disk, configured by `settings`.
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        let provider = Self::new(Arc::new(FileConfigProvider::new()))
            .with_walk_timeout(settings.walk_timeout());
        match settings.config_data() {
            Some(data) => provider.with_config_data(data),
            None => provider,
        }
    }

    /// Use `data` in place of every configuration file. Empty data is ignored.
    pub fn with_config_data(mut self, data: impl Into<String>) -> Self {
        let data = data.into();
        self.config_data = (!data.is_empty()).then_some(data);
        self
    }

    /// Bound each directory walk by `walk_timeout`; zero means unbounded.
    pub fn with_walk_timeout(mut self, walk_timeout: Duration) -> Self {
        self.walker = ProtoWalker::new(Arc::clone(&self.config_provider), walk_timeout);
        self
    }

    pub fn walk_timeout(&self) -> Duration {
        self.walker.walk_timeout()
    }

    /// The single proto set governing `dir_path`.
    ///
    /// Fails when no proto files are found, or when the files found are owned
    /// by more than one configuration.
    pub async fn get_for_dir(
        &self,
        work_dir_path: impl AsRef<Utf8Path>,
        dir_path: impl AsRef<Utf8Path>,
    ) -> Result<ProtoSet, DiscoveryError> {
        let work_dir_path = normalize(work_dir_path.as_ref())?;
        let dir_path = normalize(dir_path.as_ref())?;

        let mut proto_sets = self.resolve_dir(&work_dir_path, &dir_path).await?;
        match proto_sets.len() {
            0 => Err(DiscoveryError::NoFilesFound(dir_path)),
            1 => Ok(proto_sets.remove(0)),
            _ => Err(DiscoveryError::AmbiguousConfiguration {
                dir: dir_path,
                config_dirs: proto_sets
                    .into_iter()
                    .map(|proto_set| proto_set.config.dir_path)
                    .collect(),
            }),
        }
    }

    /// Every proto set under the configuration governing `dir_path`.
    ///
    /// The walk starts at the owning configuration's directory rather than at
    /// `dir_path`, since a configuration governs its whole subtree. With
    /// inline configuration data the walk starts at `work_dir_path`.
    pub async fn get_multiple_for_dir(
        &self,
        work_dir_path: impl AsRef<Utf8Path>,
        dir_path: impl AsRef<Utf8Path>,
    ) -> Result<Vec<ProtoSet>, DiscoveryError> {
        let work_dir_path = normalize(work_dir_path.as_ref())?;
        let dir_path = normalize(dir_path.as_ref())?;
        self.resolve_dir(&work_dir_path, &dir_path).await
    }

    /// Proto sets for an explicit list of files, without walking.
    ///
    /// Duplicate paths are collapsed. Every resulting set has `dir_path` set
    /// to `work_dir_path`.
    pub fn get_for_files<P: AsRef<Utf8Path>>(
        &self,
        work_dir_path: impl AsRef<Utf8Path>,
        file_paths: &[P],
    ) -> Result<Vec<ProtoSet>, DiscoveryError> {
        let work_dir_path = normalize(work_dir_path.as_ref())?;

        let mut unique_paths = IndexSet::with_capacity(file_paths.len());
        for file_path in file_paths {
            let file_path = normalize(file_path.as_ref())?;
            if file_path.extension() != Some(PROTO_EXTENSION) {
                return Err(DiscoveryError::NotProtoFile(file_path));
            }
            unique_paths.insert(file_path);
        }

        let proto_files = unique_paths
            .into_iter()
            .map(|path| ProtoFile {
                display_path: display_path(&work_dir_path, &path),
                path,
            })
            .collect();

        let proto_sets = group_proto_files(
            self.config_provider.as_ref(),
            &work_dir_path,
            proto_files,
            self.config_data.as_deref(),
        )?;
        tracing::debug!(
            "Returning {} proto sets for {} files (work dir {})",
            proto_sets.len(),
            file_paths.len(),
            work_dir_path
        );
        Ok(proto_sets)
    }

    async fn resolve_dir(
        &self,
        work_dir_path: &Utf8Path,
        dir_path: &Utf8Path,
    ) -> Result<Vec<ProtoSet>, DiscoveryError> {
        let config_data = self.config_data.as_deref();
        let scan_root = match config_data {
            Some(_) => work_dir_path.to_path_buf(),
            None => self.scan_root_for_dir(dir_path)?,
        };
        tracing::debug!("Resolving proto sets for {} from scan root {}", dir_path, scan_root);

        let proto_files = self.walker.walk(work_dir_path, &scan_root, config_data).await?;
        let mut proto_sets = group_proto_files(
            self.config_provider.as_ref(),
            work_dir_path,
            proto_files,
            config_data,
        )?;
        for proto_set in &mut proto_sets {
            proto_set.work_dir_path = work_dir_path.to_path_buf();
            proto_set.dir_path = dir_path.to_path_buf();
        }

        tracing::debug!(
            "Returning {} proto sets for {} (work dir {})",
            proto_sets.len(),
            dir_path,
            work_dir_path
        );
        Ok(proto_sets)
    }

    /// The owning configuration's directory, or `dir_path` when unconfigured.
    fn scan_root_for_dir(&self, dir_path: &Utf8Path) -> Result<Utf8PathBuf, DiscoveryError> {
        let scan_root = self
            .config_provider
            .file_path_for_dir(dir_path)?
            .as_deref()
            .and_then(Utf8Path::parent)
            .map_or_else(|| dir_path.to_path_buf(), Utf8Path::to_path_buf);
        Ok(scan_root)
    }
}

fn normalize(path: &Utf8Path) -> Result<Utf8PathBuf, DiscoveryError> {
    abs_clean(path).map_err(|source| DiscoveryError::input(path.as_str(), source))
}
