use crate::config::ConfigProvider;
use crate::error::DiscoveryError;
use crate::metrics::WalkMetrics;
use crate::models::ProtoFile;
use crate::paths::display_path;
use crate::services::exclude::is_excluded;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::timeout;
use walkdir::WalkDir;

/// Extension of the files collected by the walk.
pub const PROTO_EXTENSION: &str = "proto";

type WalkResult = Result<Vec<ProtoFile>, DiscoveryError>;

/// Collects `.proto` files beneath a directory within a time budget.
///
/// The walk itself is synchronous and runs on tokio's blocking pool. The
/// caller waits on it with a deadline; when the deadline passes, the walk is
/// told so through a shared flag and fails on the next entry it visits. The
/// caller always joins the walk task before returning.
#[derive(Clone)]
pub struct ProtoWalker {
    config_provider: Arc<dyn ConfigProvider>,
    walk_timeout: Duration,
}

impl ProtoWalker {
    /// A zero `walk_timeout` means the walk is not bounded.
    pub fn new(config_provider: Arc<dyn ConfigProvider>, walk_timeout: Duration) -> Self {
        Self {
            config_provider,
            walk_timeout,
        }
    }

    pub fn walk_timeout(&self) -> Duration {
        self.walk_timeout
    }

    /// Collect the `.proto` files nested under `dir_path`.
    ///
    /// `dir_path` is where the walk starts and the boundary for exclude
    /// matching; `work_dir_path` is only used to compute display paths. Both
    /// must be absolute and cleaned.
    ///
    /// With `config_data`, excludes come from that data alone and are computed
    /// once up front. Without it, every directory visited adds the excludes of
    /// its nearest configuration file to the running set before it is tested.
    pub async fn walk(
        &self,
        work_dir_path: &Utf8Path,
        dir_path: &Utf8Path,
        config_data: Option<&str>,
    ) -> WalkResult {
        let mut excludes = HashSet::new();
        if let Some(data) = config_data {
            excludes.extend(
                self.config_provider
                    .exclude_prefixes_for_data(work_dir_path, data)?,
            );
        }

        let metrics = Arc::new(WalkMetrics::new());
        let timed_out = Arc::new(AtomicBool::new(false));
        let job = WalkJob {
            config_provider: Arc::clone(&self.config_provider),
            work_dir_path: work_dir_path.to_path_buf(),
            root: dir_path.to_path_buf(),
            excludes,
            accumulate_excludes: config_data.is_none(),
            budget: self.walk_timeout,
            metrics: Arc::clone(&metrics),
            timed_out: Arc::clone(&timed_out),
        };

        tracing::debug!("Walking {} for proto files", dir_path);
        let mut handle = tokio::task::spawn_blocking(move || job.run());

        let result = if self.walk_timeout.is_zero() {
            finish(handle.await)
        } else {
            match timeout(self.walk_timeout, &mut handle).await {
                Ok(joined) => finish(joined),
                Err(_) => {
                    timed_out.store(true, Ordering::Relaxed);
                    tracing::warn!(
                        "Walk of {} timed out after {:?} with {} entries visited",
                        dir_path,
                        self.walk_timeout,
                        metrics.visited()
                    );
                    self.drain_after_timeout(handle.await)
                }
            }
        };

        metrics.log_summary();
        result
    }

    /// Resolve the joined walk once the deadline has already passed.
    ///
    /// A walk error is returned as is; normally it is the walk's own timeout
    /// error raised on the entry after the deadline. A walk that completed
    /// anyway, or a task that could not be joined, is an internal error.
    fn drain_after_timeout(&self, joined: Result<WalkResult, JoinError>) -> WalkResult {
        match joined {
            Ok(Err(err)) => Err(err),
            Ok(Ok(files)) => {
                tracing::error!(
                    "Walk completed with {} files after timing out without reporting it",
                    files.len()
                );
                Err(DiscoveryError::InternalInconsistency)
            }
            Err(join_err) => {
                tracing::error!("Walk task failed after timeout: {}", join_err);
                Err(DiscoveryError::InternalInconsistency)
            }
        }
    }
}

fn finish(joined: Result<WalkResult, JoinError>) -> WalkResult {
    match joined {
        Ok(result) => result,
        Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
        Err(join_err) => {
            tracing::error!("Walk task was cancelled: {}", join_err);
            Err(DiscoveryError::InternalInconsistency)
        }
    }
}

/// State owned by the blocking walk task.
struct WalkJob {
    config_provider: Arc<dyn ConfigProvider>,
    work_dir_path: Utf8PathBuf,
    root: Utf8PathBuf,
    excludes: HashSet<Utf8PathBuf>,
    accumulate_excludes: bool,
    budget: Duration,
    metrics: Arc<WalkMetrics>,
    timed_out: Arc<AtomicBool>,
}

impl WalkJob {
    fn run(mut self) -> WalkResult {
        let mut proto_files = Vec::new();
        let mut entries = WalkDir::new(&self.root).sort_by_file_name().into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry.map_err(|source| DiscoveryError::WalkIo {
                path: source
                    .path()
                    .and_then(Utf8Path::from_path)
                    .map_or_else(|| self.root.clone(), Utf8Path::to_path_buf),
                source,
            })?;

            let visited = self.metrics.record_entry();
            if self.timed_out.load(Ordering::Relaxed) {
                return Err(DiscoveryError::WalkTimeout {
                    budget: self.budget,
                    visited,
                });
            }

            let is_dir = entry.file_type().is_dir();
            let path =
                Utf8PathBuf::from_path_buf(entry.into_path()).map_err(DiscoveryError::NonUtf8Path)?;

            if is_dir {
                if self.accumulate_excludes {
                    for exclude in self.config_provider.exclude_prefixes_for_dir(&path)? {
                        if !self.excludes.contains(&exclude) {
                            tracing::debug!("Adding exclude prefix {} (from {})", exclude, path);
                            self.excludes.insert(exclude);
                        }
                    }
                }
                if is_excluded(&path, &self.root, &self.excludes) {
                    tracing::debug!("Skipping excluded directory {}", path);
                    self.metrics.record_dir_pruned();
                    entries.skip_current_dir();
                }
                continue;
            }

            if path.extension() != Some(PROTO_EXTENSION) {
                continue;
            }
            if is_excluded(&path, &self.root, &self.excludes) {
                self.metrics.record_file_excluded();
                continue;
            }

            let display_path = display_path(&self.work_dir_path, &path);
            self.metrics.record_file_matched();
            proto_files.push(ProtoFile { path, display_path });
        }

        Ok(proto_files)
    }
}
