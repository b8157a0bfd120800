// Walk metrics module
//
// Counters for a single directory walk, shared between the walk task and the
// caller waiting on it

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Per-walk counters
///
/// Uses atomic operations so the waiting caller can read the visited count
/// while the walk task is still running (e.g. to report it on timeout).
#[derive(Debug)]
pub struct WalkMetrics {
    /// Every entry the walk has been handed, files and directories alike
    pub entries_visited: AtomicUsize,

    /// Directories skipped along with their subtree
    pub dirs_pruned: AtomicUsize,

    /// `.proto` files dropped by a file-level exclude
    pub files_excluded: AtomicUsize,

    /// `.proto` files recorded
    pub files_matched: AtomicUsize,

    start_time: Instant,
}

impl WalkMetrics {
    pub fn new() -> Self {
        Self {
            entries_visited: AtomicUsize::new(0),
            dirs_pruned: AtomicUsize::new(0),
            files_excluded: AtomicUsize::new(0),
            files_matched: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a visited entry, returning the new total
    pub fn record_entry(&self) -> usize {
        self.entries_visited.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_dir_pruned(&self) {
        self.dirs_pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_excluded(&self) {
        self.files_excluded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_matched(&self) {
        self.files_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn visited(&self) -> usize {
        self.entries_visited.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::debug!(
            "Walk finished in {:.2}ms: {} entries visited, {} dirs pruned, {} files excluded, {} files matched",
            self.elapsed().as_secs_f64() * 1000.0,
            self.visited(),
            self.dirs_pruned.load(Ordering::Relaxed),
            self.files_excluded.load(Ordering::Relaxed),
            self.files_matched.load(Ordering::Relaxed)
        );
    }
}

impl Default for WalkMetrics {
    fn default() -> Self {
        Self::new()
    }
}
