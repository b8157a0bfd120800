use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;

/// Whether `path` lies at or beneath any of `excludes`, looking no higher than
/// `stop_path`.
///
/// All paths are expected to be absolute and cleaned. For each exclude the
/// check walks from `path` up through its parents and matches if it reaches
/// the exclude before reaching `stop_path` or the filesystem root. The root is
/// a fallback so that a `stop_path` that is not an ancestor of `path` cannot
/// make the ascent run forever. `stop_path` itself never matches.
pub fn is_excluded(path: &Utf8Path, stop_path: &Utf8Path, excludes: &HashSet<Utf8PathBuf>) -> bool {
    excludes
        .iter()
        .any(|exclude| is_nested(path, stop_path, exclude))
}

fn is_nested(path: &Utf8Path, stop_path: &Utf8Path, exclude: &Utf8Path) -> bool {
    let mut current = Some(path);
    while let Some(curr) = current {
        // The root has no parent.
        if curr == stop_path || curr.parent().is_none() {
            return false;
        }
        if curr == exclude {
            return true;
        }
        current = curr.parent();
    }
    false
}
