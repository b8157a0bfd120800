//! Path normalization primitives.
//!
//! Every path handed to the discovery core is absolute and lexically cleaned,
//! so equality comparisons between walked paths, configuration directories and
//! exclude prefixes can be done component-wise without touching the disk.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::io;

/// Make `path` absolute against the current directory and clean it.
///
/// Symlinks are not resolved; this is purely lexical once the current
/// directory is known.
pub fn abs_clean(path: impl AsRef<Utf8Path>) -> io::Result<Utf8PathBuf> {
    let path = path.as_ref();
    if path.as_str().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty path cannot be made absolute",
        ));
    }
    if path.is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("current directory is not valid UTF-8: {}", e.as_path().display()),
        )
    })?;
    Ok(clean(&cwd.join(path)))
}

/// Lexically clean a path: drop `.` components, fold `..` into the preceding
/// component where possible, and never ascend above the root.
pub fn clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut kept: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match kept.last() {
                Some(Utf8Component::Normal(_)) => {
                    kept.pop();
                }
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => kept.push(component),
            },
            other => kept.push(other),
        }
    }

    if kept.is_empty() {
        return Utf8PathBuf::from(".");
    }

    let mut cleaned = Utf8PathBuf::new();
    for component in kept {
        cleaned.push(component.as_str());
    }
    cleaned
}

/// Path of `file` relative to `work_dir`, for presentation only.
///
/// Falls back to `file` itself when no relative path exists (e.g. different
/// drive prefixes on Windows).
pub fn display_path(work_dir: &Utf8Path, file: &Utf8Path) -> Utf8PathBuf {
    match pathdiff::diff_utf8_paths(file, work_dir) {
        Some(relative) => clean(&relative),
        None => file.to_path_buf(),
    }
}
