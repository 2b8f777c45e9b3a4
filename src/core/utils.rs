use std::path::{Component, Path, PathBuf};

use anyhow::Context;

use crate::core::Result;

/// Lexically normalizes `path`: drops `.` components, folds `..` into its parent and
/// removes trailing separators. Never touches the host filesystem.
/// A `..` above the top of the path is dropped, so `/..` becomes `/`.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            _ => result.push(component),
        }
    }
    result
}

/// Checks whether `path` lies inside `root` (or is `root` itself) after lexical normalization.
pub fn is_within<P: AsRef<Path>, R: AsRef<Path>>(path: P, root: R) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Resolves `path` the way `abspath` does: joins relative paths onto `base` and normalizes.
pub fn absolutize<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> PathBuf {
    normalize(base.as_ref().join(path))
}

/// Final component of `path` as an owned string, or the whole path when it has none.
pub fn base_name<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Removes a host file or directory (recursively).
pub fn rm_on_host<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("unable to remove directory {}", path.display()))?;
    } else {
        std::fs::remove_file(path)
            .with_context(|| format!("unable to remove file {}", path.display()))?;
    }
    Ok(())
}
