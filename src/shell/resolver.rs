//! Turns user-supplied names into absolute host paths.
//!
//! Source-side names are joined onto the cursor and must stay inside the sandbox root.
//! Copy/move destinations are ordinary filesystem paths: they are made absolute against a
//! [`DestinationBase`] and are not confined to the root.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::Failure;
use crate::core::utils;

/// Base that relative copy/move destinations are resolved against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DestinationBase {
    /// The process working directory at the time of the call.
    #[default]
    ProcessDir,
    /// The session cursor.
    Cursor,
}

/// Joins `name` onto `cursor` with plain host path-join semantics.
pub fn resolve<P: AsRef<Path>>(cursor: &Path, name: P) -> PathBuf {
    cursor.join(name)
}

/// Resolves a source-side `name` and checks that it stays inside `root`.
/// The returned path is the joined path itself; normalization is only used for the check.
pub fn resolve_source(root: &Path, cursor: &Path, name: &str) -> Result<PathBuf, Failure> {
    if name.is_empty() {
        return Err(Failure::invalid("invalid name: empty"));
    }
    let path = resolve(cursor, name);
    if !utils::is_within(&path, root) {
        return Err(Failure::invalid(format!(
            "'{}' is outside of the root directory.",
            name
        )));
    }
    debug!(name, path = %path.display(), "resolved source");
    Ok(path)
}

/// Resolves a copy/move destination like `abspath`: absolute paths are normalized as is,
/// relative ones are joined onto the directory selected by `base` first.
pub fn resolve_destination(
    base: DestinationBase,
    cursor: &Path,
    destination: &str,
) -> std::io::Result<PathBuf> {
    let anchor = match base {
        DestinationBase::ProcessDir => std::env::current_dir()?,
        DestinationBase::Cursor => cursor.to_path_buf(),
    };
    let path = utils::absolutize(destination, anchor);
    debug!(destination, path = %path.display(), "resolved destination");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_onto_cursor() {
        let cursor = Path::new("/r/x");
        assert_eq!(resolve(cursor, "f.txt"), PathBuf::from("/r/x/f.txt"));
        assert_eq!(resolve(cursor, "a/b"), PathBuf::from("/r/x/a/b"));
        // no normalization beyond the join
        assert_eq!(resolve(cursor, "../y"), PathBuf::from("/r/x/../y"));
    }

    #[test]
    fn test_resolve_source_inside_root() {
        let root = Path::new("/r");
        let path = resolve_source(root, Path::new("/r/x"), "../y").unwrap();
        assert_eq!(path, PathBuf::from("/r/x/../y"));
    }

    #[test]
    fn test_resolve_source_rejects_escape() {
        let root = Path::new("/r");
        let result = resolve_source(root, root, "../etc");
        assert!(matches!(result, Err(Failure::InvalidArgument(_))));

        let result = resolve_source(root, root, "/etc/passwd");
        assert!(matches!(result, Err(Failure::InvalidArgument(_))));
    }

    #[test]
    fn test_resolve_source_rejects_empty_name() {
        let root = Path::new("/r");
        assert!(resolve_source(root, root, "").is_err());
    }

    #[test]
    fn test_resolve_destination_against_cursor() {
        let cursor = Path::new("/r/x");
        let path = resolve_destination(DestinationBase::Cursor, cursor, "../y").unwrap();
        assert_eq!(path, PathBuf::from("/r/y"));
    }

    #[test]
    fn test_resolve_destination_against_process_dir() {
        let cwd = std::env::current_dir().unwrap();
        let path = resolve_destination(DestinationBase::ProcessDir, Path::new("/r"), "out").unwrap();
        assert_eq!(path, utils::normalize(cwd.join("out")));
    }

    #[test]
    fn test_resolve_destination_absolute_ignores_base() {
        let path = resolve_destination(DestinationBase::Cursor, Path::new("/r"), "/tmp/z/").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/z"));
    }
}
