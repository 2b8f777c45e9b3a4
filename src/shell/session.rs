//! The session: a sandbox root on the host and the current-directory cursor moving inside it.
//!
//! ### Key points:
//! - **Fixed root**: `root` is an absolute normalized host path, set once at construction.
//! - **Cursor**: `cwd` is an absolute host path, always an existing directory equal to or below
//!   `root`. Only [`Session::cd`] moves it, and it either fully transitions or stays put.
//! - **No shadow state**: listings and metadata are read live from the host on every call.
//! - **Single-threaded**: a `Session` assumes exclusive access; wrap it in a `Mutex` to share it.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::{debug, info};

use crate::core::{Failure, Outcome, Result, refuse, utils};
use crate::shell::entry::{EntryKind, EntryMetadata};
use crate::shell::resolver::{self, DestinationBase};

/// A virtual-shell session over a sandboxed host directory.
///
/// ### Example:
/// ```
/// use vshell::Session;
///
/// let root = std::env::temp_dir().join("vshell_doc_session");
/// let mut session = Session::new(&root).unwrap();
/// session.create_directory("docs").unwrap();
/// assert!(session.cd("docs").unwrap().is_success());
/// assert_eq!(session.cwd(), root.join("docs"));
/// session.cd("..").unwrap();
/// session.remove_directory("docs").unwrap();
/// ```
#[derive(Debug)]
pub struct Session {
    root: PathBuf, // host absolute normalized path
    cwd: PathBuf,  // host absolute path, inside root
    destination_base: DestinationBase,
}

impl Session {
    /// Opens a session rooted at `root`.
    /// * A relative `root` is made absolute against the process working directory.
    /// * If `root` does not exist it is created together with missing parents.
    /// * An error returns if `root` is empty or exists but is not a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty"));
        }
        let root = if root.is_relative() {
            utils::absolutize(root, std::env::current_dir()?)
        } else {
            utils::normalize(root)
        };
        if root.exists() && !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root));
        }
        if !std::fs::exists(&root)? {
            std::fs::create_dir_all(&root)
                .with_context(|| format!("unable to create root {}", root.display()))?;
            info!(root = %root.display(), "created root directory");
        }

        Ok(Self {
            cwd: root.clone(),
            root,
            destination_base: DestinationBase::default(),
        })
    }

    /// Selects how relative copy/move destinations are resolved.
    pub fn set_destination_base(&mut self, base: DestinationBase) {
        self.destination_base = base;
    }

    pub fn destination_base(&self) -> DestinationBase {
        self.destination_base
    }

    /// Sandbox root on the host.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current directory (host absolute path).
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// `pwd`: reports the current directory.
    pub fn pwd(&self) -> Outcome<PathBuf> {
        Outcome::done(
            self.cwd.clone(),
            format!("Current working directory: {}", self.cwd.display()),
        )
    }

    /// Changes the current directory.
    /// * `..` moves to the parent; at the root it is refused and the cursor stays.
    /// * Any other token must name a directory listed in the current directory.
    pub fn cd(&mut self, token: &str) -> Result<Outcome> {
        if token == ".." {
            if self.cwd == self.root {
                return refuse(Failure::invalid("Already at the root directory."));
            }
            let parent = self
                .cwd
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| anyhow!("{} has no parent", self.cwd.display()))?;
            self.cwd = parent;
        } else {
            let candidate = resolver::resolve(&self.cwd, token);
            let listed = self.child_names()?.iter().any(|name| name == OsStr::new(token));
            if !listed {
                return refuse(Failure::not_found(token));
            }
            if !candidate.is_dir() {
                return refuse(Failure::not_a_directory(token));
            }
            self.cwd = candidate;
        }

        debug!(cwd = %self.cwd.display(), "changed directory");
        Ok(Outcome::ok(format!(
            "Current working directory: {}",
            self.cwd.display()
        )))
    }

    /// `ls`: names and kinds of the files and directories in the current directory,
    /// sorted by name.
    pub fn list_basic(&self) -> Result<Outcome<Vec<(String, EntryKind)>>> {
        let mut listing = Vec::new();
        for name in self.child_names()? {
            let path = self.cwd.join(&name);
            let kind = if path.is_file() {
                EntryKind::File
            } else if path.is_dir() {
                EntryKind::Directory
            } else {
                continue;
            };
            listing.push((name.to_string_lossy().into_owned(), kind));
        }
        listing.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Outcome::done(listing, self.listing_header()))
    }

    /// `ls -l`: metadata snapshots of the entries in the current directory, sorted by name.
    pub fn list_detailed(&self) -> Result<Outcome<Vec<EntryMetadata>>> {
        let mut listing = Vec::new();
        for name in self.child_names()? {
            let path = self.cwd.join(&name);
            if !path.exists() {
                continue;
            }
            listing.push(EntryMetadata::read(&name.to_string_lossy(), &path)?);
        }
        listing.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(Outcome::done(listing, self.listing_header()))
    }

    /// Resolves a source-side name against the cursor, confined to the root.
    pub(crate) fn source(&self, name: &str) -> std::result::Result<PathBuf, Failure> {
        resolver::resolve_source(&self.root, &self.cwd, name)
    }

    /// Resolves a copy/move destination according to the configured base.
    pub(crate) fn destination(&self, destination: &str) -> Result<PathBuf> {
        resolver::resolve_destination(self.destination_base, &self.cwd, destination)
            .context("unable to resolve destination")
    }

    /// Refuses paths whose removal or relocation would pull the cursor's directory away.
    pub(crate) fn guard_cursor(&self, name: &str, path: &Path) -> std::result::Result<(), Failure> {
        if utils::is_within(&self.cwd, path) {
            return Err(Failure::invalid(format!(
                "'{}' contains the current directory.",
                name
            )));
        }
        Ok(())
    }

    fn child_names(&self) -> Result<Vec<std::ffi::OsString>> {
        let mut names = Vec::new();
        let entries = std::fs::read_dir(&self.cwd)
            .with_context(|| format!("unable to list {}", self.cwd.display()))?;
        for entry in entries {
            names.push(entry?.file_name());
        }
        Ok(names)
    }

    fn listing_header(&self) -> String {
        format!("Contents of directory '{}':", self.cwd.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    mod creations {
        use super::*;

        #[test]
        fn test_new_existing_root() -> Result<()> {
            let temp_dir = setup_test_env();
            let root = temp_dir.path().to_path_buf();

            let session = Session::new(&root)?;

            assert_eq!(session.root(), root);
            assert_eq!(session.cwd(), root);
            assert_eq!(session.destination_base(), DestinationBase::ProcessDir);
            Ok(())
        }

        #[test]
        fn test_new_nested_nonexistent_root_created() -> Result<()> {
            let temp_dir = setup_test_env();
            let nested = temp_dir.path().join("a/b/c");

            let session = Session::new(&nested)?;

            assert_eq!(session.root(), nested);
            assert!(nested.is_dir());
            Ok(())
        }

        #[test]
        fn test_new_normalizes_root() -> Result<()> {
            let temp_dir = setup_test_env();
            let messy = temp_dir.path().join("././subdir/../subdir/");

            let session = Session::new(&messy)?;

            assert_eq!(session.root(), utils::normalize(temp_dir.path().join("subdir")));
            Ok(())
        }

        #[test]
        fn test_new_root_is_file() -> Result<()> {
            let temp_dir = setup_test_env();
            let file_path = temp_dir.path().join("file.txt");
            std::fs::write(&file_path, "content")?;

            assert!(Session::new(&file_path).is_err());
            Ok(())
        }

        #[test]
        fn test_new_empty_root() {
            assert!(Session::new("").is_err());
        }

        #[test]
        fn test_pwd_reports_cursor() -> Result<()> {
            let temp_dir = setup_test_env();
            let session = Session::new(temp_dir.path())?;

            let outcome = session.pwd();
            assert_eq!(outcome.value(), Some(&temp_dir.path().to_path_buf()));
            assert!(outcome.message().starts_with("Current working directory: "));
            Ok(())
        }
    }

    mod cd {
        use super::*;

        #[test]
        fn test_cd_into_child_and_back() -> Result<()> {
            let temp_dir = setup_test_env();
            let mut session = Session::new(temp_dir.path())?;
            std::fs::create_dir_all(temp_dir.path().join("projects/rust"))?;

            assert!(session.cd("projects")?.is_success());
            assert!(session.cd("rust")?.is_success());
            assert_eq!(session.cwd(), temp_dir.path().join("projects/rust"));

            assert!(session.cd("..")?.is_success());
            assert_eq!(session.cwd(), temp_dir.path().join("projects"));
            assert!(session.cd("..")?.is_success());
            assert_eq!(session.cwd(), temp_dir.path());
            Ok(())
        }

        #[test]
        fn test_cd_parent_at_root_is_refused() -> Result<()> {
            let temp_dir = setup_test_env();
            let mut session = Session::new(temp_dir.path())?;

            let outcome = session.cd("..")?;

            assert!(!outcome.is_success());
            assert!(matches!(outcome.failure(), Some(Failure::InvalidArgument(_))));
            assert_eq!(session.cwd(), temp_dir.path());
            Ok(())
        }

        #[test]
        fn test_cd_missing_directory() -> Result<()> {
            let temp_dir = setup_test_env();
            let mut session = Session::new(temp_dir.path())?;

            let outcome = session.cd("nowhere")?;

            assert_eq!(outcome.failure(), Some(&Failure::not_found("nowhere")));
            assert_eq!(session.cwd(), temp_dir.path());
            Ok(())
        }

        #[test]
        fn test_cd_into_file() -> Result<()> {
            let temp_dir = setup_test_env();
            let mut session = Session::new(temp_dir.path())?;
            std::fs::write(temp_dir.path().join("notes.txt"), b"")?;

            let outcome = session.cd("notes.txt")?;

            assert_eq!(outcome.failure(), Some(&Failure::not_a_directory("notes.txt")));
            assert_eq!(session.cwd(), temp_dir.path());
            Ok(())
        }

        #[test]
        fn test_cd_multi_segment_token_is_refused() -> Result<()> {
            let temp_dir = setup_test_env();
            let mut session = Session::new(temp_dir.path())?;
            std::fs::create_dir_all(temp_dir.path().join("a/b"))?;

            assert!(!session.cd("a/b")?.is_success());
            assert!(!session.cd(".")?.is_success());
            assert!(!session.cd("/")?.is_success());
            assert_eq!(session.cwd(), temp_dir.path());
            Ok(())
        }
    }

    mod ls {
        use super::*;

        #[test]
        fn test_list_basic_sorted_with_kinds() -> Result<()> {
            let temp_dir = setup_test_env();
            let session = Session::new(temp_dir.path())?;
            std::fs::create_dir(temp_dir.path().join("src"))?;
            std::fs::write(temp_dir.path().join("b.txt"), b"b")?;
            std::fs::write(temp_dir.path().join("a.txt"), b"a")?;

            let outcome = session.list_basic()?;

            assert_eq!(
                outcome.value(),
                Some(&vec![
                    ("a.txt".to_string(), EntryKind::File),
                    ("b.txt".to_string(), EntryKind::File),
                    ("src".to_string(), EntryKind::Directory),
                ])
            );
            assert!(outcome.message().starts_with("Contents of directory"));
            Ok(())
        }

        #[test]
        fn test_list_basic_excludes_nested() -> Result<()> {
            let temp_dir = setup_test_env();
            let session = Session::new(temp_dir.path())?;
            std::fs::create_dir_all(temp_dir.path().join("docs/deep"))?;
            std::fs::write(temp_dir.path().join("docs/readme.md"), b"")?;

            let listing = session.list_basic()?.into_result().unwrap();

            assert_eq!(listing, vec![("docs".to_string(), EntryKind::Directory)]);
            Ok(())
        }

        #[test]
        fn test_list_detailed_metadata() -> Result<()> {
            let temp_dir = setup_test_env();
            let session = Session::new(temp_dir.path())?;
            std::fs::write(temp_dir.path().join("data.txt"), b"1234")?;
            std::fs::create_dir(temp_dir.path().join("dir"))?;

            let outcome = session.list_detailed()?;
            assert_eq!(
                outcome.message(),
                format!("Contents of directory '{}':", temp_dir.path().display())
            );
            let listing = outcome.into_result().unwrap();

            assert_eq!(listing.len(), 2);
            assert_eq!(listing[0].name(), "data.txt");
            assert_eq!(listing[0].size(), 4);
            assert!(listing[1].is_dir());
            Ok(())
        }

        #[test]
        fn test_list_empty_directory() -> Result<()> {
            let temp_dir = setup_test_env();
            let session = Session::new(temp_dir.path())?;

            assert!(session.list_basic()?.value().unwrap().is_empty());
            assert!(session.list_detailed()?.value().unwrap().is_empty());
            Ok(())
        }
    }

    // Helper function: Creates a temporary directory for tests
    fn setup_test_env() -> TempDir {
        TempDir::new("session_test").unwrap()
    }
}
