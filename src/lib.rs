//! A virtual shell over a sandboxed host directory.
//!
//! ### Overview
//!
//! `vshell` exposes shell-like commands (navigate, list, create, remove, rename, copy, move,
//! edit, inspect metadata and permissions) against a root directory on the host, keeping a
//! single current-directory cursor across commands.
//!
//! **Key ideas**:
//! - **Explicit session**: all state lives in a [`Session`] value; open as many as you like.
//! - **Confinement**: names are resolved against the cursor and may not leave the root.
//!   Copy/move destinations are ordinary host paths.
//! - **Structured results**: every command returns an [`Outcome`] (success or an expected
//!   [`Failure`], plus a message). Only host I/O faults surface as `Err`.
//! - **Live metadata**: nothing is cached; every query reads the host filesystem.
//!
//! ### Example
//! ```
//! use vshell::Session;
//!
//! let root = std::env::temp_dir().join("vshell_doc_lib");
//! let mut session = Session::new(&root).unwrap();
//!
//! session.create_file("hello.txt", "Hello").unwrap();
//! let outcome = session.read_file("hello.txt").unwrap();
//! assert_eq!(outcome.value().unwrap(), b"Hello");
//!
//! let outcome = session.rename("missing.txt", "other.txt").unwrap();
//! assert!(!outcome.is_success());
//! assert_eq!(outcome.message(), "'missing.txt' does not exist.");
//!
//! session.remove_file("hello.txt").unwrap();
//! ```

pub mod command;
mod core;
mod shell;

pub use crate::core::{Failure, Outcome, Result, utils};
pub use shell::{
    DestinationBase, END_OF_INPUT, EditMode, EntryKind, EntryMetadata, Session, WriteMode,
    collect_lines, resolve, resolve_destination, resolve_source,
};
