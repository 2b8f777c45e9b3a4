//! Copy and move.
//!
//! Sources are names resolved against the cursor and confined to the root; destinations are
//! plain filesystem paths (see [`DestinationBase`](crate::DestinationBase)).
//!
//! Copy destination rules:
//! - an existing directory receives `destination/<source name>`;
//! - for a directory source, if `destination/<source name>` already exists the source is
//!   merged into it: files overwrite same-named files and land inside same-named directories,
//!   subdirectories replace the same-named entry wholesale, destination-only entries stay;
//! - a missing destination (whose parent exists) becomes the copy itself.
//!
//! Move sends the source into an existing directory destination under its own name, or
//! relocates it to the literal destination otherwise. There is no merge on move.

use std::io;
use std::path::Path;

use anyhow::Context;
use filetime::FileTime;
use tracing::{debug, info};

use crate::core::{Failure, Outcome, Result, checked, refuse, utils};
use crate::shell::Session;

impl Session {
    /// Copies `source` (relative to the cursor) to `destination`.
    pub fn copy(&mut self, source: &str, destination: &str) -> Result<Outcome> {
        let src = checked!(self.source(source));
        let dst = self.destination(destination)?;

        if !src.exists() {
            return refuse(Failure::not_found(source));
        }

        if src.is_file() {
            let target = if dst.is_dir() {
                dst.join(utils::base_name(utils::normalize(&src)))
            } else {
                checked!(parent_must_exist(&dst));
                dst
            };
            checked!(distinct(source, &src, &target));
            copy_file(&src, &target)?;
            info!(from = %src.display(), to = %target.display(), "copied file");
            return Ok(Outcome::ok(format!(
                "'{}' copied to '{}'.",
                source, destination
            )));
        }

        if !dst.is_dir() {
            if dst.exists() {
                return refuse(Failure::not_a_directory(destination));
            }
            checked!(parent_must_exist(&dst));
            checked!(not_nested(source, &src, &dst));
            copy_tree(&src, &dst)?;
            info!(from = %src.display(), to = %dst.display(), "copied directory");
            return Ok(Outcome::ok(format!(
                "Directory '{}' copied to '{}'.",
                source, destination
            )));
        }

        let target = dst.join(utils::base_name(utils::normalize(&src)));
        checked!(not_nested(source, &src, &target));
        if !target.exists() {
            copy_tree(&src, &target)?;
            info!(from = %src.display(), to = %target.display(), "copied directory");
            return Ok(Outcome::ok(format!(
                "Directory '{}' copied to '{}'.",
                source, destination
            )));
        }
        if !target.is_dir() {
            return refuse(Failure::not_a_directory(target.display().to_string()));
        }

        merge_into(&src, &target)?;
        info!(from = %src.display(), to = %target.display(), "merged directory");
        Ok(Outcome::ok(format!(
            "Directory contents of '{}' copied to '{}'.",
            source, destination
        )))
    }

    /// Moves `source` (relative to the cursor) to `destination`.
    pub fn move_entry(&mut self, source: &str, destination: &str) -> Result<Outcome> {
        let src = checked!(self.source(source));
        let mut dst = self.destination(destination)?;

        if !src.exists() {
            return refuse(Failure::not_found(source));
        }
        if src.is_dir() {
            checked!(self.guard_cursor(source, &src));
        }
        if dst.is_dir() {
            dst = dst.join(utils::base_name(utils::normalize(&src)));
        }
        checked!(distinct(source, &src, &dst));
        if src.is_dir() {
            checked!(not_nested(source, &src, &dst));
        }

        relocate(&src, &dst)?;
        info!(from = %src.display(), to = %dst.display(), "moved");
        Ok(Outcome::ok(format!(
            "'{}' moved to '{}'.",
            source, destination
        )))
    }
}

fn parent_must_exist(path: &Path) -> std::result::Result<(), Failure> {
    match path.parent() {
        Some(parent) if parent.is_dir() => Ok(()),
        Some(parent) => Err(Failure::not_found(parent.display().to_string())),
        None => Err(Failure::invalid(format!(
            "'{}' has no parent directory.",
            path.display()
        ))),
    }
}

fn distinct(name: &str, src: &Path, dst: &Path) -> std::result::Result<(), Failure> {
    let same = utils::normalize(src) == utils::normalize(dst)
        || (dst.exists() && same_host_entry(src, dst));
    if same {
        return Err(Failure::invalid(format!(
            "'{}' and '{}' are the same entry.",
            name,
            dst.display()
        )));
    }
    Ok(())
}

/// Both paths lead to one host entry once symlinks are followed.
fn same_host_entry(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn not_nested(name: &str, src: &Path, dst: &Path) -> std::result::Result<(), Failure> {
    if utils::is_within(dst, src) {
        return Err(Failure::invalid(format!(
            "Cannot put directory '{}' inside itself.",
            name
        )));
    }
    Ok(())
}

/// Copies file content and permission bits, then carries over access/modification times.
fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst)
        .with_context(|| format!("unable to copy {} to {}", src.display(), dst.display()))?;
    copy_times(src, dst)
}

/// Carries permission bits and access/modification times of `src` over to `dst`.
fn copy_stat(src: &Path, dst: &Path) -> Result<()> {
    let permissions = std::fs::metadata(src)?.permissions();
    std::fs::set_permissions(dst, permissions)
        .with_context(|| format!("unable to set permissions of {}", dst.display()))?;
    copy_times(src, dst)
}

fn copy_times(src: &Path, dst: &Path) -> Result<()> {
    let meta = std::fs::metadata(src)?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dst, atime, mtime)
        .with_context(|| format!("unable to set times of {}", dst.display()))
}

/// Copies the tree at `src` into the new directory `dst`.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir(dst).with_context(|| format!("unable to create {}", dst.display()))?;

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_child = entry.path();
        let dst_child = dst.join(entry.file_name());
        if src_child.is_dir() {
            copy_tree(&src_child, &dst_child)?;
        } else {
            copy_file(&src_child, &dst_child)?;
        }
    }

    // permissions last, a read-only source dir would block the children otherwise
    copy_stat(src, dst)
}

/// Merges the direct children of `src` into the existing directory `dst`.
fn merge_into(src: &Path, dst: &Path) -> Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_child = entry.path();
        let dst_child = dst.join(entry.file_name());

        if src_child.is_dir() {
            if dst_child.exists() {
                debug!(path = %dst_child.display(), "replacing with source subtree");
                utils::rm_on_host(&dst_child)?;
            }
            copy_tree(&src_child, &dst_child)?;
        } else if dst_child.is_dir() {
            let inner = dst_child.join(entry.file_name());
            debug!(path = %inner.display(), "file lands inside same-named directory");
            copy_file(&src_child, &inner)?;
        } else {
            copy_file(&src_child, &dst_child)?;
        }
    }
    Ok(())
}

/// Renames in place; across filesystems falls back to copy-then-delete.
fn relocate(src: &Path, dst: &Path) -> Result<()> {
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %src.display(), to = %dst.display(), "cross-device move");
            move_by_copy(src, dst)
        }
        Err(err) => Err(err)
            .with_context(|| format!("unable to move {} to {}", src.display(), dst.display())),
    }
}

/// Copies `src` to `dst`, then deletes `src`.
fn move_by_copy(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_tree(src, dst)?;
    } else {
        copy_file(src, dst)?;
    }
    utils::rm_on_host(src)
}
