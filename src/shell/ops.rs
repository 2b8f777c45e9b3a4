//! Single-entry operations on the current directory: create, remove, rename,
//! whole-file read/write, permissions and stat.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::Context;
use tracing::info;

use crate::core::{Failure, Outcome, Result, checked, refuse};
use crate::shell::Session;
use crate::shell::entry::{self, EntryMetadata};

impl Session {
    /// Creates (or silently truncates) file `name` with `content`.
    pub fn create_file(&mut self, name: &str, content: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if path.is_dir() {
            return refuse(Failure::not_a_file(name));
        }
        std::fs::write(&path, content)
            .with_context(|| format!("unable to write {}", path.display()))?;
        info!(path = %path.display(), "created file");
        Ok(Outcome::ok(format!("File '{}' created.", name)))
    }

    /// Creates directory `name` together with missing intermediate directories.
    pub fn create_directory(&mut self, name: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if path.exists() {
            return refuse(Failure::already_exists(name));
        }
        std::fs::create_dir_all(&path)
            .with_context(|| format!("unable to create {}", path.display()))?;
        info!(path = %path.display(), "created directory");
        Ok(Outcome::ok(format!("Directory '{}' created.", name)))
    }

    /// Removes file `name`. A directory under that name counts as absent.
    pub fn remove_file(&mut self, name: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if !path.is_file() {
            return refuse(Failure::not_found(name));
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("unable to remove {}", path.display()))?;
        info!(path = %path.display(), "removed file");
        Ok(Outcome::ok(format!("File '{}' removed.", name)))
    }

    /// Removes directory `name` and everything below it, without confirmation.
    /// A file under that name counts as absent.
    pub fn remove_directory(&mut self, name: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if !path.is_dir() {
            return refuse(Failure::not_found(name));
        }
        checked!(self.guard_cursor(name, &path));
        std::fs::remove_dir_all(&path)
            .with_context(|| format!("unable to remove {}", path.display()))?;
        info!(path = %path.display(), "removed directory");
        Ok(Outcome::ok(format!("Directory '{}' removed.", name)))
    }

    /// Renames `old_name` to `new_name`; never overwrites an existing entry.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<Outcome> {
        let old_path = checked!(self.source(old_name));
        let new_path = checked!(self.source(new_name));

        if new_path.exists() {
            return refuse(Failure::already_exists(new_name));
        }
        if !old_path.exists() {
            return refuse(Failure::not_found(old_name));
        }
        if old_path.is_dir() {
            checked!(self.guard_cursor(old_name, &old_path));
        }
        std::fs::rename(&old_path, &new_path).with_context(|| {
            format!(
                "unable to rename {} to {}",
                old_path.display(),
                new_path.display()
            )
        })?;
        info!(from = %old_path.display(), to = %new_path.display(), "renamed");
        Ok(Outcome::ok(format!("'{}' renamed to '{}'.", old_name, new_name)))
    }

    /// Reads the whole content of file `name`.
    pub fn read_file(&self, name: &str) -> Result<Outcome<Vec<u8>>> {
        let path = checked!(self.source(name));
        if !path.exists() {
            return refuse(Failure::not_found(name));
        }
        if !path.is_file() {
            return refuse(Failure::not_a_file(name));
        }
        let content =
            std::fs::read(&path).with_context(|| format!("unable to read {}", path.display()))?;
        Ok(Outcome::done(content, format!("Content of '{}'.", name)))
    }

    /// Writes `text` to file `name`, creating it if absent and replacing any old content.
    pub fn write_file(&mut self, name: &str, text: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if path.is_dir() {
            return refuse(Failure::not_a_file(name));
        }
        std::fs::write(&path, text)
            .with_context(|| format!("unable to write {}", path.display()))?;
        info!(path = %path.display(), bytes = text.len(), "wrote file");
        Ok(Outcome::ok(format!("Text written to '{}'.", name)))
    }

    /// Writes `content` to the existing file `name`, appending or overwriting per `mode`.
    pub fn write_whole_file(
        &mut self,
        name: &str,
        content: &[u8],
        mode: WriteMode,
    ) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if !path.exists() {
            return refuse(Failure::not_found(name));
        }
        if !path.is_file() {
            return refuse(Failure::not_a_file(name));
        }

        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Append => options.append(true),
            WriteMode::Overwrite => options.write(true).truncate(true),
        };
        let mut file = options
            .open(&path)
            .with_context(|| format!("unable to open {}", path.display()))?;
        file.write_all(content)
            .with_context(|| format!("unable to write {}", path.display()))?;

        info!(path = %path.display(), ?mode, bytes = content.len(), "updated file");
        let message = match mode {
            WriteMode::Append => "Content appended to file.",
            WriteMode::Overwrite => "Content overwritten in file.",
        };
        Ok(Outcome::ok(message))
    }

    /// Permission bits of `name` as a 3-digit octal string.
    pub fn get_permissions(&self, name: &str) -> Result<Outcome<String>> {
        let path = checked!(self.source(name));
        if !path.exists() {
            return refuse(Failure::not_found(name));
        }
        let meta = std::fs::metadata(&path)
            .with_context(|| format!("unable to stat {}", path.display()))?;
        let octal = entry::format_octal(entry::permission_bits(&meta));
        Ok(Outcome::done(
            octal.clone(),
            format!("Permissions for '{}': {}", name, octal),
        ))
    }

    /// Sets the permission bits of `name` from octal text (`"755"`, `"0o644"`).
    /// Values that do not parse as octal or exceed `777` are refused and nothing changes.
    pub fn set_permissions(&mut self, name: &str, permissions: &str) -> Result<Outcome> {
        let path = checked!(self.source(name));
        if !path.exists() {
            return refuse(Failure::not_found(name));
        }
        let mode = checked!(parse_permissions(permissions));

        apply_permissions(&path, mode)
            .with_context(|| format!("unable to change permissions of {}", path.display()))?;
        info!(path = %path.display(), mode = %entry::format_octal(mode), "changed permissions");
        Ok(Outcome::ok(format!(
            "Permissions for '{}' set to '{:o}'.",
            name, mode
        )))
    }

    /// Metadata snapshot of `name`.
    pub fn stat(&self, name: &str) -> Result<Outcome<EntryMetadata>> {
        let path = checked!(self.source(name));
        if !path.exists() {
            return refuse(Failure::not_found(name));
        }
        let meta = EntryMetadata::read(name, &path)?;
        let message = meta.to_string();
        Ok(Outcome::done(meta, message))
    }
}

/// How [`Session::write_whole_file`] treats existing content.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Append,
    Overwrite,
}

fn parse_permissions(text: &str) -> std::result::Result<u32, Failure> {
    let invalid = || Failure::invalid("Invalid permissions value. Use octal notation (0-777).");
    let digits = text.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    let mode = u32::from_str_radix(digits, 8).map_err(|_| invalid())?;
    if mode > 0o777 {
        return Err(invalid());
    }
    Ok(mode)
}

#[cfg(unix)]
fn apply_permissions(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_permissions(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    std::fs::set_permissions(path, permissions)
}
