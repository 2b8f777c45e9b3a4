use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Context;
use chrono::{DateTime, Local};

use crate::core::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("File"),
            EntryKind::Directory => f.write_str("Directory"),
        }
    }
}

/// Snapshot of a single entry, taken live from the host on every query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMetadata {
    name: String,
    kind: EntryKind,
    modified: SystemTime,
    size: u64,
    permissions: u32,
}

impl EntryMetadata {
    /// Reads the snapshot of host entry `path`, reporting it under `name`.
    pub(crate) fn read<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("unable to stat {}", path.display()))?;
        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Ok(Self {
            name: name.to_string(),
            kind,
            modified: meta.modified()?,
            size: meta.len(),
            permissions: permission_bits(&meta),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Owner/group/other `rwx` bits, `0..=0o777`.
    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    /// Permission bits as a 3-digit octal string, e.g. `"644"`.
    pub fn permissions_octal(&self) -> String {
        format_octal(self.permissions)
    }
}

impl fmt::Display for EntryMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp: DateTime<Local> = self.modified.into();
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Type: {}", self.kind)?;
        writeln!(f, "Timestamp: {}", timestamp.format("%Y-%m-%d %H:%M:%S%.6f"))?;
        writeln!(f, "Size: {} B", self.size)?;
        write!(f, "Permissions: {}", self.permissions_octal())
    }
}

pub(crate) fn format_octal(bits: u32) -> String {
    format!("{:03o}", bits & 0o777)
}

#[cfg(unix)]
pub(crate) fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
pub(crate) fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o666 }
}
