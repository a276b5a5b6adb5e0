//! Core filesystem trait and entry types.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
    Symlink,
    /// Sockets, pipes, devices. Never searched, never recursed into.
    Other,
}

/// A directory entry as reported by `list()` and `stat()`.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    /// Kind of entry.
    pub kind: DirEntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
}

impl DirEntry {
    /// Create a new file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::File,
            size,
        }
    }

    /// Create a new directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Directory,
            size: 0,
        }
    }

    /// Create a new symlink entry.
    pub fn symlink(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DirEntryKind::Symlink,
            size: 0,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == DirEntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == DirEntryKind::Symlink
    }
}

/// Read-only filesystem interface.
///
/// Paths are absolute. The avfs mountpoint is read-only and assumed fully
/// populated at walk time, so no write operations exist here.
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// List entries in a directory.
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Get metadata for a file or directory (follows symlinks).
    async fn stat(&self, path: &Path) -> io::Result<DirEntry>;

    /// Read the entire contents of a file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }
}
