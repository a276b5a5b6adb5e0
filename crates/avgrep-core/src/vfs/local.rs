//! Local filesystem backend.
//!
//! Thin absolute-path passthrough over `tokio::fs`. Unlike a sandboxed
//! root, the walker operates on full mountpoint paths, so no prefix
//! resolution happens here.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::warn;

use super::traits::{DirEntry, DirEntryKind, Filesystem};

/// Real filesystem access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;

        while let Some(entry) = dir.next_entry().await? {
            // symlink_metadata so symlinks are reported as symlinks, not
            // chased. The walker skips them; avfs mirrors are plain dirs.
            let metadata = match fs::symlink_metadata(entry.path()).await {
                Ok(m) => m,
                Err(err) => {
                    warn!(path = %entry.path().display(), %err, "skipping unreadable entry");
                    continue;
                }
            };

            let file_type = metadata.file_type();
            let kind = if file_type.is_symlink() {
                DirEntryKind::Symlink
            } else if file_type.is_dir() {
                DirEntryKind::Directory
            } else if file_type.is_file() {
                DirEntryKind::File
            } else {
                DirEntryKind::Other
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size: metadata.len(),
            });
        }

        Ok(entries)
    }

    async fn stat(&self, path: &Path) -> io::Result<DirEntry> {
        let meta = fs::metadata(path).await?;

        // metadata() follows symlinks, so anything that is neither a
        // regular file nor a directory is a special file.
        let kind = if meta.is_dir() {
            DirEntryKind::Directory
        } else if meta.is_file() {
            DirEntryKind::File
        } else {
            DirEntryKind::Other
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());

        Ok(DirEntry {
            name,
            kind,
            size: meta.len(),
        })
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }
}
