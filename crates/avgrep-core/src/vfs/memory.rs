//! In-memory filesystem for walker tests.
//!
//! Builds virtual avfs trees without touching disk: a mirror directory is
//! just a directory whose name ends in `#`. A `deny()` knob makes
//! individual paths fail with `PermissionDenied` so soft-fail behavior can
//! be exercised.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::sync::RwLock;

use super::traits::{DirEntry, DirEntryKind, Filesystem};

#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8> },
    Directory,
}

/// In-memory filesystem. Thread-safe via internal `RwLock`; all data is
/// lost when dropped.
#[derive(Debug)]
pub struct MemoryFs {
    entries: RwLock<HashMap<PathBuf, Entry>>,
    denied: RwLock<HashSet<PathBuf>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem (root directory exists).
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from(""), Entry::Directory);
        Self {
            entries: RwLock::new(entries),
            denied: RwLock::new(HashSet::new()),
        }
    }

    /// Normalize a path: drop the leading `/`, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => result.push(s),
            }
        }
        result
    }

    /// Write a file, creating parent directories as needed.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) {
        let normalized = Self::normalize(path.as_ref());
        let mut entries = self.entries.write().await;

        let mut current = PathBuf::new();
        for component in normalized.parent().into_iter().flat_map(|p| p.components()) {
            if let Component::Normal(s) = component {
                current.push(s);
                entries.entry(current.clone()).or_insert(Entry::Directory);
            }
        }

        entries.insert(normalized, Entry::File { data: data.to_vec() });
    }

    /// Create a directory (and parents).
    pub async fn mkdir(&self, path: impl AsRef<Path>) {
        let normalized = Self::normalize(path.as_ref());
        let mut entries = self.entries.write().await;

        let mut current = PathBuf::new();
        for component in normalized.components() {
            if let Component::Normal(s) = component {
                current.push(s);
                entries.entry(current.clone()).or_insert(Entry::Directory);
            }
        }
    }

    /// Make every operation on `path` fail with `PermissionDenied`.
    pub async fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .write()
            .await
            .insert(Self::normalize(path.as_ref()));
    }

    async fn check_access(&self, normalized: &Path) -> io::Result<()> {
        if self.denied.read().await.contains(normalized) {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", normalized.display()),
            ))
        } else {
            Ok(())
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("not found: {}", path.display()),
        )
    }
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn list(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let normalized = Self::normalize(path);
        self.check_access(&normalized).await?;
        let entries = self.entries.read().await;

        match entries.get(&normalized) {
            Some(Entry::Directory) => {}
            Some(Entry::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ));
            }
            None => return Err(Self::not_found(path)),
        }

        let mut result = Vec::new();
        for (entry_path, entry) in entries.iter() {
            // Direct children only: the root's children have parent "".
            if entry_path.as_os_str().is_empty()
                || entry_path.parent() != Some(normalized.as_path())
            {
                continue;
            }

            let name = entry_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            // Mirror entries are lookup-only, exactly like the real
            // mount: `x.tar#` resolves when asked for but never shows up
            // in its parent's listing.
            if name.ends_with(crate::mount::MIRROR_MARKER) {
                continue;
            }

            result.push(match entry {
                Entry::File { data } => DirEntry::file(name, data.len() as u64),
                Entry::Directory => DirEntry::directory(name),
            });
        }

        // Deterministic listings make test failures readable.
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn stat(&self, path: &Path) -> io::Result<DirEntry> {
        let normalized = Self::normalize(path);
        self.check_access(&normalized).await?;
        let entries = self.entries.read().await;

        let name = normalized
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());

        match entries.get(&normalized) {
            Some(Entry::File { data }) => Ok(DirEntry {
                name,
                kind: DirEntryKind::File,
                size: data.len() as u64,
            }),
            Some(Entry::Directory) => Ok(DirEntry {
                name,
                kind: DirEntryKind::Directory,
                size: 0,
            }),
            None => Err(Self::not_found(path)),
        }
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = Self::normalize(path);
        self.check_access(&normalized).await?;
        let entries = self.entries.read().await;

        match entries.get(&normalized) {
            Some(Entry::File { data }) => Ok(data.clone()),
            Some(Entry::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(Self::not_found(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read() {
        let fs = MemoryFs::new();
        fs.write("/a/b.txt", b"hello").await;
        assert_eq!(fs.read(Path::new("/a/b.txt")).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn write_creates_parents() {
        let fs = MemoryFs::new();
        fs.write("/a/b/c.txt", b"x").await;

        let entry = fs.stat(Path::new("/a/b")).await.unwrap();
        assert!(entry.is_dir());
    }

    #[tokio::test]
    async fn list_direct_children_only() {
        let fs = MemoryFs::new();
        fs.write("/top.txt", b"1").await;
        fs.write("/sub/inner.txt", b"2").await;

        let names: Vec<_> = fs
            .list(Path::new("/"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["sub", "top.txt"]);

        let names: Vec<_> = fs
            .list(Path::new("/sub"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["inner.txt"]);
    }

    #[tokio::test]
    async fn mirror_entries_are_lookup_only() {
        let fs = MemoryFs::new();
        fs.write("/a.zip", b"PK").await;
        fs.write("/a.zip#/inner.txt", b"text").await;

        // Visible by lookup...
        assert!(fs.stat(Path::new("/a.zip#")).await.unwrap().is_dir());

        // ...but hidden from the parent listing.
        let names: Vec<_> = fs
            .list(Path::new("/"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.zip"]);
    }

    #[tokio::test]
    async fn mirror_directory_names_keep_marker() {
        let fs = MemoryFs::new();
        fs.write("/a.zip", b"PK").await;
        fs.write("/a.zip#/inner.txt", b"text").await;

        let entry = fs.stat(Path::new("/a.zip#")).await.unwrap();
        assert!(entry.is_dir());
        assert_eq!(entry.name, "a.zip#");
    }

    #[tokio::test]
    async fn denied_path_reports_permission_error() {
        let fs = MemoryFs::new();
        fs.write("/locked.txt", b"secret").await;
        fs.deny("/locked.txt").await;

        let err = fs.stat(Path::new("/locked.txt")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn missing_path_reports_not_found() {
        let fs = MemoryFs::new();
        let err = fs.stat(Path::new("/nope")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
