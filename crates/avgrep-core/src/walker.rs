//! Recursive enumeration of searchable files under an avfs mountpoint.
//!
//! The walker expands archive mirrors in place of their archive files: a
//! file entry whose mirror directory exists contributes the mirror's
//! contents (recursively) and never itself. Every per-entry failure is a
//! logged diagnostic, not an abort — one unreadable entry, archive, or
//! root must not cost the rest of the walk.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, warn};

use crate::filter::FilterSpec;
use crate::mount::{AvfsMount, MIRROR_MARKER};
use crate::vfs::{DirEntry, DirEntryKind, Filesystem};

/// Identity of an archive on the current expansion chain.
///
/// A self-referential archive reappears under an ever-growing virtual
/// path, so the path itself cannot detect the loop; the archive's own
/// name and size can.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ArchiveId {
    name: String,
    size: u64,
}

impl ArchiveId {
    fn of(entry: &DirEntry) -> Self {
        Self {
            name: entry.name.clone(),
            size: entry.size,
        }
    }
}

/// Archive-aware file walker.
pub struct AvfsWalker<'a> {
    fs: &'a dyn Filesystem,
    mount: &'a AvfsMount,
}

impl<'a> AvfsWalker<'a> {
    pub fn new(fs: &'a dyn Filesystem, mount: &'a AvfsMount) -> Self {
        Self { fs, mount }
    }

    /// Walk one virtual root and collect the leaf files accepted by the
    /// filter. Order follows directory iteration and is unspecified.
    ///
    /// Infallible by design: an unlistable root yields an empty result
    /// with a diagnostic, matching the per-entry soft-fail policy.
    pub async fn walk(&self, root: &Path, spec: &FilterSpec) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut chain = Vec::new();
        self.walk_dir(root.to_path_buf(), spec, &mut files, &mut chain)
            .await;
        files
    }

    /// Walk several roots independently and concatenate the results in
    /// root order. A failing root contributes an empty list without
    /// touching its siblings' walks.
    pub async fn walk_many(&self, roots: &[PathBuf], spec: &FilterSpec) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in roots {
            files.extend(self.walk(root, spec).await);
        }
        files
    }

    /// Recurse into one virtual directory. Boxed because archive nesting
    /// makes the future type recursive; recursion depth equals archive
    /// plus directory nesting depth.
    fn walk_dir<'s>(
        &'s self,
        dir: PathBuf,
        spec: &'s FilterSpec,
        files: &'s mut Vec<PathBuf>,
        chain: &'s mut Vec<ArchiveId>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 's>> {
        Box::pin(async move {
            let entries = match self.fs.list(&dir).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(dir = %dir.display(), %err, "skipping unlistable directory");
                    return;
                }
            };

            for entry in &entries {
                let path = dir.join(&entry.name);

                // Some mounts list mirror entries alongside the files
                // they mirror. The unmarked twin already accounts for
                // them: a directory mirror expands through its archive
                // file, and a file-shaped mirror strips back to the
                // same leaf. Visiting the marked entry too would double
                // its contribution.
                if let Some(unmarked) = entry.name.strip_suffix(MIRROR_MARKER) {
                    if entries.iter().any(|e| e.name == unmarked) {
                        debug!(
                            path = %path.display(),
                            "mirror listed alongside its original, skipping"
                        );
                        continue;
                    }
                }

                match entry.kind {
                    // Directories recurse unconditionally; only leaf
                    // files are filtered.
                    DirEntryKind::Directory => {
                        self.walk_dir(path, spec, files, chain).await;
                    }
                    DirEntryKind::File => {
                        self.visit_file(entry, path, spec, files, chain).await;
                    }
                    DirEntryKind::Symlink | DirEntryKind::Other => {
                        debug!(path = %path.display(), "skipping non-file entry");
                    }
                }
            }
        })
    }

    async fn visit_file(
        &self,
        entry: &DirEntry,
        path: PathBuf,
        spec: &FilterSpec,
        files: &mut Vec<PathBuf>,
        chain: &mut Vec<ArchiveId>,
    ) {
        let mirror = AvfsMount::archive_mirror(&path);
        match self.fs.stat(&mirror).await {
            Ok(info) if info.is_dir() => {
                // Archive boundary: the expansion replaces the file. An
                // archive already open further up the chain means the
                // mount is looping back into itself; refuse to re-enter.
                let id = ArchiveId::of(entry);
                if chain.contains(&id) {
                    warn!(
                        path = %path.display(),
                        "archive already open on this chain, refusing to re-enter"
                    );
                    return;
                }
                chain.push(id);
                self.walk_dir(mirror, spec, files, chain).await;
                chain.pop();
                return;
            }
            // A mirror that is not a directory is not expandable (single
            // stream compressed files get a file-shaped mirror).
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %mirror.display(), %err, "mirror check failed, skipping entry");
                return;
            }
        }

        let leaf = AvfsMount::strip_mirror_marker(&path);
        if !spec.matches(&leaf) {
            return;
        }

        // Fresh stat, genuinely awaited: the entry may have vanished or
        // turned unreadable since the listing reported it.
        match self.fs.stat(&path).await {
            Ok(info) if info.is_file() => files.push(leaf),
            Ok(_) => {
                warn!(path = %path.display(), "entry is not a regular file, skipping");
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    %err,
                    "entry is neither a supported archive nor a readable file"
                );
            }
        }
    }
}
