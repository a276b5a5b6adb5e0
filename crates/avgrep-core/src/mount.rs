//! Real ↔ virtual path translation for an avfs mountpoint.
//!
//! avfs mirrors the whole filesystem under a mount root (by convention
//! `~/.avfs`): the real file `/data/foo.tar` appears as
//! `~/.avfs/data/foo.tar`, and its extracted contents as the virtual
//! directory `~/.avfs/data/foo.tar#`. All functions here are pure path
//! arithmetic; nothing touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Trailing character marking "the virtual mirror of this archive's
/// extracted contents".
pub const MIRROR_MARKER: char = '#';

/// Mount subdirectory under the home directory.
pub const MOUNT_SUBDIR: &str = ".avfs";

/// An avfs mountpoint rooted at a known directory.
#[derive(Debug, Clone)]
pub struct AvfsMount {
    root: PathBuf,
}

impl AvfsMount {
    /// Mount at the conventional location, `home_dir/.avfs`.
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: home_dir.into().join(MOUNT_SUBDIR),
        }
    }

    /// Mount at an arbitrary root (alternate mounts, tests).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The mount root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Translate a real path into the mount: `/data/x` → `ROOT/data/x`.
    ///
    /// The leading root component is stripped first so absolute paths nest
    /// under the mount root instead of replacing it.
    pub fn mount_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let mut joined = self.root.clone();
        for component in path.as_ref().components() {
            match component {
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                Component::ParentDir => {
                    if joined != self.root {
                        joined.pop();
                    }
                }
                Component::Normal(c) => joined.push(c),
            }
        }
        joined
    }

    /// The virtual directory mirroring an archive's contents: append one
    /// marker character. Not idempotent — apply at most once per archive
    /// boundary.
    pub fn archive_mirror(path: impl AsRef<Path>) -> PathBuf {
        let mut s = path.as_ref().as_os_str().to_os_string();
        s.push("#");
        PathBuf::from(s)
    }

    /// Remove exactly one trailing marker character if present, else
    /// return the path unchanged.
    pub fn strip_mirror_marker(path: impl AsRef<Path>) -> PathBuf {
        let s = path.as_ref().to_string_lossy();
        match s.strip_suffix(MIRROR_MARKER) {
            Some(stripped) => PathBuf::from(stripped),
            None => path.as_ref().to_path_buf(),
        }
    }

    /// Translate a virtual path back to its real-filesystem form: strip
    /// the mount-root prefix and drop every marker character, undoing any
    /// number of `mount_path` / `archive_mirror` applications.
    pub fn to_real_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        // Component-wise, so a sibling like `.avfs-backup` is not a prefix.
        let stripped = match path.strip_prefix(&self.root) {
            Ok(relative) => Path::new("/").join(relative),
            Err(_) => path.to_path_buf(),
        };
        PathBuf::from(stripped.to_string_lossy().replace(MIRROR_MARKER, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount() -> AvfsMount {
        AvfsMount::new("/home/amy")
    }

    #[test]
    fn root_is_under_home() {
        assert_eq!(mount().root(), Path::new("/home/amy/.avfs"));
    }

    #[test]
    fn mount_path_nests_absolute_paths() {
        assert_eq!(
            mount().mount_path("/data/docs"),
            PathBuf::from("/home/amy/.avfs/data/docs")
        );
    }

    #[test]
    fn mount_path_keeps_relative_paths() {
        assert_eq!(
            mount().mount_path("data/docs"),
            PathBuf::from("/home/amy/.avfs/data/docs")
        );
    }

    #[test]
    fn mount_path_cannot_escape_root() {
        let m = mount();
        assert_eq!(
            m.mount_path("/../../etc/passwd"),
            PathBuf::from("/home/amy/.avfs/etc/passwd")
        );
    }

    #[test]
    fn archive_mirror_appends_marker() {
        assert_eq!(
            AvfsMount::archive_mirror("/a/b.tar"),
            PathBuf::from("/a/b.tar#")
        );
    }

    #[test]
    fn archive_mirror_is_not_idempotent() {
        let once = AvfsMount::archive_mirror("/a/b.tar");
        assert_eq!(AvfsMount::archive_mirror(&once), PathBuf::from("/a/b.tar##"));
    }

    #[test]
    fn strip_marker_round_trips() {
        let p = PathBuf::from("/a/b.tar");
        assert_eq!(
            AvfsMount::strip_mirror_marker(AvfsMount::archive_mirror(&p)),
            p
        );
    }

    #[test]
    fn strip_marker_without_marker_is_identity() {
        assert_eq!(
            AvfsMount::strip_mirror_marker("/a/b.txt"),
            PathBuf::from("/a/b.txt")
        );
    }

    #[test]
    fn strip_marker_removes_only_one() {
        assert_eq!(
            AvfsMount::strip_mirror_marker("/a/b.tar##"),
            PathBuf::from("/a/b.tar#")
        );
    }

    #[test]
    fn real_path_round_trips_marker_free_paths() {
        let m = mount();
        assert_eq!(
            m.to_real_path(m.mount_path("/data/docs/report.txt")),
            PathBuf::from("/data/docs/report.txt")
        );
    }

    #[test]
    fn real_path_strips_nested_markers() {
        let m = mount();
        let virtual_path = PathBuf::from("/home/amy/.avfs/data/a.zip#/b.tar#/c.txt");
        assert_eq!(
            m.to_real_path(virtual_path),
            PathBuf::from("/data/a.zip/b.tar/c.txt")
        );
    }

    #[test]
    fn real_path_ignores_paths_outside_mount() {
        let m = mount();
        assert_eq!(m.to_real_path("/tmp/x.txt"), PathBuf::from("/tmp/x.txt"));
    }

    #[test]
    fn real_path_leaves_mount_siblings_intact() {
        // `.avfs-backup` shares the root's spelling as a string prefix but
        // is not under the mount.
        let m = mount();
        assert_eq!(
            m.to_real_path("/home/amy/.avfs-backup/x.txt"),
            PathBuf::from("/home/amy/.avfs-backup/x.txt")
        );
    }
}
