//! Mime-type detection for picking the right grep variant.
//!
//! Compressed single-stream files (gzip, xz, bzip2) are not expandable by
//! the mount, so they reach the searcher as-is; the dispatcher asks here
//! which variant can read them. Detection shells out to `file(1)` — the
//! mount already guarantees the path is a readable regular file.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::error::Error;

/// Maps a file path to a MIME-type identifier.
#[async_trait]
pub trait MimeDetector: Send + Sync {
    async fn detect(&self, path: &Path) -> Result<String, Error>;
}

/// `file --brief --mime-type` based detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCmd;

impl FileCmd {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MimeDetector for FileCmd {
    async fn detect(&self, path: &Path) -> Result<String, Error> {
        let output = Command::new("file")
            .arg("--brief")
            .arg("--mime-type")
            .arg(path)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: "file".to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: "file".to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detects_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        tokio::fs::write(&path, b"hello avfs\n").await.unwrap();

        match FileCmd::new().detect(&path).await {
            Ok(mime) => assert!(mime.starts_with("text/"), "unexpected mime: {mime}"),
            // Hosts without file(1) still get plain-grep fallback.
            Err(Error::Spawn { .. }) => {}
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_error_or_unknown() {
        // file(1) reports a message on stderr and a non-zero status for
        // unreadable paths on most platforms; either way we must not
        // return a text/ mime for it.
        let result = FileCmd::new().detect(Path::new("/no/such/file")).await;
        if let Ok(mime) = result {
            assert!(!mime.starts_with("text/"), "unexpected mime: {mime}");
        }
    }
}
