//! External search dispatch: one grep invocation per candidate file.
//!
//! The walker hands over virtual leaf paths; this module picks a grep
//! variant per file (plain grep, or the decompressing wrappers for
//! single-stream formats the mount cannot expand), runs it with `-n`, and
//! parses the `line:text` output into [`Match`]es.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

use crate::error::Error;
use crate::mime::MimeDetector;

/// One search hit: path, 1-based line number, matched line text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: PathBuf,
    pub line: u64,
    pub text: String,
}

/// A text-search capability over one file.
///
/// Behind a trait so tests can substitute an in-process scanner and the
/// walker stays free of any knowledge of how searching works.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, path: &Path) -> Result<Vec<Match>, Error>;
}

/// Dispatches to the grep family based on mime detection.
pub struct GrepSearcher {
    pattern: String,
    options: Vec<String>,
    mime: Arc<dyn MimeDetector>,
}

impl GrepSearcher {
    pub fn new(
        pattern: impl Into<String>,
        options: Vec<String>,
        mime: Arc<dyn MimeDetector>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            options,
            mime,
        }
    }

    /// Pick the grep variant able to read this mime type.
    fn variant_for(mime: &str) -> &'static str {
        match mime {
            "application/x-xz" | "application/x-lzma" => "xzgrep",
            "application/gzip" | "application/x-gzip" => "zgrep",
            "application/x-bzip2" => "bzgrep",
            _ => "grep",
        }
    }

    async fn run_variant(&self, variant: &str, path: &Path) -> Result<Vec<Match>, Error> {
        let output = Command::new(variant)
            .args(&self.options)
            .arg("-n")
            .arg("--")
            .arg(&self.pattern)
            .arg(path)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: variant.to_string(),
                source,
            })?;

        let status = output.status.code().unwrap_or(-1);
        if exit_indicates_failure(status, &output.stderr) {
            return Err(Error::CommandFailed {
                command: variant.to_string(),
                status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        parse_output(variant, path, &String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl Searcher for GrepSearcher {
    async fn search(&self, path: &Path) -> Result<Vec<Match>, Error> {
        // Mime failure is not fatal: plain grep is the fallback.
        let variant = match self.mime.detect(path).await {
            Ok(mime) => Self::variant_for(&mime),
            Err(err) => {
                debug!(path = %path.display(), %err, "mime detection failed, using plain grep");
                "grep"
            }
        };

        self.run_variant(variant, path).await
    }
}

/// grep exit contract: 0 means matches, 1 with a silent stderr means a
/// clean no-match. Anything else is a failed invocation, including
/// status 1 with diagnostics, which the decompressing wrappers produce
/// on unreadable input.
fn exit_indicates_failure(status: i32, stderr: &[u8]) -> bool {
    match status {
        0 => false,
        1 => !stderr.is_empty(),
        _ => true,
    }
}

/// Parse `-n` output: one `NUMBER:text` per line, colons in the matched
/// text preserved.
fn parse_output(command: &str, path: &Path, stdout: &str) -> Result<Vec<Match>, Error> {
    let mut matches = Vec::new();

    for line in stdout.lines().filter(|l| !l.is_empty()) {
        let (number, text) = line.split_once(':').ok_or_else(|| Error::MalformedOutput {
            command: command.to_string(),
            line: line.to_string(),
        })?;
        let line_number: u64 = number.parse().map_err(|_| Error::MalformedOutput {
            command: command.to_string(),
            line: line.to_string(),
        })?;

        matches.push(Match {
            path: path.to_path_buf(),
            line: line_number,
            text: text.to_string(),
        });
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::FileCmd;

    #[test]
    fn parses_line_and_text() {
        let matches = parse_output("grep", Path::new("/f"), "3:hello world\n7:again\n").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line, 3);
        assert_eq!(matches[0].text, "hello world");
        assert_eq!(matches[1].line, 7);
    }

    #[test]
    fn preserves_colons_in_matched_text() {
        let matches = parse_output("grep", Path::new("/f"), "12:key: value: more\n").unwrap();
        assert_eq!(matches[0].line, 12);
        assert_eq!(matches[0].text, "key: value: more");
    }

    #[test]
    fn empty_output_is_no_matches() {
        let matches = parse_output("grep", Path::new("/f"), "").unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn garbage_output_is_an_error() {
        let err = parse_output("grep", Path::new("/f"), "not-a-number\n").unwrap_err();
        assert!(matches!(err, Error::MalformedOutput { .. }));
    }

    #[test]
    fn no_match_must_have_silent_stderr() {
        assert!(!exit_indicates_failure(0, b""));
        assert!(!exit_indicates_failure(1, b""));
        assert!(exit_indicates_failure(1, b"zgrep: corrupt input\n"));
        assert!(exit_indicates_failure(2, b""));
        assert!(exit_indicates_failure(-1, b""));
    }

    #[test]
    fn variant_selection() {
        assert_eq!(GrepSearcher::variant_for("application/x-xz"), "xzgrep");
        assert_eq!(GrepSearcher::variant_for("application/x-lzma"), "xzgrep");
        assert_eq!(GrepSearcher::variant_for("application/gzip"), "zgrep");
        assert_eq!(GrepSearcher::variant_for("application/x-bzip2"), "bzgrep");
        assert_eq!(GrepSearcher::variant_for("text/plain"), "grep");
        assert_eq!(GrepSearcher::variant_for("application/zip"), "grep");
    }

    #[tokio::test]
    async fn greps_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"alpha\nbeta match here\ngamma\nmatch again\n")
            .await
            .unwrap();

        let searcher = GrepSearcher::new("match", vec![], Arc::new(FileCmd::new()));
        let matches = searcher.search(&path).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].line, 2);
        assert_eq!(matches[0].text, "beta match here");
        assert_eq!(matches[1].line, 4);
        assert_eq!(matches[1].text, "match again");
    }

    #[tokio::test]
    async fn no_match_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"nothing to see\n").await.unwrap();

        let searcher = GrepSearcher::new("absent-pattern", vec![], Arc::new(FileCmd::new()));
        let matches = searcher.search(&path).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn grep_options_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"MATCH upper\nmatch lower\n")
            .await
            .unwrap();

        let searcher = GrepSearcher::new(
            "MATCH",
            vec!["-i".to_string()],
            Arc::new(FileCmd::new()),
        );
        let matches = searcher.search(&path).await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_a_command_failure() {
        let searcher = GrepSearcher::new("x", vec![], Arc::new(FileCmd::new()));
        let err = searcher.search(Path::new("/no/such/file")).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
    }
}
