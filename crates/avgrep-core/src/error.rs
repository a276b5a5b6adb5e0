//! Error types for search dispatch and mime detection.

use std::io;

/// Errors from the external-command collaborators (grep variants, `file`).
///
/// Walker failures never surface here: the walk is soft-fail per entry and
/// reports problems as `tracing` diagnostics instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external command could not be spawned at all.
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The external command ran but reported a real failure (for grep,
    /// any exit status above 1 — status 1 just means "no matches").
    #[error("{command} exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// A stdout line did not parse as `line:text`.
    #[error("unparseable output line from {command}: {line:?}")]
    MalformedOutput { command: String, line: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}
