//! Filesystem seam for the walker.
//!
//! The walker only ever lists directories and stats paths, so the trait
//! here is a read-only slice of a filesystem:
//!
//! - **LocalFs**: the real filesystem via `tokio::fs` (the avfs mountpoint
//!   in production)
//! - **MemoryFs**: in-memory tree for tests, including simulated
//!   permission failures

mod local;
mod memory;
mod traits;

pub use local::LocalFs;
pub use memory::MemoryFs;
pub use traits::{DirEntry, DirEntryKind, Filesystem};
