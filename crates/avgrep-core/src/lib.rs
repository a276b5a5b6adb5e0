//! avgrep-core: archive-aware file enumeration for avfs mountpoints.
//!
//! avfs exposes archive contents as virtual directories: next to the real
//! file `foo.tar`, the mountpoint serves a directory `foo.tar#` holding the
//! archive's extracted entries — recursively, so archives inside archives
//! keep unfolding. This crate walks that namespace:
//!
//! - **AvfsMount**: translates between real paths and their virtual
//!   mirrors under the mount root
//! - **FilterSpec**: prunes candidate files by path, file name, and
//!   extension before any search work happens
//! - **AvfsWalker**: recursively expands archive mirrors and produces the
//!   flat list of leaf files a search tool can open
//! - **GrepSearcher**: dispatches each leaf to the right grep variant
//!   (plain, zgrep, xzgrep, ...) based on mime detection

pub mod error;
pub mod filter;
pub mod mime;
pub mod mount;
pub mod search;
pub mod vfs;
pub mod walker;

pub use error::Error;
pub use filter::{FilterSpec, Patterns};
pub use mime::{FileCmd, MimeDetector};
pub use mount::AvfsMount;
pub use search::{GrepSearcher, Match, Searcher};
pub use vfs::{DirEntry, DirEntryKind, Filesystem, LocalFs, MemoryFs};
pub use walker::AvfsWalker;
