//! Content-addressed archive storage for craftkit
//!
//! This crate reads and appends to archive files that store blobs keyed by
//! their SHA1:
//!
//! - `archive`: [`Archive`], open/find/add/extract/save on one file
//! - `variant`: the three trailer layouts (`FARC`, `FAR4`, `FAR5`)
//! - `entry`: 28-byte table records
//! - `config`: byte order, fsync and entry limits
//! - `handle`: [`ArchiveHandle`], a lock-guarded shared archive
//! - `set`: [`ArchiveSet`], several archives searched in load order
//!
//! Saves are append-style and not transactional: a crash mid-save can leave
//! the file unreadable.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod config;
pub mod entry;
pub mod error;
pub mod handle;
pub mod set;
pub mod variant;

pub use archive::Archive;
pub use config::{ArchiveConfig, ConfigError, DEFAULT_MAX_ENTRY_COUNT, MAX_ENTRY_COUNT};
pub use entry::{Entry, ENTRY_RECORD_SIZE};
pub use error::{ArchiveError, Result};
pub use handle::ArchiveHandle;
pub use set::ArchiveSet;
pub use variant::ArchiveVariant;
