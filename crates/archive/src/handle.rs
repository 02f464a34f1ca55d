//! Shared ownership of one open archive
//!
//! An [`Archive`] mutates its file in place, so exactly one owner may drive
//! it. The handle funnels every request through a single lock and hands back
//! owned results, which keeps lock hold times to one operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use craftkit_core::Sha1Hash;

use crate::archive::Archive;
use crate::config::ArchiveConfig;
use crate::entry::Entry;
use crate::error::Result;

/// Cloneable handle to an archive behind a mutex
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    inner: Arc<Mutex<Archive>>,
    path: PathBuf,
}

impl ArchiveHandle {
    /// Wrap an open archive
    pub fn new(archive: Archive) -> Self {
        let path = archive.path().to_path_buf();
        ArchiveHandle {
            inner: Arc::new(Mutex::new(archive)),
            path,
        }
    }

    /// Open an archive file and wrap it
    pub fn open(path: impl AsRef<Path>, config: ArchiveConfig) -> Result<Self> {
        Ok(Self::new(Archive::open(path, config)?))
    }

    /// Location of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the archive parsed
    pub fn is_parsed(&self) -> bool {
        self.inner.lock().is_parsed()
    }

    /// Returns true if there are staged adds
    pub fn is_dirty(&self) -> bool {
        self.inner.lock().is_dirty()
    }

    /// Entry with this hash
    pub fn find(&self, hash: &Sha1Hash) -> Option<Entry> {
        self.inner.lock().find(hash).copied()
    }

    /// Stage a blob; see [`Archive::add`]
    pub fn add(&self, data: &[u8]) -> Result<Sha1Hash> {
        self.inner.lock().add(data)
    }

    /// Copy of the payload with this hash
    pub fn extract(&self, hash: &Sha1Hash) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.lock().extract(hash)?.map(<[u8]>::to_vec))
    }

    /// Write staged adds; see [`Archive::save`]
    pub fn save(&self) -> Result<()> {
        self.inner.lock().save()
    }

    /// Run `f` with exclusive access to the archive
    pub fn with<R>(&self, f: impl FnOnce(&mut Archive) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
