//! A working set of loaded archives
//!
//! Lookups walk the archives in load order and stop at the first hit.

use std::path::{Path, PathBuf};

use tracing::info;

use craftkit_core::Sha1Hash;

use crate::config::ArchiveConfig;
use crate::entry::Entry;
use crate::error::{ArchiveError, Result};
use crate::handle::ArchiveHandle;

/// Ordered collection of open archives, at most one per path
#[derive(Debug, Default)]
pub struct ArchiveSet {
    archives: Vec<ArchiveHandle>,
}

impl ArchiveSet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and add an archive
    ///
    /// Fails if the same file is already loaded or does not parse.
    pub fn load(&mut self, path: impl AsRef<Path>, config: ArchiveConfig) -> Result<ArchiveHandle> {
        let path = normalize(path.as_ref());
        if self.position(&path).is_some() {
            return Err(ArchiveError::AlreadyLoaded { path });
        }

        let handle = ArchiveHandle::open(&path, config)?;
        if !handle.is_parsed() {
            return Err(ArchiveError::NotParsed { path });
        }
        info!(target: "craftkit::archive", path = %path.display(), loaded = self.archives.len() + 1, "Loaded archive");
        self.archives.push(handle.clone());
        Ok(handle)
    }

    /// Remove an archive, saving staged adds first when `save` is set
    ///
    /// If the save fails the archive stays loaded.
    pub fn close(&mut self, path: impl AsRef<Path>, save: bool) -> Result<()> {
        let path = normalize(path.as_ref());
        let index = self
            .position(&path)
            .ok_or_else(|| ArchiveError::NotLoaded { path: path.clone() })?;
        if save && self.archives[index].is_dirty() {
            self.archives[index].save()?;
        }
        self.archives.remove(index);
        info!(target: "craftkit::archive", path = %path.display(), "Closed archive");
        Ok(())
    }

    /// Returns true if this file is loaded
    pub fn is_loaded(&self, path: impl AsRef<Path>) -> bool {
        self.position(&normalize(path.as_ref())).is_some()
    }

    /// Loaded archives in load order
    pub fn archives(&self) -> &[ArchiveHandle] {
        &self.archives
    }

    /// Number of loaded archives
    pub fn len(&self) -> usize {
        self.archives.len()
    }

    /// Returns true if nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.archives.is_empty()
    }

    /// First archive holding this hash, with its entry
    pub fn find(&self, hash: &Sha1Hash) -> Option<(&ArchiveHandle, Entry)> {
        self.archives
            .iter()
            .find_map(|handle| handle.find(hash).map(|entry| (handle, entry)))
    }

    /// Payload from the first archive holding this hash
    pub fn extract(&self, hash: &Sha1Hash) -> Result<Option<Vec<u8>>> {
        match self.find(hash) {
            Some((handle, _)) => handle.extract(hash),
            None => Ok(None),
        }
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.archives.iter().position(|a| a.path() == path)
    }
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
