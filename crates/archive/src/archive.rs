//! Content-addressed archive file
//!
//! An archive stores blobs keyed by the SHA1 of their bytes. The file ends
//! with an entry table and a short trailer; payloads sit in front of it.
//!
//! # On-disk layout
//!
//! ```text
//! [payload...] [padding] [metadata] [table 28 x N] [checksum] [reserved] [count] [tag]
//! ```
//!
//! Adds are staged in memory. `save` writes the staged payloads over the
//! old metadata and table region, then appends fresh metadata, the full
//! table and trailer, truncates the file there and re-reads it.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use craftkit_core::Sha1Hash;
use craftkit_stream::{ByteReader, ByteWriter};

use crate::config::ArchiveConfig;
use crate::entry::{Entry, ENTRY_RECORD_SIZE};
use crate::error::{ArchiveError, Result};
use crate::variant::{ArchiveVariant, CHECKSUM_SIZE, FOOTER_SIZE};

/// Payloads before metadata are aligned to this many bytes
const PAYLOAD_ALIGNMENT: u64 = 4;

/// An archive file and its staged changes
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    config: ArchiveConfig,
    variant: ArchiveVariant,
    parsed: bool,
    entries: Vec<Entry>,
    /// Cached payloads, parallel to `entries`
    payloads: Vec<Option<Vec<u8>>>,
    /// Indices into `entries` of payloads not yet written
    queue: Vec<usize>,
    queue_size: u64,
    table_offset: u64,
    metadata: Vec<u8>,
    checksum: [u8; CHECKSUM_SIZE],
    dirty: bool,
}

impl Archive {
    /// Open an archive file
    ///
    /// Only an invalid config is an error. A missing, short, or malformed
    /// file yields an archive with [`is_parsed`](Self::is_parsed) false,
    /// and the reason is logged.
    pub fn open(path: impl AsRef<Path>, config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        let mut archive = Archive {
            path: path.as_ref().to_path_buf(),
            config,
            variant: ArchiveVariant::Farc,
            parsed: false,
            entries: Vec::new(),
            payloads: Vec::new(),
            queue: Vec::new(),
            queue_size: 0,
            table_offset: 0,
            metadata: Vec::new(),
            checksum: [0u8; CHECKSUM_SIZE],
            dirty: false,
        };
        // Failure is already recorded as the unparsed state
        let _ = archive.reload();
        Ok(archive)
    }

    /// Write a new empty archive and open it
    ///
    /// Metadata and checksum blocks are zero-filled. Fails if the file
    /// already exists.
    pub fn create(
        path: impl AsRef<Path>,
        variant: ArchiveVariant,
        config: ArchiveConfig,
    ) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let mut writer = ByteWriter::new(variant.metadata_size() + variant.trailer_size())
            .with_endian(config.endian);
        writer.pad(variant.metadata_size())?;
        if variant.has_checksum() {
            writer.pad(CHECKSUM_SIZE)?;
        }
        if variant.has_reserved_word() {
            writer.u32(0, true)?;
        }
        writer.u32(0, true)?;
        writer.bytes(&variant.tag())?;

        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(writer.buffer())?;
        if config.sync_on_save {
            file.sync_all()?;
        }
        info!(
            target: "craftkit::archive",
            path = %path.display(),
            variant = %variant,
            "Created archive"
        );

        let archive = Archive::open(path, config)?;
        if !archive.parsed {
            return Err(ArchiveError::NotParsed {
                path: path.to_path_buf(),
            });
        }
        Ok(archive)
    }

    /// Re-read the table and trailer from disk
    ///
    /// Staged adds and cached payloads are discarded. On failure the
    /// archive is left unparsed.
    pub fn reload(&mut self) -> Result<()> {
        self.parsed = false;
        self.entries.clear();
        self.payloads.clear();
        self.queue.clear();
        self.queue_size = 0;
        self.table_offset = 0;
        self.metadata.clear();
        self.checksum = [0u8; CHECKSUM_SIZE];
        self.dirty = false;

        match self.load() {
            Ok(()) => {
                self.parsed = true;
                info!(
                    target: "craftkit::archive",
                    path = %self.path.display(),
                    variant = %self.variant,
                    entries = self.entries.len(),
                    "Opened archive"
                );
                Ok(())
            }
            Err(e) => {
                self.entries.clear();
                self.payloads.clear();
                warn!(
                    target: "craftkit::archive",
                    path = %self.path.display(),
                    error = %e,
                    "Archive could not be parsed"
                );
                Err(e)
            }
        }
    }

    fn load(&mut self) -> Result<()> {
        let mut file = File::open(&self.path)?;
        let length = file.metadata()?.len();
        if length < FOOTER_SIZE as u64 {
            return Err(ArchiveError::format(format!(
                "file is {length} bytes, shorter than the {FOOTER_SIZE}-byte footer"
            )));
        }

        let mut footer = [0u8; FOOTER_SIZE];
        file.seek(SeekFrom::Start(length - FOOTER_SIZE as u64))?;
        file.read_exact(&mut footer)?;
        let variant = ArchiveVariant::from_tag(&footer[4..]).ok_or_else(|| {
            ArchiveError::format(format!(
                "unrecognized tag {:?}",
                String::from_utf8_lossy(&footer[4..])
            ))
        })?;
        let count = self.config.endian.read_u32(&footer[..4]);
        if count > self.config.max_entry_count {
            return Err(ArchiveError::format(format!(
                "entry count {count} exceeds limit {}",
                self.config.max_entry_count
            )));
        }

        let table_size = u64::from(count) * ENTRY_RECORD_SIZE as u64;
        let table_offset = length
            .checked_sub(variant.trailer_size() as u64 + table_size)
            .ok_or_else(|| {
                ArchiveError::format(format!(
                    "{count} entries do not fit in a {length}-byte {variant} file"
                ))
            })?;
        let metadata_size = variant.metadata_size() as u64;
        if table_offset < metadata_size {
            return Err(ArchiveError::format(format!(
                "no room for the {metadata_size}-byte metadata block"
            )));
        }

        let mut table = vec![0u8; table_size as usize];
        file.seek(SeekFrom::Start(table_offset))?;
        file.read_exact(&mut table)?;

        let mut metadata = vec![0u8; metadata_size as usize];
        let mut checksum = [0u8; CHECKSUM_SIZE];
        if variant.has_checksum() {
            file.seek(SeekFrom::Start(table_offset - metadata_size))?;
            file.read_exact(&mut metadata)?;
            file.seek(SeekFrom::Start(length - variant.trailer_size() as u64))?;
            file.read_exact(&mut checksum)?;
        }

        let mut reader = ByteReader::new(table).with_endian(self.config.endian);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(Entry::read(&mut reader)?);
        }

        self.variant = variant;
        self.table_offset = table_offset;
        self.payloads = vec![None; entries.len()];
        self.entries = entries;
        self.metadata = metadata;
        self.checksum = checksum;
        Ok(())
    }

    // === Accessors ===

    /// Location of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active configuration
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Returns true if the last open or reload succeeded
    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// Layout variant
    pub fn variant(&self) -> ArchiveVariant {
        self.variant
    }

    /// Every entry, stored ones first, then staged ones in add order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries, staged ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if an entry with this hash exists
    pub fn contains(&self, hash: &Sha1Hash) -> bool {
        self.position(hash).is_some()
    }

    /// Returns true if there are staged adds
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Staged entries, in add order
    pub fn queued(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.queue.iter().map(move |&i| &self.entries[i])
    }

    /// Bytes the staged adds will contribute: payload plus one table record each
    pub fn queue_size(&self) -> u64 {
        self.queue_size
    }

    /// File offset of the entry table
    pub fn table_offset(&self) -> u64 {
        self.table_offset
    }

    /// Metadata block preceding the table (empty for `FARC`)
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    /// Checksum block from the trailer (zero for `FARC`)
    pub fn checksum(&self) -> &[u8; CHECKSUM_SIZE] {
        &self.checksum
    }

    fn ensure_parsed(&self) -> Result<()> {
        if self.parsed {
            Ok(())
        } else {
            Err(ArchiveError::NotParsed {
                path: self.path.clone(),
            })
        }
    }

    fn position(&self, hash: &Sha1Hash) -> Option<usize> {
        self.entries.iter().position(|e| e.hash() == *hash)
    }

    // === Operations ===

    /// Entry with this hash
    pub fn find(&self, hash: &Sha1Hash) -> Option<&Entry> {
        let entry = self.position(hash).map(|i| &self.entries[i]);
        if entry.is_none() {
            debug!(target: "craftkit::archive", hash = %hash, "Entry not found");
        }
        entry
    }

    /// Stage a blob for the next save
    ///
    /// Returns the blob's hash. A blob already present is not staged twice.
    pub fn add(&mut self, data: &[u8]) -> Result<Sha1Hash> {
        self.ensure_parsed()?;
        let hash = Sha1Hash::of(data);
        if self.contains(&hash) {
            debug!(target: "craftkit::archive", hash = %hash, "Blob already present");
            return Ok(hash);
        }
        if self.entries.len() >= self.config.max_entry_count as usize {
            return Err(ArchiveError::EntryLimit {
                limit: self.config.max_entry_count,
            });
        }
        let size = u32::try_from(data.len())
            .map_err(|_| ArchiveError::format(format!("blob of {} bytes exceeds 4 GiB", data.len())))?;

        self.queue.push(self.entries.len());
        self.entries.push(Entry::pending(hash, size));
        self.payloads.push(Some(data.to_vec()));
        self.queue_size += (ENTRY_RECORD_SIZE + data.len()) as u64;
        self.dirty = true;
        debug!(target: "craftkit::archive", hash = %hash, size, "Staged blob");
        Ok(hash)
    }

    /// Payload of the entry with this hash
    pub fn extract(&mut self, hash: &Sha1Hash) -> Result<Option<&[u8]>> {
        match self.position(hash) {
            Some(index) => self.extract_entry(index),
            None => Ok(None),
        }
    }

    /// Payload of the entry at `index` in [`entries`](Self::entries)
    ///
    /// Bytes are read from disk on first access and cached afterwards.
    pub fn extract_entry(&mut self, index: usize) -> Result<Option<&[u8]>> {
        self.ensure_parsed()?;
        let Some(entry) = self.entries.get(index).copied() else {
            return Ok(None);
        };
        if self.payloads[index].is_none() {
            let offset = entry
                .offset()
                .ok_or_else(|| ArchiveError::format("staged entry lost its payload"))?;
            let mut buffer = vec![0u8; entry.size() as usize];
            let mut file = File::open(&self.path)?;
            file.seek(SeekFrom::Start(u64::from(offset)))?;
            file.read_exact(&mut buffer)?;
            debug!(
                target: "craftkit::archive",
                hash = %entry.hash(),
                offset,
                size = entry.size(),
                "Read payload"
            );
            self.payloads[index] = Some(buffer);
        }
        Ok(self.payloads[index].as_deref())
    }

    /// Write staged adds to disk
    ///
    /// Does nothing when nothing is staged. On failure the staged adds are
    /// kept so the save can be retried; the file may have been partially
    /// overwritten.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_parsed()?;
        if self.queue.is_empty() {
            debug!(target: "craftkit::archive", path = %self.path.display(), "Nothing staged, skipping save");
            return Ok(());
        }

        let (start, region) = match self.assemble() {
            Ok(assembled) => assembled,
            Err(e) => return Err(self.save_failed(e)),
        };
        if let Err(e) = self.write_region(start, &region) {
            return Err(self.save_failed(e));
        }

        info!(
            target: "craftkit::archive",
            path = %self.path.display(),
            saved = self.queue.len(),
            entries = self.entries.len(),
            "Saved archive"
        );
        self.reload()
    }

    fn save_failed(&self, err: ArchiveError) -> ArchiveError {
        warn!(
            target: "craftkit::archive",
            path = %self.path.display(),
            staged = self.queue.len(),
            error = %err,
            "Archive save failed"
        );
        err
    }

    /// Build the bytes written from the old metadata start to the new end
    fn assemble(&self) -> Result<(u64, Vec<u8>)> {
        let metadata_size = self.variant.metadata_size() as u64;
        let start = self.table_offset - metadata_size;

        let mut offsets = vec![None; self.entries.len()];
        let mut cursor = start;
        for &index in &self.queue {
            offsets[index] = Some(to_offset(cursor)?);
            cursor += u64::from(self.entries[index].size());
        }
        let padding = if self.variant.aligns_payloads() {
            (PAYLOAD_ALIGNMENT - cursor % PAYLOAD_ALIGNMENT) % PAYLOAD_ALIGNMENT
        } else {
            0
        };

        let capacity = (cursor - start + padding) as usize
            + self.metadata.len()
            + self.entries.len() * ENTRY_RECORD_SIZE
            + self.variant.trailer_size();
        let mut writer = ByteWriter::new(capacity).with_endian(self.config.endian);

        for &index in &self.queue {
            let payload = self.payloads[index]
                .as_deref()
                .ok_or_else(|| ArchiveError::format("staged entry lost its payload"))?;
            writer.bytes(payload)?;
        }
        writer.pad(padding as usize)?;
        writer.bytes(&self.metadata)?;

        for (entry, assigned) in self.entries.iter().zip(&offsets) {
            let offset = assigned
                .or(entry.offset())
                .ok_or_else(|| ArchiveError::format("entry has no offset"))?;
            entry.write(&mut writer, offset)?;
        }

        if self.variant.has_checksum() {
            writer.bytes(&self.checksum)?;
        }
        if self.variant.has_reserved_word() {
            writer.u32(0, true)?;
        }
        let count = u32::try_from(self.entries.len())
            .map_err(|_| ArchiveError::format("entry count exceeds u32"))?;
        writer.u32(count, true)?;
        writer.bytes(&self.variant.tag())?;

        Ok((start, writer.into_bytes()))
    }

    fn write_region(&self, start: u64, region: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(start))?;
        file.write_all(region)?;
        file.set_len(start + region.len() as u64)?;
        if self.config.sync_on_save {
            file.sync_all()?;
        }
        Ok(())
    }
}

fn to_offset(position: u64) -> Result<u32> {
    u32::try_from(position)
        .map_err(|_| ArchiveError::format(format!("offset {position} exceeds 4 GiB")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create(dir: &TempDir, variant: ArchiveVariant) -> Archive {
        Archive::create(
            dir.path().join("data.farc"),
            variant,
            ArchiveConfig::for_testing(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_empty() {
        let dir = TempDir::new().unwrap();
        for variant in ArchiveVariant::ALL {
            let path = dir.path().join(format!("{variant}.farc"));
            let archive = Archive::create(&path, variant, ArchiveConfig::for_testing()).unwrap();
            assert!(archive.is_parsed());
            assert!(archive.is_empty());
            assert_eq!(archive.variant(), variant);
            assert_eq!(archive.metadata().len(), variant.metadata_size());
            assert_eq!(archive.table_offset(), variant.metadata_size() as u64);
            let size = std::fs::metadata(&path).unwrap().len();
            assert_eq!(size as usize, variant.metadata_size() + variant.trailer_size());
        }
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        create(&dir, ArchiveVariant::Farc);
        let err = Archive::create(
            dir.path().join("data.farc"),
            ArchiveVariant::Farc,
            ArchiveConfig::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_add_deduplicates() {
        let dir = TempDir::new().unwrap();
        let mut archive = create(&dir, ArchiveVariant::Farc);
        let first = archive.add(b"hello").unwrap();
        let second = archive.add(b"hello").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Sha1Hash::of(b"hello"));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.queued().count(), 1);
        assert_eq!(archive.queue_size(), (ENTRY_RECORD_SIZE + 5) as u64);
        assert!(archive.is_dirty());
        assert!(archive.find(&first).unwrap().is_pending());
    }

    #[test]
    fn test_staged_payload_extractable_before_save() {
        let dir = TempDir::new().unwrap();
        let mut archive = create(&dir, ArchiveVariant::Far4);
        let hash = archive.add(b"staged").unwrap();
        assert_eq!(archive.extract(&hash).unwrap(), Some(&b"staged"[..]));
        assert_eq!(archive.extract(&Sha1Hash::of(b"other")).unwrap(), None);
        assert_eq!(archive.extract_entry(5).unwrap(), None);
    }

    #[test]
    fn test_save_with_empty_queue_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut archive = create(&dir, ArchiveVariant::Far5);
        let before = std::fs::read(archive.path()).unwrap();
        archive.save().unwrap();
        assert_eq!(std::fs::read(archive.path()).unwrap(), before);
    }

    #[test]
    fn test_far4_payloads_padded_to_alignment() {
        let dir = TempDir::new().unwrap();
        let mut archive = create(&dir, ArchiveVariant::Far4);
        archive.add(b"abc").unwrap();
        archive.save().unwrap();
        // 3 payload bytes + 1 padding ahead of the metadata block
        assert_eq!(archive.table_offset(), 4 + 132);
        assert_eq!(archive.entries()[0].offset(), Some(0));
    }

    #[test]
    fn test_entry_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.farc");
        let config = ArchiveConfig::for_testing().with_max_entry_count(1);
        let mut archive = Archive::create(&path, ArchiveVariant::Farc, config).unwrap();
        archive.add(b"one").unwrap();
        assert!(matches!(
            archive.add(b"two"),
            Err(ArchiveError::EntryLimit { limit: 1 })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let err = Archive::open(
            dir.path().join("x.farc"),
            ArchiveConfig::default().with_max_entry_count(0),
        )
        .unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
    }
}
