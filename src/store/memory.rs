//! In-memory chunk store.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

use super::ChunkStore;
use crate::chunk::Chunk;
use crate::error::{StoreError, StoreResult};
use crate::meta::{FileId, FileMetadata};

#[derive(Debug, Default)]
struct Telemetry {
    metadata_reads: AtomicU64,
    metadata_writes: AtomicU64,
    metadata_deletes: AtomicU64,
    metadata_lists: AtomicU64,
    chunk_reads: AtomicU64,
    chunk_writes: AtomicU64,
    range_deletes: AtomicU64,
}

impl Telemetry {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StoreStats {
        StoreStats {
            metadata_reads: self.metadata_reads.load(Ordering::Relaxed),
            metadata_writes: self.metadata_writes.load(Ordering::Relaxed),
            metadata_deletes: self.metadata_deletes.load(Ordering::Relaxed),
            metadata_lists: self.metadata_lists.load(Ordering::Relaxed),
            chunk_reads: self.chunk_reads.load(Ordering::Relaxed),
            chunk_writes: self.chunk_writes.load(Ordering::Relaxed),
            range_deletes: self.range_deletes.load(Ordering::Relaxed),
        }
    }
}

/// Counts of adapter calls made against a [`MemoryChunkStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `read_metadata` calls.
    pub metadata_reads: u64,
    /// `write_metadata` calls.
    pub metadata_writes: u64,
    /// `delete_metadata` calls.
    pub metadata_deletes: u64,
    /// `list_metadata` calls.
    pub metadata_lists: u64,
    /// `read_chunk` calls.
    pub chunk_reads: u64,
    /// `write_chunk` calls.
    pub chunk_writes: u64,
    /// `delete_chunk_range` calls.
    pub range_deletes: u64,
}

impl StoreStats {
    /// Total number of adapter calls.
    pub fn total(&self) -> u64 {
        self.metadata_reads
            + self.metadata_writes
            + self.metadata_deletes
            + self.metadata_lists
            + self.chunk_reads
            + self.chunk_writes
            + self.range_deletes
    }
}

/// A [`ChunkStore`] held entirely in memory.
///
/// Chunks are kept in a `BTreeMap` ordered by `(file id, index)`, so range
/// deletes walk only the affected keys. Every call is counted; see
/// [`stats`](Self::stats).
///
/// # Example
///
/// ```
/// use chunkfs::{ChunkStore, FileId, FileMetadata, MemoryChunkStore};
///
/// let mut store = MemoryChunkStore::new();
/// store.write_metadata(&FileMetadata::new(FileId::from("a"), "a.txt"))?;
///
/// assert!(store.read_metadata(&FileId::from("a"))?.is_some());
/// assert_eq!(store.stats().metadata_writes, 1);
/// # Ok::<(), chunkfs::StoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    files: BTreeMap<FileId, FileMetadata>,
    chunks: BTreeMap<(FileId, u64), Chunk>,
    telemetry: Telemetry,
    fail_writes: bool,
}

impl MemoryChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the call counters.
    pub fn stats(&self) -> StoreStats {
        self.telemetry.snapshot()
    }

    /// Makes every subsequent write fail with [`StoreError::Backend`] until
    /// switched off again.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of chunk records stored for `file_id`.
    pub fn chunk_len(&self, file_id: &FileId) -> usize {
        self.keys_in(file_id, 0..=u64::MAX).len()
    }

    /// Returns the stored bytes of one chunk without counting a read.
    pub fn peek_chunk(&self, file_id: &FileId, index: u64) -> Option<&[u8]> {
        self.chunks
            .get(&(file_id.clone(), index))
            .map(|c| c.data.as_ref())
    }

    /// Replaces the stored bytes of a chunk, keeping its recorded hash.
    /// Returns false if the chunk does not exist.
    pub fn tamper_chunk(&mut self, file_id: &FileId, index: u64, data: &[u8]) -> bool {
        match self.chunks.get_mut(&(file_id.clone(), index)) {
            Some(chunk) => {
                chunk.data = bytes::Bytes::copy_from_slice(data);
                true
            }
            None => false,
        }
    }

    fn keys_in(&self, file_id: &FileId, range: RangeInclusive<u64>) -> Vec<(FileId, u64)> {
        let lo = (file_id.clone(), *range.start());
        let hi = (file_id.clone(), *range.end());
        self.chunks.range(lo..=hi).map(|(k, _)| k.clone()).collect()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        Ok(())
    }
}

impl ChunkStore for MemoryChunkStore {
    fn read_metadata(&self, file_id: &FileId) -> StoreResult<Option<FileMetadata>> {
        Telemetry::bump(&self.telemetry.metadata_reads);
        Ok(self.files.get(file_id).cloned())
    }

    fn write_metadata(&mut self, meta: &FileMetadata) -> StoreResult<()> {
        Telemetry::bump(&self.telemetry.metadata_writes);
        self.check_writable()?;
        self.files.insert(meta.file_id.clone(), meta.clone());
        Ok(())
    }

    fn delete_metadata(&mut self, file_id: &FileId) -> StoreResult<bool> {
        Telemetry::bump(&self.telemetry.metadata_deletes);
        self.check_writable()?;
        Ok(self.files.remove(file_id).is_some())
    }

    fn list_metadata(&self) -> StoreResult<Vec<FileMetadata>> {
        Telemetry::bump(&self.telemetry.metadata_lists);
        Ok(self.files.values().cloned().collect())
    }

    fn read_chunk(&self, file_id: &FileId, index: u64) -> StoreResult<Option<Chunk>> {
        Telemetry::bump(&self.telemetry.chunk_reads);
        Ok(self.chunks.get(&(file_id.clone(), index)).cloned())
    }

    fn write_chunk(&mut self, chunk: Chunk) -> StoreResult<()> {
        Telemetry::bump(&self.telemetry.chunk_writes);
        self.check_writable()?;
        self.chunks.insert((chunk.file_id.clone(), chunk.index), chunk);
        Ok(())
    }

    fn delete_chunk_range(
        &mut self,
        file_id: &FileId,
        range: RangeInclusive<u64>,
    ) -> StoreResult<u64> {
        Telemetry::bump(&self.telemetry.range_deletes);
        self.check_writable()?;
        let keys = self.keys_in(file_id, range);
        for key in &keys {
            self.chunks.remove(key);
        }
        Ok(keys.len() as u64)
    }
}
