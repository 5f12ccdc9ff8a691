//! Chunk store adapters.
//!
//! A [`ChunkStore`] persists chunk records and file metadata. The stream
//! treats it as durable and consistent and never looks past this trait.
//!
//! - [`ChunkStore`] - Point lookup, upsert and range delete over chunk records
//! - [`MemoryChunkStore`] - In-memory reference adapter with call counters

mod memory;

use std::ops::RangeInclusive;

use crate::chunk::Chunk;
use crate::error::StoreResult;
use crate::meta::{FileId, FileMetadata};

pub use memory::{MemoryChunkStore, StoreStats};

/// Persistence for chunk records and file metadata.
///
/// Writes are upserts: writing a chunk or metadata record replaces any
/// record with the same key. Calls are synchronous; an adapter wrapping an
/// asynchronous backend must complete each call before returning.
pub trait ChunkStore {
    /// Loads the metadata record of a file, or `None` if it does not exist.
    fn read_metadata(&self, file_id: &FileId) -> StoreResult<Option<FileMetadata>>;

    /// Inserts or replaces a file's metadata record.
    fn write_metadata(&mut self, meta: &FileMetadata) -> StoreResult<()>;

    /// Removes a file's metadata record. Returns whether it existed.
    fn delete_metadata(&mut self, file_id: &FileId) -> StoreResult<bool>;

    /// Returns every metadata record, ordered by file id.
    fn list_metadata(&self) -> StoreResult<Vec<FileMetadata>>;

    /// Loads one chunk, or `None` if no record exists for the key.
    fn read_chunk(&self, file_id: &FileId, index: u64) -> StoreResult<Option<Chunk>>;

    /// Inserts or replaces the chunk at `(chunk.file_id, chunk.index)`.
    fn write_chunk(&mut self, chunk: Chunk) -> StoreResult<()>;

    /// Deletes the chunks of `file_id` whose index falls in `range`.
    /// Returns the number of records removed.
    fn delete_chunk_range(&mut self, file_id: &FileId, range: RangeInclusive<u64>)
    -> StoreResult<u64>;

    /// Deletes every chunk of `file_id`.
    fn delete_chunks(&mut self, file_id: &FileId) -> StoreResult<u64> {
        self.delete_chunk_range(file_id, 0..=u64::MAX)
    }
}

impl<S: ChunkStore + ?Sized> ChunkStore for &mut S {
    fn read_metadata(&self, file_id: &FileId) -> StoreResult<Option<FileMetadata>> {
        (**self).read_metadata(file_id)
    }

    fn write_metadata(&mut self, meta: &FileMetadata) -> StoreResult<()> {
        (**self).write_metadata(meta)
    }

    fn delete_metadata(&mut self, file_id: &FileId) -> StoreResult<bool> {
        (**self).delete_metadata(file_id)
    }

    fn list_metadata(&self) -> StoreResult<Vec<FileMetadata>> {
        (**self).list_metadata()
    }

    fn read_chunk(&self, file_id: &FileId, index: u64) -> StoreResult<Option<Chunk>> {
        (**self).read_chunk(file_id, index)
    }

    fn write_chunk(&mut self, chunk: Chunk) -> StoreResult<()> {
        (**self).write_chunk(chunk)
    }

    fn delete_chunk_range(
        &mut self,
        file_id: &FileId,
        range: RangeInclusive<u64>,
    ) -> StoreResult<u64> {
        (**self).delete_chunk_range(file_id, range)
    }

    fn delete_chunks(&mut self, file_id: &FileId) -> StoreResult<u64> {
        (**self).delete_chunks(file_id)
    }
}
