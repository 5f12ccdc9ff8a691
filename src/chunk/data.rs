//! The Chunk type - one persisted record of a chunked file.

use bytes::Bytes;
use std::fmt;

use super::ChunkHash;
use crate::meta::FileId;

/// A chunk record as exchanged with a [`ChunkStore`](crate::ChunkStore).
///
/// Chunks are addressed by the composite key `(file_id, index)`. The data
/// is at most [`MAX_CHUNK_SIZE`](crate::MAX_CHUNK_SIZE) bytes; only the last
/// chunk of a closed file may be shorter than the stream's chunk size.
///
/// # Example
///
/// ```
/// use chunkfs::{Chunk, FileId};
/// use bytes::Bytes;
///
/// let chunk = Chunk::new(FileId::from("photo.jpg"), 2, Bytes::from_static(b"hello"));
///
/// assert_eq!(chunk.len(), 5);
/// assert_eq!(chunk.start(4), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The file this chunk belongs to.
    pub file_id: FileId,

    /// Position of the chunk within the file, starting at 0.
    pub index: u64,

    /// The chunk data.
    pub data: Bytes,

    /// Integrity hash of `data` (if computed).
    pub hash: Option<ChunkHash>,
}

impl Chunk {
    /// Creates a chunk without a hash.
    pub fn new(file_id: FileId, index: u64, data: impl Into<Bytes>) -> Self {
        Self {
            file_id,
            index,
            data: data.into(),
            hash: None,
        }
    }

    /// Sets the hash.
    pub fn set_hash(mut self, hash: ChunkHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the file offset of the first byte, given the chunk size.
    pub fn start(&self, chunk_size: usize) -> u64 {
        self.index * chunk_size as u64
    }

    /// Returns the file byte range this chunk's data covers.
    pub fn range(&self, chunk_size: usize) -> std::ops::Range<u64> {
        let start = self.start(chunk_size);
        start..start + self.data.len() as u64
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({}#{}, {} bytes", self.file_id, self.index, self.len())?;
        if let Some(hash) = self.hash {
            write!(f, ", hash={}", &hash.to_hex()[..16])?;
        }
        write!(f, ")")
    }
}
