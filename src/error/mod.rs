//! Error types for chunkfs.
//!
//! - [`StreamError`] - Failures surfaced by [`ChunkedFileStream`](crate::ChunkedFileStream)
//! - [`StoreError`] - Failures raised by a [`ChunkStore`](crate::ChunkStore) adapter

use std::io;

use thiserror::Error;

use crate::chunk::ChunkHash;
use crate::meta::FileId;

/// Errors raised by a chunk store adapter.
///
/// The stream never inspects these; they travel to the caller unchanged
/// inside [`StreamError::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred in the backing storage.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend rejected the operation.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while opening or driving a chunked stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A call violated the stream contract (bad seek target, bad config).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The operation is not available on this stream.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    /// Purging a file before rewrite removed a different number of chunks
    /// than the metadata recorded.
    #[error("chunk count mismatch for {file_id}: metadata records {expected}, store deleted {actual}")]
    Consistency {
        /// File whose chunks were purged.
        file_id: FileId,
        /// Chunk count recorded in the file metadata.
        expected: u64,
        /// Number of chunk records the store actually deleted.
        actual: u64,
    },

    /// No metadata exists for the requested file.
    #[error("file not found: {0}")]
    NotFound(FileId),

    /// A loaded chunk did not match its recorded hash.
    #[error("checksum mismatch in chunk {index} of {file_id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// File the chunk belongs to.
        file_id: FileId,
        /// Chunk index.
        index: u64,
        /// Hash stored with the chunk.
        expected: ChunkHash,
        /// Hash of the loaded bytes.
        actual: ChunkHash,
    },

    /// A stored chunk is longer than the chunk size the stream was opened
    /// with, so the file was written with a different geometry.
    #[error("chunk {index} of {file_id} holds {len} bytes, more than the chunk size {chunk_size}")]
    OversizedChunk {
        /// File the chunk belongs to.
        file_id: FileId,
        /// Chunk index.
        index: u64,
        /// Stored length of the chunk.
        len: usize,
        /// Configured chunk size.
        chunk_size: usize,
    },

    /// The stream has already been closed.
    #[error("stream is closed")]
    Closed,

    /// The chunk store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for stream operations.
pub type StreamResult<T> = std::result::Result<T, StreamError>;

impl From<io::Error> for StreamError {
    /// Unwraps a `StreamError` that was carried through an `io::Error`;
    /// anything else is treated as a store I/O failure.
    fn from(e: io::Error) -> Self {
        match e.downcast::<StreamError>() {
            Ok(inner) => inner,
            Err(e) => StreamError::Store(StoreError::Io(e)),
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        let kind = match &e {
            StreamError::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            StreamError::NotSupported(_) => io::ErrorKind::Unsupported,
            StreamError::NotFound(_) => io::ErrorKind::NotFound,
            StreamError::ChecksumMismatch { .. }
            | StreamError::Consistency { .. }
            | StreamError::OversizedChunk { .. } => io::ErrorKind::InvalidData,
            StreamError::Closed => io::ErrorKind::BrokenPipe,
            StreamError::Store(StoreError::Io(inner)) => inner.kind(),
            StreamError::Store(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
