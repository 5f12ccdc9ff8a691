//! chunkfs
//!
//! Random-access byte streams over chunked document storage.
//!
//! `chunkfs` splits a large logical file into fixed-size chunks, each stored
//! as an independent record keyed by `(file id, chunk index)`, and gives the
//! file ordinary read/write/seek semantics on top. It is designed for
//! storing blobs inside a document or key/value database:
//!
//! - attachments and media in an embedded database
//! - GridFS-style file collections
//! - blobs that must live next to the records that reference them
//!
//! The crate intentionally:
//! - does NOT implement a storage engine (bring a [`ChunkStore`])
//! - does NOT encrypt or compress chunks
//! - does NOT coordinate concurrent writers of the same file
//!
//! A stream keeps one chunk in memory at a time. Moving out of it flushes
//! the chunk if it was modified and loads the chunk under the new position.
//!
//! # Stream
//!
//! ```
//! use std::io::{Read, Write};
//! use chunkfs::{
//!     ChunkStore, ChunkedFileStream, FileId, FileMetadata, MemoryChunkStore, OpenMode,
//!     StreamConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = MemoryChunkStore::new();
//!     let id = FileId::from("report.pdf");
//!     store.write_metadata(&FileMetadata::new(id.clone(), "report.pdf"))?;
//!
//!     let config = StreamConfig::default();
//!     let mut out = ChunkedFileStream::open(&mut store, &id, OpenMode::Write, config)?;
//!     out.write_all(&vec![42u8; 600 * 1024])?;
//!     out.close()?;
//!     drop(out);
//!
//!     let meta = store.read_metadata(&id)?.unwrap();
//!     assert_eq!(meta.chunk_count, 3);
//!
//!     let mut input = ChunkedFileStream::open(&mut store, &id, OpenMode::Read, config)?;
//!     let mut data = Vec::new();
//!     input.read_to_end(&mut data)?;
//!     assert_eq!(data.len(), 600 * 1024);
//!     Ok(())
//! }
//! ```
//!
//! # Whole files
//!
//! ```
//! use chunkfs::{FileId, FileStorage, MemoryChunkStore};
//!
//! let mut fs = FileStorage::new(MemoryChunkStore::new());
//! fs.upload(&FileId::from("a"), "a.txt", &b"contents"[..])?;
//! assert!(fs.exists(&FileId::from("a"))?);
//! # Ok::<(), chunkfs::StreamError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod config;
mod error;
mod meta;
mod storage;
mod store;
mod stream;

mod hash; // internal blake3 impl
mod window; // internal single-chunk buffer

//
// Public surface
//

pub use chunk::{Chunk, ChunkHash};
pub use config::{HashConfig, MAX_CHUNK_SIZE, StreamConfig};
pub use error::{StoreError, StoreResult, StreamError, StreamResult};
pub use meta::{FileId, FileMetadata};
pub use storage::FileStorage;
pub use store::{ChunkStore, MemoryChunkStore, StoreStats};
pub use stream::{ChunkedFileStream, OpenMode, SeekOrigin};
