//! File-level operations over a chunk store.
//!
//! [`FileStorage`] ties a [`ChunkStore`] to a [`StreamConfig`] and offers the
//! whole-file operations callers usually want: open, upload, download,
//! delete and lookup.

use std::io::{self, Read, Write};

use crate::config::StreamConfig;
use crate::error::StreamResult;
use crate::meta::{FileId, FileMetadata};
use crate::store::ChunkStore;
use crate::stream::{ChunkedFileStream, OpenMode};

/// Whole-file operations over a chunk store.
///
/// # Example
///
/// ```
/// use chunkfs::{FileId, FileStorage, MemoryChunkStore};
///
/// let mut fs = FileStorage::new(MemoryChunkStore::new());
/// let id = FileId::from("greeting");
///
/// fs.upload(&id, "greeting.txt", &b"hello world"[..])?;
///
/// let mut out = Vec::new();
/// assert_eq!(fs.download(&id, &mut out)?, 11);
/// assert_eq!(out, b"hello world");
/// # Ok::<(), chunkfs::StreamError>(())
/// ```
#[derive(Debug)]
pub struct FileStorage<S: ChunkStore> {
    store: S,
    config: StreamConfig,
}

impl<S: ChunkStore> FileStorage<S> {
    /// Creates a file storage with the default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: StreamConfig::default(),
        }
    }

    /// Creates a file storage with a custom configuration.
    pub fn with_config(store: S, config: StreamConfig) -> StreamResult<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Returns the configuration used for every stream.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the storage and returns the store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Looks up a file's metadata.
    pub fn find_by_id(&self, file_id: &FileId) -> StreamResult<Option<FileMetadata>> {
        Ok(self.store.read_metadata(file_id)?)
    }

    /// Returns true if the file exists.
    pub fn exists(&self, file_id: &FileId) -> StreamResult<bool> {
        Ok(self.find_by_id(file_id)?.is_some())
    }

    /// Returns the metadata of every file.
    pub fn find_all(&self) -> StreamResult<Vec<FileMetadata>> {
        Ok(self.store.list_metadata()?)
    }

    /// Opens an existing file for reading.
    pub fn open_read(&mut self, file_id: &FileId) -> StreamResult<ChunkedFileStream<&mut S>> {
        ChunkedFileStream::open(&mut self.store, file_id, OpenMode::Read, self.config)
    }

    /// Opens a file for writing, creating it if needed.
    ///
    /// An existing file keeps its id but takes the new `filename`, and its
    /// content is discarded.
    pub fn open_write(
        &mut self,
        file_id: &FileId,
        filename: &str,
    ) -> StreamResult<ChunkedFileStream<&mut S>> {
        let meta = match self.store.read_metadata(file_id)? {
            Some(meta) if meta.filename == filename => None,
            Some(meta) => Some(FileMetadata {
                filename: filename.to_owned(),
                ..meta
            }),
            None => Some(FileMetadata::new(file_id.clone(), filename)),
        };
        if let Some(meta) = meta {
            self.store.write_metadata(&meta)?;
        }

        ChunkedFileStream::open(&mut self.store, file_id, OpenMode::Write, self.config)
    }

    /// Copies everything from `reader` into the file, replacing any previous
    /// content. Returns the stored metadata.
    pub fn upload<R: Read>(
        &mut self,
        file_id: &FileId,
        filename: &str,
        mut reader: R,
    ) -> StreamResult<FileMetadata> {
        let mut stream = self.open_write(file_id, filename)?;
        let copied = io::copy(&mut reader, &mut stream);
        // close even if the copy failed so the window is released
        let closed = stream.close();
        copied?;
        closed?;

        let meta = stream.metadata().clone();
        tracing::debug!(%file_id, length = meta.length, "uploaded file");
        Ok(meta)
    }

    /// Copies the whole file into `writer`. Returns the number of bytes.
    pub fn download<W: Write>(&mut self, file_id: &FileId, mut writer: W) -> StreamResult<u64> {
        let mut stream = self.open_read(file_id)?;
        let n = io::copy(&mut stream, &mut writer)?;
        stream.close()?;
        Ok(n)
    }

    /// Deletes a file and all its chunks. Returns false if it did not exist.
    pub fn delete(&mut self, file_id: &FileId) -> StreamResult<bool> {
        if !self.exists(file_id)? {
            return Ok(false);
        }

        let deleted = self.store.delete_chunks(file_id)?;
        self.store.delete_metadata(file_id)?;
        tracing::debug!(%file_id, chunks = deleted, "deleted file");
        Ok(true)
    }
}
