//! The chunked file stream.
//!
//! A [`ChunkedFileStream`] keeps exactly one chunk of its file in memory (the
//! window). Reads and writes work on that window; whenever the stream
//! position leaves it, the window is flushed if dirty and the chunk under
//! the new position is loaded in its place.
//!
//! # Example
//!
//! ```
//! use chunkfs::{
//!     ChunkStore, ChunkedFileStream, FileId, FileMetadata, MemoryChunkStore, OpenMode,
//!     SeekOrigin, StreamConfig,
//! };
//!
//! let mut store = MemoryChunkStore::new();
//! let id = FileId::from("notes.txt");
//! store.write_metadata(&FileMetadata::new(id.clone(), "notes.txt"))?;
//!
//! let config = StreamConfig::new(4)?;
//! let mut writer = ChunkedFileStream::open(&mut store, &id, OpenMode::Write, config)?;
//! writer.write(b"hello chunks")?;
//! writer.close()?;
//! drop(writer);
//!
//! let mut reader = ChunkedFileStream::open(&mut store, &id, OpenMode::Read, config)?;
//! reader.seek(6, SeekOrigin::Begin)?;
//! let mut buf = [0u8; 6];
//! assert_eq!(reader.read(&mut buf)?, 6);
//! assert_eq!(&buf, b"chunks");
//! # Ok::<(), chunkfs::StreamError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use super::{OpenMode, SeekOrigin};
use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use crate::meta::{FileId, FileMetadata};
use crate::store::ChunkStore;
use crate::window::Window;

/// A seekable byte stream over the chunk records of one file.
///
/// # Modes
///
/// - [`OpenMode::Read`] loads the metadata and chunk 0 up front. Reads stop
///   at the file length.
/// - [`OpenMode::Write`] always starts from an empty file: any existing
///   chunks are deleted when the stream opens. There is no in-place patching.
///
/// # Sparse writes
///
/// Seeking past the end is allowed; writing there grows the file and the
/// skipped bytes read back as zero. Chunks that were skipped entirely are
/// written as zero-filled records by the flush that moves the end of the
/// file past them, so the store always has one record per chunk index the
/// metadata counts.
///
/// # Closing
///
/// [`close`](Self::close) flushes and releases the window. Dropping an
/// unclosed stream closes it and logs any error; call `close` to observe it.
/// A stream is single-owner: it has no internal locking.
pub struct ChunkedFileStream<S: ChunkStore> {
    store: S,
    meta: FileMetadata,
    config: StreamConfig,
    mode: OpenMode,
    position: u64,
    // None once closed
    window: Option<Window>,
    // bytes persisted per chunk index during this write session
    persisted: BTreeMap<u64, usize>,
}

impl<S: ChunkStore> ChunkedFileStream<S> {
    /// Opens the file `file_id` in `store`.
    ///
    /// The file's metadata record must already exist. In write mode a file
    /// with content has all its chunks deleted first; if the number deleted
    /// differs from the recorded chunk count the open fails with
    /// [`StreamError::Consistency`].
    pub fn open(
        mut store: S,
        file_id: &FileId,
        mode: OpenMode,
        config: StreamConfig,
    ) -> StreamResult<Self> {
        config.validate()?;

        let mut meta = store
            .read_metadata(file_id)?
            .ok_or_else(|| StreamError::NotFound(file_id.clone()))?;

        let window = match mode {
            OpenMode::Read => Window::load(&store, file_id, 0, &config)?,
            OpenMode::Write => {
                if meta.length > 0 {
                    let deleted = store.delete_chunks(file_id)?;
                    if deleted != meta.chunk_count {
                        return Err(StreamError::Consistency {
                            file_id: file_id.clone(),
                            expected: meta.chunk_count,
                            actual: deleted,
                        });
                    }
                    tracing::debug!(%file_id, deleted, "purged chunks before rewrite");

                    meta.reset();
                    store.write_metadata(&meta)?;
                }
                Window::blank(0, config.chunk_size())
            }
        };

        tracing::debug!(%file_id, ?mode, length = meta.length, "opened chunked stream");

        Ok(Self {
            store,
            meta,
            config,
            mode,
            position: 0,
            window: Some(window),
            persisted: BTreeMap::new(),
        })
    }

    /// Returns the id of the file.
    pub fn file_id(&self) -> &FileId {
        &self.meta.file_id
    }

    /// Returns the metadata as of the last flush.
    pub fn metadata(&self) -> &FileMetadata {
        &self.meta
    }

    /// Returns the current length of the file, including bytes written
    /// since the last flush.
    pub fn length(&self) -> u64 {
        let pending = self
            .window
            .as_ref()
            .and_then(Window::written_end)
            .unwrap_or(0);
        self.meta.length.max(pending)
    }

    /// Returns the chunk count as of the last flush.
    pub fn chunk_count(&self) -> u64 {
        self.meta.chunk_count
    }

    /// Returns the current position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Moves to an absolute position. Same as `seek(position, Begin)`.
    pub fn set_position(&mut self, position: u64) -> StreamResult<()> {
        let offset = i64::try_from(position)
            .map_err(|_| StreamError::InvalidArgument("position does not fit a seek offset"))?;
        self.seek(offset, SeekOrigin::Begin).map(|_| ())
    }

    /// Returns the mode the stream was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Returns true if the stream was opened for reading.
    pub fn can_read(&self) -> bool {
        self.mode == OpenMode::Read
    }

    /// Returns true if the stream was opened for writing.
    pub fn can_write(&self) -> bool {
        self.mode == OpenMode::Write
    }

    /// Streams are always seekable.
    pub fn can_seek(&self) -> bool {
        true
    }

    /// Returns true once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.window.is_none()
    }

    /// Returns the configuration the stream was opened with.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Gets a reference to the underlying store.
    pub fn get_ref(&self) -> &S {
        &self.store
    }

    /// Gets a mutable reference to the underlying store.
    ///
    /// Writing chunks of this file through it while the stream is open
    /// leaves the stream's window stale.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads up to `buf.len()` bytes from the current position.
    ///
    /// Returns the number of bytes read; fewer than requested only at the
    /// end of the file.
    pub fn read(&mut self, buf: &mut [u8]) -> StreamResult<usize> {
        self.ensure_open()?;
        if self.mode != OpenMode::Read {
            return Err(StreamError::NotSupported("stream was opened for writing"));
        }

        let length = self.length();
        let mut total = 0;

        while total < buf.len() && self.position < length {
            let position = self.position;
            if !self.current()?.contains(position) {
                self.move_to(position)?;
            }

            let window = self.current()?;
            let offset = (position - window.lower()) as usize;
            let want = (length - position).min((buf.len() - total) as u64) as usize;
            let n = window.read_at(offset, &mut buf[total..total + want]);

            self.position += n as u64;
            total += n;
        }

        Ok(total)
    }

    /// Writes all of `buf` at the current position, crossing into following
    /// chunks as needed.
    pub fn write(&mut self, buf: &[u8]) -> StreamResult<()> {
        self.ensure_open()?;
        if self.mode != OpenMode::Write {
            return Err(StreamError::NotSupported("stream was opened for reading"));
        }

        let mut rest = buf;
        while !rest.is_empty() {
            let position = self.position;
            if !self.current()?.contains(position) {
                self.move_to(position)?;
            }

            let window = self.current_mut()?;
            let offset = (position - window.lower()) as usize;
            let n = window.write_at(offset, rest);

            self.position += n as u64;
            rest = &rest[n..];
        }

        Ok(())
    }

    /// Moves the position and returns the new absolute position.
    ///
    /// - `Begin`: `offset` must be non-negative.
    /// - `Current`: moves by `offset` from the current position.
    /// - `End`: `offset` must be positive; the target is `length - offset`.
    ///
    /// A target before the start of the file is rejected with
    /// [`StreamError::InvalidArgument`] and leaves the stream unchanged.
    /// Seeking past the end is allowed.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> StreamResult<u64> {
        self.ensure_open()?;

        let target = match origin {
            SeekOrigin::Begin => u64::try_from(offset).map_err(|_| {
                StreamError::InvalidArgument("attempted to seek before the beginning of the stream")
            })?,
            SeekOrigin::Current => self.position.checked_add_signed(offset).ok_or(
                StreamError::InvalidArgument("attempted to seek before the beginning of the stream"),
            )?,
            SeekOrigin::End => {
                if offset <= 0 {
                    return Err(StreamError::InvalidArgument(
                        "seeking from the end requires a positive offset",
                    ));
                }
                self.length().checked_sub(offset.unsigned_abs()).ok_or(
                    StreamError::InvalidArgument(
                        "attempted to seek before the beginning of the stream",
                    ),
                )?
            }
        };

        self.move_to(target)?;
        Ok(self.position)
    }

    /// Persists the window if it is dirty, together with the updated
    /// metadata. A no-op on a clean window.
    pub fn flush(&mut self) -> StreamResult<()> {
        self.ensure_open()?;
        self.flush_window()
    }

    /// Changing the length directly is not supported.
    pub fn set_length(&mut self, _length: u64) -> StreamResult<()> {
        Err(StreamError::NotSupported("set_length"))
    }

    /// Flushes a write stream and releases the window.
    ///
    /// The window is released even if flushing fails. Closing an already
    /// closed stream does nothing.
    pub fn close(&mut self) -> StreamResult<()> {
        if self.window.is_none() {
            return Ok(());
        }

        let result = match self.mode {
            OpenMode::Write => self.flush_window(),
            OpenMode::Read => Ok(()),
        };

        self.window = None;
        self.persisted.clear();

        tracing::debug!(
            file_id = %self.meta.file_id,
            length = self.meta.length,
            chunks = self.meta.chunk_count,
            ok = result.is_ok(),
            "closed chunked stream"
        );
        result
    }

    fn ensure_open(&self) -> StreamResult<()> {
        if self.window.is_none() {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    fn current(&self) -> StreamResult<&Window> {
        self.window.as_ref().ok_or(StreamError::Closed)
    }

    fn current_mut(&mut self) -> StreamResult<&mut Window> {
        self.window.as_mut().ok_or(StreamError::Closed)
    }

    /// Points the stream at `target`, swapping the window if `target` lies
    /// outside it.
    ///
    /// On failure nothing moves: a failed flush leaves the window dirty and
    /// a failed load keeps the old window.
    fn move_to(&mut self, target: u64) -> StreamResult<()> {
        let window = self.current()?;
        if window.contains(target) {
            self.position = target;
            return Ok(());
        }

        let from = window.index();
        if window.is_dirty() {
            self.flush_window()?;
        }

        let index = target / self.config.chunk_size() as u64;
        let next = Window::load(&self.store, &self.meta.file_id, index, &self.config)?;

        tracing::trace!(
            file_id = %self.meta.file_id,
            from,
            to = index,
            position = target,
            "moved chunk window"
        );

        self.window = Some(next);
        self.position = target;
        Ok(())
    }

    /// Persists the dirty window, then the metadata.
    ///
    /// Gaps below the new last chunk are filled before the metadata is
    /// written, so the stored records always match `chunk_count`. On any
    /// failure the window stays dirty and the metadata is not updated.
    fn flush_window(&mut self) -> StreamResult<()> {
        let window = self.current()?;
        if !window.is_dirty() {
            return Ok(());
        }

        let chunk_size = self.config.chunk_size() as u64;
        let length = self.meta.length.max(window.written_end().unwrap_or(0));
        let extent = length.saturating_sub(window.lower()).min(chunk_size) as usize;

        let chunk = window.to_chunk(&self.meta.file_id, extent, &self.config);
        let index = chunk.index;
        self.store.write_chunk(chunk)?;
        self.persisted.insert(index, extent);

        let filled = self.fill_gaps(length)?;

        let meta = FileMetadata {
            length,
            chunk_count: self.config.chunks_for(length),
            ..self.meta.clone()
        };
        self.store.write_metadata(&meta)?;

        self.current_mut()?.mark_clean();
        self.meta = meta;

        tracing::debug!(
            file_id = %self.meta.file_id,
            index,
            bytes = extent,
            length,
            filled,
            "flushed chunk"
        );
        Ok(())
    }

    /// Brings every chunk from the previous last one up to the last chunk
    /// of `length` to its final extent: skipped indices get zero-filled
    /// records and a short former last chunk is padded with zeros.
    ///
    /// Chunks below the previous last one are already full.
    fn fill_gaps(&mut self, length: u64) -> StreamResult<u64> {
        let chunk_size = self.config.chunk_size() as u64;
        let from = self.meta.chunk_count.saturating_sub(1);
        let to = self.config.chunks_for(length);
        let mut filled = 0u64;

        for index in from..to {
            let expected = (length - index * chunk_size).min(chunk_size) as usize;
            let window = match self.persisted.get(&index) {
                Some(&len) if len == expected => continue,
                Some(_) => Window::load(&self.store, &self.meta.file_id, index, &self.config)?,
                None => Window::blank(index, self.config.chunk_size()),
            };

            let chunk = window.to_chunk(&self.meta.file_id, expected, &self.config);
            self.store.write_chunk(chunk)?;
            self.persisted.insert(index, expected);
            filled += 1;
        }

        if filled > 0 {
            tracing::trace!(file_id = %self.meta.file_id, filled, "zero-filled sparse chunks");
        }
        Ok(filled)
    }
}

impl<S: ChunkStore> Drop for ChunkedFileStream<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(file_id = %self.meta.file_id, error = %e, "failed to close chunked stream on drop");
        }
    }
}

impl<S: ChunkStore> fmt::Debug for ChunkedFileStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedFileStream")
            .field("file_id", &self.meta.file_id)
            .field("mode", &self.mode)
            .field("position", &self.position)
            .field("length", &self.length())
            .field("window", &self.window.as_ref().map(Window::index))
            .field("dirty", &self.window.as_ref().is_some_and(Window::is_dirty))
            .finish_non_exhaustive()
    }
}
