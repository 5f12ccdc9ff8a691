//! The chunk window: the one chunk of a file held in memory by a stream.
//!
//! A window covers the byte range `[lower, lower + chunk_size)` of the file.
//! Its buffer is always exactly `chunk_size` bytes; bytes the store has no
//! data for are zero. Windows are never reused across chunks: moving to
//! another chunk builds a fresh zero-filled window, so nothing from the
//! previous chunk can leak into the new one.

use bytes::{Bytes, BytesMut};

use crate::chunk::Chunk;
use crate::config::StreamConfig;
use crate::error::{StreamError, StreamResult};
use crate::meta::FileId;
use crate::store::ChunkStore;

#[cfg(feature = "hash-blake3")]
use crate::chunk::ChunkHash;
#[cfg(feature = "hash-blake3")]
use crate::hash::Blake3Hasher;

#[derive(Debug)]
pub(crate) struct Window {
    index: u64,
    lower: u64,
    buffer: BytesMut,
    dirty: bool,
    // furthest intra-chunk byte written since the window was built
    written: usize,
}

impl Window {
    /// Creates an all-zero window for chunk `index`.
    pub(crate) fn blank(index: u64, chunk_size: usize) -> Self {
        Self {
            index,
            lower: index * chunk_size as u64,
            buffer: BytesMut::zeroed(chunk_size),
            dirty: false,
            written: 0,
        }
    }

    /// Builds the window for chunk `index`, filling it from the store.
    ///
    /// An absent chunk yields an all-zero window. A stored hash is checked
    /// when hashing is enabled.
    pub(crate) fn load<S: ChunkStore + ?Sized>(
        store: &S,
        file_id: &FileId,
        index: u64,
        config: &StreamConfig,
    ) -> StreamResult<Self> {
        let mut window = Self::blank(index, config.chunk_size());

        if let Some(chunk) = store.read_chunk(file_id, index)? {
            if chunk.len() > config.chunk_size() {
                return Err(StreamError::OversizedChunk {
                    file_id: file_id.clone(),
                    index,
                    len: chunk.len(),
                    chunk_size: config.chunk_size(),
                });
            }
            #[cfg(feature = "hash-blake3")]
            if let Some(expected) = chunk.hash
                && config.hash_config().enabled
            {
                Blake3Hasher::verify(&chunk.data, &expected).map_err(|actual| {
                    StreamError::ChecksumMismatch {
                        file_id: file_id.clone(),
                        index,
                        expected,
                        actual,
                    }
                })?;
            }
            window.buffer[..chunk.len()].copy_from_slice(&chunk.data);
        }

        Ok(window)
    }

    pub(crate) fn index(&self) -> u64 {
        self.index
    }

    pub(crate) fn lower(&self) -> u64 {
        self.lower
    }

    pub(crate) fn upper(&self) -> u64 {
        self.lower + self.buffer.len() as u64
    }

    pub(crate) fn contains(&self, position: u64) -> bool {
        position >= self.lower && position < self.upper()
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File offset just past the last byte written into this window.
    pub(crate) fn written_end(&self) -> Option<u64> {
        (self.written > 0).then(|| self.lower + self.written as u64)
    }

    /// Copies bytes starting at intra-chunk `offset` into `dst`, stopping at
    /// the end of the chunk. Returns the number of bytes copied.
    pub(crate) fn read_at(&self, offset: usize, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.buffer.len() - offset);
        dst[..n].copy_from_slice(&self.buffer[offset..offset + n]);
        n
    }

    /// Copies `src` into the buffer at intra-chunk `offset`, stopping at the
    /// end of the chunk. Returns the number of bytes copied.
    pub(crate) fn write_at(&mut self, offset: usize, src: &[u8]) -> usize {
        let n = src.len().min(self.buffer.len() - offset);
        if n == 0 {
            return 0;
        }
        self.buffer[offset..offset + n].copy_from_slice(&src[..n]);
        self.dirty = true;
        self.written = self.written.max(offset + n);
        n
    }

    /// Snapshots the first `extent` bytes as a chunk record.
    pub(crate) fn to_chunk(&self, file_id: &FileId, extent: usize, config: &StreamConfig) -> Chunk {
        let data = Bytes::copy_from_slice(&self.buffer[..extent]);
        let chunk = Chunk::new(file_id.clone(), self.index, data);

        #[cfg(feature = "hash-blake3")]
        if config.hash_config().enabled {
            let hash = ChunkHash::compute(&chunk.data);
            return chunk.set_hash(hash);
        }
        #[cfg(not(feature = "hash-blake3"))]
        let _ = config;

        chunk
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashConfig;
    use crate::store::MemoryChunkStore;

    fn config() -> StreamConfig {
        StreamConfig::new(4).unwrap()
    }

    #[test]
    fn test_blank_bounds() {
        let w = Window::blank(2, 4);
        assert_eq!(w.index(), 2);
        assert_eq!(w.lower(), 8);
        assert_eq!(w.upper(), 12);
        assert!(w.contains(8));
        assert!(w.contains(11));
        assert!(!w.contains(12));
        assert!(!w.contains(7));
        assert!(!w.is_dirty());
        assert_eq!(w.written_end(), None);
    }

    #[test]
    fn test_write_stops_at_chunk_end() {
        let mut w = Window::blank(0, 4);
        assert_eq!(w.write_at(2, &[1, 2, 3]), 2);
        assert!(w.is_dirty());
        assert_eq!(w.written_end(), Some(4));

        let mut out = [9u8; 8];
        assert_eq!(w.read_at(0, &mut out), 4);
        assert_eq!(&out[..4], &[0, 0, 1, 2]);
    }

    #[test]
    fn test_empty_write_keeps_window_clean() {
        let mut w = Window::blank(0, 4);
        assert_eq!(w.write_at(1, &[]), 0);
        assert!(!w.is_dirty());
    }

    #[test]
    fn test_load_absent_chunk_is_zero() {
        let store = MemoryChunkStore::new();
        let w = Window::load(&store, &FileId::from("f"), 5, &config()).unwrap();
        let mut out = [7u8; 4];
        w.read_at(0, &mut out);
        assert_eq!(out, [0, 0, 0, 0]);
        assert_eq!(w.lower(), 20);
    }

    #[test]
    fn test_load_short_chunk_zero_pads() {
        let mut store = MemoryChunkStore::new();
        let id = FileId::from("f");
        store
            .write_chunk(Chunk::new(id.clone(), 1, Bytes::from_static(&[7, 8])))
            .unwrap();

        let w = Window::load(&store, &id, 1, &config()).unwrap();
        let mut out = [0xFFu8; 4];
        w.read_at(0, &mut out);
        assert_eq!(out, [7, 8, 0, 0]);
        assert_eq!(w.written_end(), None);
    }

    #[test]
    fn test_load_rejects_oversized_chunk() {
        let mut store = MemoryChunkStore::new();
        let id = FileId::from("f");
        store
            .write_chunk(Chunk::new(id.clone(), 0, vec![1u8; 5]))
            .unwrap();

        let err = Window::load(&store, &id, 0, &config()).unwrap_err();
        assert!(matches!(
            err,
            StreamError::OversizedChunk {
                index: 0,
                len: 5,
                chunk_size: 4,
                ..
            }
        ));
        assert_eq!(
            std::io::Error::from(err).kind(),
            std::io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn test_to_chunk_trims_to_extent() {
        let mut w = Window::blank(3, 4);
        w.write_at(0, &[5, 6, 7]);
        let chunk = w.to_chunk(&FileId::from("f"), 3, &config());
        assert_eq!(chunk.index, 3);
        assert_eq!(chunk.data.as_ref(), &[5, 6, 7]);
    }

    #[test]
    #[cfg(feature = "hash-blake3")]
    fn test_hash_roundtrip_and_tamper_detection() {
        let mut store = MemoryChunkStore::new();
        let id = FileId::from("f");
        let mut w = Window::blank(0, 4);
        w.write_at(0, &[1, 2, 3, 4]);
        let chunk = w.to_chunk(&id, 4, &config());
        assert!(chunk.hash.is_some());
        store.write_chunk(chunk).unwrap();

        assert!(Window::load(&store, &id, 0, &config()).is_ok());

        store.tamper_chunk(&id, 0, &[1, 2, 3, 5]);
        let err = Window::load(&store, &id, 0, &config()).unwrap_err();
        assert!(matches!(err, StreamError::ChecksumMismatch { index: 0, .. }));

        // verification can be switched off
        let lax = config().with_hash_config(HashConfig::disabled());
        assert!(Window::load(&store, &id, 0, &lax).is_ok());
    }
}
