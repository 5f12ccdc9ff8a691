// Integration tests for FileStorage and custom ChunkStore adapters

use std::io::{Read, Write};
use std::ops::RangeInclusive;

use chunkfs::{
    Chunk, ChunkStore, FileId, FileMetadata, FileStorage, MemoryChunkStore, SeekOrigin,
    StoreError, StoreResult, StreamConfig, StreamError,
};

/// Adapter that forwards to a memory store and records every chunk write.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryChunkStore,
    written: Vec<(String, u64, usize)>,
    deleted_ranges: Vec<RangeInclusive<u64>>,
}

impl ChunkStore for RecordingStore {
    fn read_metadata(&self, file_id: &FileId) -> StoreResult<Option<FileMetadata>> {
        self.inner.read_metadata(file_id)
    }

    fn write_metadata(&mut self, meta: &FileMetadata) -> StoreResult<()> {
        self.inner.write_metadata(meta)
    }

    fn delete_metadata(&mut self, file_id: &FileId) -> StoreResult<bool> {
        self.inner.delete_metadata(file_id)
    }

    fn list_metadata(&self) -> StoreResult<Vec<FileMetadata>> {
        self.inner.list_metadata()
    }

    fn read_chunk(&self, file_id: &FileId, index: u64) -> StoreResult<Option<Chunk>> {
        self.inner.read_chunk(file_id, index)
    }

    fn write_chunk(&mut self, chunk: Chunk) -> StoreResult<()> {
        self.written
            .push((chunk.file_id.to_string(), chunk.index, chunk.len()));
        self.inner.write_chunk(chunk)
    }

    fn delete_chunk_range(
        &mut self,
        file_id: &FileId,
        range: RangeInclusive<u64>,
    ) -> StoreResult<u64> {
        self.deleted_ranges.push(range.clone());
        self.inner.delete_chunk_range(file_id, range)
    }
}

/// Adapter whose chunk reads always fail.
struct BrokenReads(MemoryChunkStore);

impl ChunkStore for BrokenReads {
    fn read_metadata(&self, file_id: &FileId) -> StoreResult<Option<FileMetadata>> {
        self.0.read_metadata(file_id)
    }

    fn write_metadata(&mut self, meta: &FileMetadata) -> StoreResult<()> {
        self.0.write_metadata(meta)
    }

    fn delete_metadata(&mut self, file_id: &FileId) -> StoreResult<bool> {
        self.0.delete_metadata(file_id)
    }

    fn list_metadata(&self) -> StoreResult<Vec<FileMetadata>> {
        self.0.list_metadata()
    }

    fn read_chunk(&self, _file_id: &FileId, _index: u64) -> StoreResult<Option<Chunk>> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "backend unavailable",
        )))
    }

    fn write_chunk(&mut self, chunk: Chunk) -> StoreResult<()> {
        self.0.write_chunk(chunk)
    }

    fn delete_chunk_range(
        &mut self,
        file_id: &FileId,
        range: RangeInclusive<u64>,
    ) -> StoreResult<u64> {
        self.0.delete_chunk_range(file_id, range)
    }
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

// ============================================================================
// Upload / Download
// ============================================================================

#[test]
fn test_upload_download_default_chunk_size() {
    let mut fs = FileStorage::new(MemoryChunkStore::new());
    let id = FileId::from("video");
    let data = pattern(3 * chunkfs::MAX_CHUNK_SIZE + 17);

    let meta = fs.upload(&id, "video.mp4", &data[..]).unwrap();
    assert_eq!(meta.length, data.len() as u64);
    assert_eq!(meta.chunk_count, 4);
    assert_eq!(fs.store().chunk_len(&id), 4);

    let mut out = Vec::new();
    assert_eq!(fs.download(&id, &mut out).unwrap(), data.len() as u64);
    assert_eq!(out, data);
}

#[test]
fn test_upload_empty_file() {
    let mut fs = FileStorage::new(MemoryChunkStore::new());
    let id = FileId::from("empty");

    let meta = fs.upload(&id, "empty", std::io::empty()).unwrap();
    assert!(meta.is_empty());
    assert_eq!(meta.chunk_count, 0);

    let mut out = Vec::new();
    assert_eq!(fs.download(&id, &mut out).unwrap(), 0);
}

#[test]
fn test_download_missing_file() {
    let mut fs = FileStorage::new(MemoryChunkStore::new());
    let err = fs.download(&FileId::from("nope"), Vec::new()).unwrap_err();
    assert!(matches!(err, StreamError::NotFound(id) if id.as_str() == "nope"));
}

#[test]
fn test_streams_from_storage_support_std_io() {
    let config = StreamConfig::new(5).unwrap();
    let mut fs = FileStorage::with_config(MemoryChunkStore::new(), config).unwrap();
    let id = FileId::from("log");

    let mut w = fs.open_write(&id, "app.log").unwrap();
    writeln!(w, "first line").unwrap();
    writeln!(w, "second line").unwrap();
    w.close().unwrap();
    drop(w);

    let mut r = fs.open_read(&id).unwrap();
    r.seek(6, SeekOrigin::Begin).unwrap();
    let mut text = String::new();
    r.read_to_string(&mut text).unwrap();
    assert_eq!(text, "line\nsecond line\n");
}

#[test]
fn test_with_config_rejects_oversized_chunks() {
    let config = StreamConfig::default().with_chunk_size(chunkfs::MAX_CHUNK_SIZE + 1);
    let err = FileStorage::with_config(MemoryChunkStore::new(), config).unwrap_err();
    assert!(matches!(err, StreamError::InvalidArgument(_)));
}

// ============================================================================
// Custom Adapters
// ============================================================================

#[test]
fn test_custom_adapter_sees_sequential_chunk_writes() {
    let config = StreamConfig::new(4).unwrap();
    let mut fs = FileStorage::with_config(RecordingStore::default(), config).unwrap();
    let id = FileId::from("rec");

    fs.upload(&id, "rec", &b"0123456789"[..]).unwrap();
    let written = fs.store().written.clone();
    assert_eq!(
        written,
        [
            ("rec".to_string(), 0, 4),
            ("rec".to_string(), 1, 4),
            ("rec".to_string(), 2, 2),
        ]
    );
    assert!(fs.store().deleted_ranges.is_empty());

    // a rewrite purges the whole index space once
    fs.upload(&id, "rec", &b"x"[..]).unwrap();
    assert_eq!(fs.store().deleted_ranges, [0..=u64::MAX]);

    let store = fs.into_inner();
    assert_eq!(store.inner.chunk_len(&id), 1);
}

#[test]
fn test_adapter_read_failure_propagates_as_store_error() {
    let mut inner = MemoryChunkStore::new();
    inner
        .write_metadata(&FileMetadata::new(FileId::from("x"), "x"))
        .unwrap();
    let mut fs = FileStorage::new(BrokenReads(inner));

    let err = fs.open_read(&FileId::from("x")).unwrap_err();
    match err {
        StreamError::Store(StoreError::Io(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::TimedOut)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn test_delete_leaves_other_files() {
    let mut fs = FileStorage::with_config(MemoryChunkStore::new(), StreamConfig::new(3).unwrap())
        .unwrap();
    let a = FileId::from("a");
    let b = FileId::from("b");
    fs.upload(&a, "a", &pattern(10)[..]).unwrap();
    fs.upload(&b, "b", &pattern(7)[..]).unwrap();

    assert!(fs.delete(&a).unwrap());
    assert_eq!(fs.store().chunk_len(&a), 0);
    assert_eq!(fs.store().chunk_len(&b), 3);

    let all = fs.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].file_id, b);

    let mut out = Vec::new();
    fs.download(&b, &mut out).unwrap();
    assert_eq!(out, pattern(7));
}

#[test]
fn test_metadata_display() {
    let mut fs = FileStorage::new(MemoryChunkStore::new());
    let id = FileId::from("doc");
    fs.upload(&id, "doc.txt", &b"abc"[..]).unwrap();

    let meta = fs.find_by_id(&id).unwrap().unwrap();
    let shown = meta.to_string();
    assert!(shown.contains("doc.txt"), "{shown}");
}
