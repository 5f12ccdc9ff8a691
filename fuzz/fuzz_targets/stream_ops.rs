#![no_main]

use libfuzzer_sys::fuzz_target;
use chunkfs::{
    ChunkStore, ChunkedFileStream, FileId, FileMetadata, MemoryChunkStore, OpenMode, SeekOrigin,
    StreamConfig,
};

// Replays a byte script of writes and seeks against a stream and a plain
// Vec<u8>, then checks the stored file matches the model.
fuzz_target!(|data: &[u8]| {
    let Some((&size, script)) = data.split_first() else {
        return;
    };
    let config = StreamConfig::new(1 + (size % 32) as usize).unwrap();

    let mut store = MemoryChunkStore::new();
    let id = FileId::from("fuzz");
    store
        .write_metadata(&FileMetadata::new(id.clone(), "fuzz"))
        .unwrap();

    let mut model: Vec<u8> = Vec::new();
    let mut pos = 0usize;

    let mut s = ChunkedFileStream::open(&mut store, &id, OpenMode::Write, config).unwrap();
    let mut ops = script.iter();
    while let (Some(&op), Some(&arg)) = (ops.next(), ops.next()) {
        match op % 3 {
            0 if arg > 0 => {
                let buf: Vec<u8> = (0..arg).map(|i| i ^ op).collect();
                s.write(&buf).unwrap();
                let end = pos + buf.len();
                if model.len() < end {
                    model.resize(end, 0);
                }
                model[pos..end].copy_from_slice(&buf);
                pos = end;
            }
            1 => {
                pos = arg as usize * 3;
                assert_eq!(s.seek(pos as i64, SeekOrigin::Begin).unwrap(), pos as u64);
            }
            2 => {
                let back = arg as i64 % 8;
                match s.seek(-back, SeekOrigin::Current) {
                    Ok(p) => pos = p as usize,
                    Err(_) => assert!((back as usize) > pos),
                }
            }
            _ => {}
        }
        assert_eq!(s.length(), model.len() as u64);
        assert_eq!(s.position(), pos as u64);
    }
    s.close().unwrap();
    drop(s);

    let meta = store.read_metadata(&id).unwrap().unwrap();
    assert_eq!(meta.length, model.len() as u64);
    assert_eq!(meta.chunk_count, config.chunks_for(meta.length));
    assert_eq!(store.chunk_len(&id) as u64, meta.chunk_count);

    let mut r = ChunkedFileStream::open(&mut store, &id, OpenMode::Read, config).unwrap();
    let mut out = vec![0u8; model.len()];
    assert_eq!(r.read(&mut out).unwrap(), model.len());
    assert_eq!(out, model);
});
