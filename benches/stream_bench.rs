//! Benchmarks for chunkfs.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use chunkfs::{
    ChunkStore, ChunkedFileStream, FileId, FileMetadata, FileStorage, HashConfig,
    MemoryChunkStore, OpenMode, SeekOrigin, StreamConfig,
};

fn sample(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 7 + 13) as u8).collect()
}

fn bench_upload(c: &mut Criterion) {
    let mut group = c.benchmark_group("upload");

    for size in [64 * 1024, 1024 * 1024, 8 * 1024 * 1024] {
        let data = sample(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("hashed_{}kb", size / 1024), |b| {
            let mut fs = FileStorage::new(MemoryChunkStore::new());
            let id = FileId::from("bench");
            b.iter(|| {
                let meta = fs.upload(&id, "bench", black_box(&data[..])).unwrap();
                black_box(meta.chunk_count)
            });
        });

        group.bench_function(format!("unhashed_{}kb", size / 1024), |b| {
            let config = StreamConfig::default().with_hash_config(HashConfig::disabled());
            let mut fs = FileStorage::with_config(MemoryChunkStore::new(), config).unwrap();
            let id = FileId::from("bench");
            b.iter(|| {
                let meta = fs.upload(&id, "bench", black_box(&data[..])).unwrap();
                black_box(meta.chunk_count)
            });
        });
    }

    group.finish();
}

fn bench_download(c: &mut Criterion) {
    let mut group = c.benchmark_group("download");
    let size = 8 * 1024 * 1024;
    let data = sample(size);

    let mut fs = FileStorage::new(MemoryChunkStore::new());
    let id = FileId::from("bench");
    fs.upload(&id, "bench", &data[..]).unwrap();

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("8mb", |b| {
        let mut out = Vec::with_capacity(size);
        b.iter(|| {
            out.clear();
            black_box(fs.download(&id, &mut out).unwrap())
        });
    });

    group.finish();
}

fn bench_seek(c: &mut Criterion) {
    let mut group = c.benchmark_group("seek");
    let config = StreamConfig::new(4096).unwrap();
    let mut store = MemoryChunkStore::new();
    let id = FileId::from("bench");
    FileStorage::with_config(&mut store, config)
        .unwrap()
        .upload(&id, "bench", &sample(1024 * 1024)[..])
        .unwrap();

    // Same chunk: no store access
    group.bench_function("within_chunk", |b| {
        let mut s = ChunkedFileStream::open(&mut store, &id, OpenMode::Read, config).unwrap();
        let mut buf = [0u8; 16];
        b.iter(|| {
            for offset in [0i64, 1024, 2048, 4000] {
                s.seek(black_box(offset), SeekOrigin::Begin).unwrap();
                s.read(&mut buf).unwrap();
            }
        });
    });

    // Stride across chunks: one load per seek
    group.bench_function("across_chunks", |b| {
        let mut s = ChunkedFileStream::open(&mut store, &id, OpenMode::Read, config).unwrap();
        let mut buf = [0u8; 16];
        let mut offset = 0i64;
        b.iter(|| {
            offset = (offset + 40_961) % (1024 * 1024 - 16);
            s.seek(black_box(offset), SeekOrigin::Begin).unwrap();
            s.read(&mut buf).unwrap();
        });
    });

    group.finish();
}

fn bench_small_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("small_writes");
    let data = sample(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for piece in [16, 512, 4096] {
        group.bench_function(format!("{}b_writes", piece), |b| {
            let mut store = MemoryChunkStore::new();
            let id = FileId::from("bench");
            store
                .write_metadata(&FileMetadata::new(id.clone(), "bench"))
                .unwrap();
            let config = StreamConfig::new(16 * 1024).unwrap();
            b.iter(|| {
                let mut s =
                    ChunkedFileStream::open(&mut store, &id, OpenMode::Write, config).unwrap();
                for part in data.chunks(piece) {
                    s.write(black_box(part)).unwrap();
                }
                s.close().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_upload,
    bench_download,
    bench_seek,
    bench_small_writes
);
criterion_main!(benches);
