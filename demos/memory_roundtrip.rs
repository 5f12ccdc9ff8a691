//! Writing, seeking and reading a chunked file held in memory.
//!
//! Run with:
//!     cargo run --example memory_roundtrip

use std::io::{Read, Write};

use chunkfs::{ChunkStore, FileId, FileStorage, MemoryChunkStore, SeekOrigin, StreamConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Small chunks so the layout is easy to print
    let config = StreamConfig::new(16)?;
    let mut fs = FileStorage::with_config(MemoryChunkStore::new(), config)?;
    let id = FileId::from("poem");

    let text = b"Tyger Tyger, burning bright, In the forests of the night;";
    println!("Writing {} bytes in {}-byte chunks...\n", text.len(), config.chunk_size());

    let mut out = fs.open_write(&id, "tyger.txt")?;
    out.write_all(text)?;
    // leave a hole, then append a signature past the end
    out.seek(80, SeekOrigin::Begin)?;
    out.write_all(b"-- W. Blake")?;
    out.close()?;
    drop(out);

    let meta = fs.find_by_id(&id)?.ok_or("file vanished")?;
    println!("Stored: {}\n", meta);

    for index in 0..meta.chunk_count {
        let Some(chunk) = fs.store().read_chunk(&id, index)? else {
            continue;
        };

        if let Some(hash) = chunk.hash {
            println!(
                "Chunk {}: bytes={:?}, hash={}",
                chunk.index,
                chunk.range(config.chunk_size()),
                &hash.to_hex()[..16]
            );
        } else {
            println!(
                "Chunk {}: bytes={:?}",
                chunk.index,
                chunk.range(config.chunk_size())
            );
        }
    }

    // Random access read
    let mut input = fs.open_read(&id)?;
    input.seek(11, SeekOrigin::End)?;
    let mut tail = String::new();
    input.read_to_string(&mut tail)?;
    println!("\nLast 11 bytes: {:?}", tail);

    input.seek(60, SeekOrigin::Begin)?;
    let mut hole = [0xFFu8; 8];
    input.read_exact(&mut hole)?;
    println!("Bytes 60..68: {:?}", hole);
    drop(input);

    let stats = fs.store().stats();
    println!(
        "\nStore calls: {} chunk reads, {} chunk writes, {} total",
        stats.chunk_reads,
        stats.chunk_writes,
        stats.total()
    );

    Ok(())
}
