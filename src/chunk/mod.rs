//! Chunk records.
//!
//! - [`Chunk`] - One persisted slice of a file, addressed by (file id, index)
//! - [`ChunkHash`] - 32-byte integrity hash stored alongside chunk data

mod data;
mod hash;

pub use data::Chunk;
pub use hash::ChunkHash;
