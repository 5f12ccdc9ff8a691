//! BLAKE3-based chunk hashing.

use crate::chunk::ChunkHash;

/// Computes and checks BLAKE3 digests of chunk data.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Blake3Hasher;

impl Blake3Hasher {
    /// Hashes data in one shot.
    pub(crate) fn hash(data: &[u8]) -> ChunkHash {
        ChunkHash::new(blake3::hash(data).into())
    }

    /// Checks `data` against `expected`, returning the actual digest on mismatch.
    pub(crate) fn verify(data: &[u8], expected: &ChunkHash) -> Result<(), ChunkHash> {
        // blake3::Hash equality is constant-time
        let actual = blake3::hash(data);
        if actual == blake3::Hash::from(*expected.as_bytes()) {
            Ok(())
        } else {
            Err(ChunkHash::new(actual.into()))
        }
    }
}
