//! Integrity hashing for chunk records.
//!
//! - [`Blake3Hasher`] - BLAKE3 digest and verification (requires `hash-blake3` feature)

#[cfg(feature = "hash-blake3")]
mod blake3;

#[cfg(feature = "hash-blake3")]
pub(crate) use blake3::Blake3Hasher;
