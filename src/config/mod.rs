//! Configuration for chunked streams.
//!
//! This module provides types to configure how a file is split into chunk
//! records:
//!
//! - [`StreamConfig`] - Controls the chunk size and hashing behavior
//! - [`HashConfig`] - Specifies whether chunk integrity hashes are kept
//!
//! # Example
//!
//! ```
//! use chunkfs::{HashConfig, StreamConfig};
//!
//! // Small chunks
//! let config = StreamConfig::new(64 * 1024)?;
//!
//! // Disable hashing
//! let config = StreamConfig::default().with_hash_config(HashConfig::disabled());
//! # Ok::<(), chunkfs::StreamError>(())
//! ```

use crate::error::StreamError;

/// Maximum number of bytes stored in one chunk record (255 KiB).
///
/// Kept just below 256 KiB so a chunk plus its record envelope fits in a
/// 256 KiB document.
pub const MAX_CHUNK_SIZE: usize = 255 * 1024;

/// Configuration for a chunked stream.
///
/// The chunk size fixes the geometry of a file: chunk `i` covers the byte
/// range `[i * chunk_size, (i + 1) * chunk_size)`. A file must always be
/// reopened with the chunk size it was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamConfig {
    chunk_size: usize,
    hash_config: HashConfig,
}

impl StreamConfig {
    /// Creates a new configuration with the given chunk size.
    ///
    /// Returns error if the size is zero or larger than [`MAX_CHUNK_SIZE`].
    pub fn new(chunk_size: usize) -> Result<Self, StreamError> {
        if chunk_size == 0 {
            return Err(StreamError::InvalidArgument("chunk size must be non-zero"));
        }

        if chunk_size > MAX_CHUNK_SIZE {
            return Err(StreamError::InvalidArgument(
                "chunk size cannot exceed MAX_CHUNK_SIZE",
            ));
        }

        Ok(Self {
            chunk_size,
            hash_config: HashConfig::default(),
        })
    }

    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Returns the chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Number of chunks needed to hold `length` bytes.
    pub fn chunks_for(&self, length: u64) -> u64 {
        length.div_ceil(self.chunk_size as u64)
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), StreamError> {
        Self::new(self.chunk_size).map(|_| ())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_CHUNK_SIZE,
            hash_config: HashConfig::default(),
        }
    }
}

/// Configuration for chunk hashing.
///
/// Controls whether BLAKE3 hashes are written with each chunk and checked
/// when a chunk is loaded. Has no effect without the `hash-blake3` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Whether to compute and verify BLAKE3 hashes.
    pub enabled: bool,
}

impl HashConfig {
    /// Creates a new hash configuration.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
