//! File identity and metadata.
//!
//! - [`FileId`] - Opaque key naming one logical file
//! - [`FileMetadata`] - Length and chunk count record kept next to the chunks

use std::fmt;
use std::sync::Arc;

/// Opaque identifier of a logical file.
///
/// Cheap to clone; every chunk record carries one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Creates a file id from any string-like key.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The metadata record of one logical file.
///
/// Once a write stream is closed, `chunk_count == ceil(length / chunk_size)`
/// and every chunk index in `0..chunk_count` has a record in the store.
///
/// # Example
///
/// ```
/// use chunkfs::{FileId, FileMetadata};
///
/// let meta = FileMetadata::new(FileId::from("a.bin"), "a.bin");
/// assert_eq!(meta.length, 0);
/// assert_eq!(meta.chunk_count, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Key of the file.
    pub file_id: FileId,
    /// Display name.
    pub filename: String,
    /// Total content length in bytes.
    pub length: u64,
    /// Number of chunk records making up the content.
    pub chunk_count: u64,
}

impl FileMetadata {
    /// Creates metadata for an empty file.
    pub fn new(file_id: FileId, filename: impl Into<String>) -> Self {
        Self {
            file_id,
            filename: filename.into(),
            length: 0,
            chunk_count: 0,
        }
    }

    /// Returns true if the file has no content.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Clears length and chunk count ahead of a rewrite.
    pub(crate) fn reset(&mut self) {
        self.length = 0;
        self.chunk_count = 0;
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} bytes in {} chunks)",
            self.file_id, self.filename, self.length, self.chunk_count
        )
    }
}
