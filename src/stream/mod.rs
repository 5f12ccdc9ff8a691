//! Random-access streams over chunked files.
//!
//! - [`ChunkedFileStream`] - read/write/seek over one file's chunk records
//! - [`OpenMode`] - Whether a stream reads or (re)writes its file
//! - [`SeekOrigin`] - Reference point for [`ChunkedFileStream::seek`]
//!
//! The stream also implements [`std::io::Read`], [`std::io::Write`] and
//! [`std::io::Seek`].

mod file;
mod io;

pub use file::ChunkedFileStream;

/// Access mode of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Read existing content. Writes fail with `NotSupported`.
    Read,
    /// Replace the file's content. Opening purges any existing chunks;
    /// reads fail with `NotSupported`.
    Write,
}

/// Reference point of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekOrigin {
    /// Offset counts from the start of the file and must be non-negative.
    Begin,
    /// Offset is added to the current position.
    Current,
    /// Offset counts backwards from the end of the file and must be positive.
    End,
}
