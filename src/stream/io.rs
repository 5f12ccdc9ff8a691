//! `std::io` adapters for [`ChunkedFileStream`].
//!
//! Errors are converted with `From<StreamError> for io::Error`, so argument
//! and mode errors surface as `InvalidInput` and `Unsupported`.
//!
//! `SeekFrom::End(n)` follows the stream's own rule for seeking from the
//! end: it needs `n < 0` and lands on `length + n`. `SeekFrom::End(0)` is
//! rejected, so use [`ChunkedFileStream::length`] to find the length.

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::{ChunkedFileStream, SeekOrigin};
use crate::error::StreamError;
use crate::store::ChunkStore;

impl<S: ChunkStore> Read for ChunkedFileStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(ChunkedFileStream::read(self, buf)?)
    }
}

impl<S: ChunkStore> Write for ChunkedFileStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ChunkedFileStream::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(ChunkedFileStream::flush(self)?)
    }
}

impl<S: ChunkStore> Seek for ChunkedFileStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, origin) = match pos {
            SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    StreamError::InvalidArgument("position does not fit a seek offset")
                })?;
                (n, SeekOrigin::Begin)
            }
            SeekFrom::Current(n) => (n, SeekOrigin::Current),
            SeekFrom::End(n) => {
                let back = n.checked_neg().ok_or(StreamError::InvalidArgument(
                    "seek offset out of range",
                ))?;
                (back, SeekOrigin::End)
            }
        };
        Ok(ChunkedFileStream::seek(self, offset, origin)?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}
