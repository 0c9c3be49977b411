//! Buffered sequential writer for sheet backing files.
//!
//! Worksheet XML is produced strictly front to back. The only exception is
//! the dimension tag near the top of the file, which is patched once at the
//! end via [`BufferedWriter::seek_and_overwrite`]. Pending bytes are always
//! flushed before the position is queried or changed, so offsets reported by
//! [`BufferedWriter::tell`] are physical file offsets.

use crate::common::error::Result;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

/// Default flush threshold in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Append-mostly writer with an explicit flush threshold.
#[derive(Debug)]
pub struct BufferedWriter<W: Write + Seek> {
    inner: W,
    buffer: Vec<u8>,
    threshold: usize,
    /// Cleared after the first invalid chunk is reported.
    check_utf8: bool,
    closed: bool,
}

impl<W: Write + Seek> BufferedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: W, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(threshold),
            threshold,
            check_utf8: false,
            closed: false,
        }
    }

    /// Validate each flushed chunk as UTF-8 and log the first failure.
    pub fn check_utf8(mut self, enabled: bool) -> Self {
        self.check_utf8 = enabled;
        self
    }

    /// Append text.
    #[inline]
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        if self.buffer.len() >= self.threshold {
            self.purge()?;
        }
        Ok(())
    }

    /// Current physical position of the end of the stream.
    pub fn tell(&mut self) -> Result<u64> {
        self.purge()?;
        Ok(self.inner.stream_position()?)
    }

    /// Overwrite bytes at an earlier position, then return to the end.
    pub fn seek_and_overwrite(&mut self, position: u64, bytes: &[u8]) -> Result<()> {
        self.purge()?;
        let end = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(position))?;
        self.inner.write_all(bytes)?;
        let resume = end.max(position + bytes.len() as u64);
        self.inner.seek(SeekFrom::Start(resume))?;
        Ok(())
    }

    /// Flush everything to the underlying writer. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.purge()?;
        self.inner.flush()?;
        self.closed = true;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        Ok(self.inner)
    }

    fn purge(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if self.check_utf8 {
            self.validate_chunk();
        }
        self.inner.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    fn validate_chunk(&mut self) {
        // A sequence cut at the chunk end is completed by the next write.
        if let Err(e) = std::str::from_utf8(&self.buffer)
            && e.error_len().is_some()
        {
            log::warn!(
                "invalid UTF-8 at byte {} of a {} byte chunk; further checks disabled for this stream",
                e.valid_up_to(),
                self.buffer.len()
            );
            self.check_utf8 = false;
        }
    }
}

impl BufferedWriter<File> {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_file(File::create(path)?))
    }

    pub fn from_file(file: File) -> Self {
        Self::new(file)
    }

    /// Close, then sync file contents to disk.
    pub fn close_and_sync(&mut self) -> Result<()> {
        self.close()?;
        self.inner.sync_all()?;
        Ok(())
    }
}
