//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! Parts are written sequentially into a `zip::ZipWriter`. Small generated
//! parts arrive as byte slices; worksheet parts are copied straight from their
//! backing temp files so a sheet never has to be loaded into memory.

use crate::common::error::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compression applied to every part of the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression.
    Stored,
    /// Deflate at the given level, or the library default when `None`.
    Deflated(Option<i64>),
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Deflated(None)
    }
}

impl Compression {
    fn file_options(self) -> SimpleFileOptions {
        match self {
            Compression::Stored => {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            },
            Compression::Deflated(level) => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(level),
        }
    }
}

/// Physical package writer that appends parts to a ZIP archive.
pub struct PhysPkgWriter<W: Write + Seek> {
    /// The underlying ZIP archive writer
    archive: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> PhysPkgWriter<W> {
    /// Create a new package writer with Deflate compression.
    pub fn new(writer: W) -> Self {
        Self::with_compression(writer, Compression::default())
    }

    /// Create a new package writer with an explicit compression setting.
    pub fn with_compression(writer: W, compression: Compression) -> Self {
        Self {
            archive: ZipWriter::new(writer),
            options: compression.file_options(),
        }
    }

    /// Write a part to the package.
    ///
    /// # Arguments
    /// * `membername` - Archive path of the part, without a leading slash
    /// * `blob` - The binary content to write
    pub fn write(&mut self, membername: &str, blob: &[u8]) -> Result<()> {
        self.archive.start_file(membername, self.options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Write a part whose content lives in a file on disk.
    ///
    /// The file is streamed into the archive in chunks.
    pub fn write_file(&mut self, membername: &str, path: &Path) -> Result<u64> {
        let mut source = File::open(path)?;
        self.archive.start_file(membername, self.options)?;
        let copied = io::copy(&mut source, &mut self.archive)?;
        Ok(copied)
    }

    /// Finish writing the central directory and hand back the inner writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.archive.finish()?)
    }
}
