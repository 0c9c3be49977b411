//! Streaming writer components for XLSX.
//!
//! Rows go straight to per-sheet temp files through [`SheetStream`]; the
//! workbook keeps only the shared style tables and per-sheet counters until
//! [`StreamingWorkbook::package`] assembles the archive.

pub mod buffer;
pub mod cell;
pub mod options;
pub mod sheet;
pub mod styles;
pub mod workbook;


// Re-export main types
pub use buffer::BufferedWriter;
pub use options::{Header, HeaderOptions, RowOptions, StyleOverride, WriterOptions};
pub use sheet::SheetStream;
pub use styles::StylesBuilder;
pub use workbook::StreamingWorkbook;
