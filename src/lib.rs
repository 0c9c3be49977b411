//! streamxlsx - A streaming writer for Office Open XML spreadsheets (.xlsx)
//!
//! Rows are serialized to per-sheet temp files as they arrive, so memory use
//! stays flat no matter how many rows a workbook holds. Only the shared
//! style tables and a few counters per sheet live in memory until the
//! archive is assembled.
//!
//! # Features
//!
//! - **Streaming rows**: each row is written out immediately
//! - **Column formats**: keywords (`date`, `money`, `integer`, ...) or raw
//!   number-format codes decide how each column's values are serialized
//! - **Styles**: fonts, fills, borders and alignment, interned so identical
//!   styles share one stylesheet entry
//! - **Sheet layout**: column widths, frozen panes, autofilter, merged cells
//! - **Atomic output**: the archive is moved into place only once complete
//!
//! # Example - Writing a sheet row by row
//!
//! ```no_run
//! use streamxlsx::{CellStyle, Header, HeaderOptions, RowOptions, StreamingWorkbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = StreamingWorkbook::new();
//! workbook.set_author("Finance");
//!
//! let header: Header = [("date", "date"), ("item", "string"), ("total", "price")]
//!     .into_iter()
//!     .collect();
//! let options = HeaderOptions::new()
//!     .widths(vec![12.0, 30.0])
//!     .freeze(1, 0)
//!     .style(CellStyle::new().bold());
//! workbook.write_header("Orders", &header, &options)?;
//!
//! workbook.write_row("Orders", ["2024-03-01", "Widget", "19.99"], None)?;
//! let highlight = RowOptions::new().style(CellStyle::new().fill("#ffeeaa".parse()?));
//! workbook.write_row("Orders", ["2024-03-02", "Gadget", "4.50"], Some(&highlight))?;
//!
//! workbook.package("orders.xlsx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing a whole sheet at once
//!
//! ```
//! use streamxlsx::StreamingWorkbook;
//!
//! # fn main() -> Result<(), streamxlsx::Error> {
//! let mut workbook = StreamingWorkbook::new();
//! workbook.write_sheet("Numbers", [[1, 2, 3], [4, 5, 6]], None)?;
//!
//! let bytes = workbook.to_bytes()?;
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok(())
//! # }
//! ```

/// Error type and XML helpers shared by every module
pub mod common;

/// OOXML (Office Open XML) package writing
///
/// Packaging (OPC parts, relationships, content types), document properties
/// and the spreadsheet writer itself.
pub mod ooxml;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use ooxml::opc::Compression;
pub use ooxml::xlsx::cell::{CellRef, CellValue};
pub use ooxml::xlsx::format::{
    BorderLineStyle, BorderSides, CellStyle, Color, FontSize, FontStyle, HorizontalAlignment,
    VerticalAlignment,
};
pub use ooxml::xlsx::writer::{
    Header, HeaderOptions, RowOptions, StreamingWorkbook, StyleOverride, WriterOptions,
};
