//! Excel (.xlsx) spreadsheet writing.
//!
//! - `cell`: cell values and A1 addressing
//! - `format`: cell style attributes
//! - `number_format`: column format keywords and classification
//! - `date`: Excel date serials
//! - `names`: sheet-name and file-name sanitization
//! - `writer`: the streaming workbook and sheet writers

pub mod cell;
pub mod date;
pub mod format;
pub mod names;
pub mod number_format;
pub mod writer;

pub use cell::{CellRef, CellValue, column_to_letters, parse_cell_ref, xls_cell};
pub use names::{sanitize_filename, sanitize_sheet_name};
pub use writer::{Header, HeaderOptions, RowOptions, StreamingWorkbook, WriterOptions};
