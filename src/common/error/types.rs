//! Unified error type for the streaming writer.
//!
//! Every fallible operation in the crate returns [`Result`], so callers only
//! ever match on one enum regardless of whether the failure came from the
//! filesystem, the ZIP container or a rejected call.
use thiserror::Error;

/// Main error type for workbook writing.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Packaging was requested before any sheet was declared
    #[error("Workbook has no worksheets")]
    NoWorksheets,

    /// The destination exists and cannot be replaced
    #[error("Destination is not writable: {0}")]
    DestinationNotWritable(String),

    /// Content was written to a sheet after it was finalized
    #[error("Sheet '{0}' is already finalized")]
    SheetFinalized(String),

    /// A sheet was addressed with an empty name
    #[error("Sheet name must not be empty")]
    EmptySheetName,

    /// A row index past the last addressable spreadsheet row
    #[error("Row {0} exceeds the maximum of 1048576 rows")]
    RowLimitExceeded(u32),

    /// A column index past the last addressable spreadsheet column
    #[error("Column {0} exceeds the maximum of 16384 columns")]
    ColumnLimitExceeded(u32),

    /// A style attribute could not be interpreted
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// A row height or column width that is negative or not finite
    #[error("Invalid {0}: {1}")]
    InvalidSize(&'static str, f64),

    /// A cell reference could not be parsed
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),
}

/// Result type for workbook writing.
pub type Result<T> = std::result::Result<T, Error>;
