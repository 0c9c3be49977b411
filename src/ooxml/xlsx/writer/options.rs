//! Per-call and per-workbook writer options.

use crate::ooxml::opc::Compression;
use crate::ooxml::xlsx::format::CellStyle;
use crate::ooxml::xlsx::writer::buffer::DEFAULT_BUFFER_SIZE;
use serde::Deserialize;
use std::path::PathBuf;

/// Column declarations for a sheet: ordered `(label, format)` pairs.
///
/// Formats are keywords (`string`, `integer`, `date`, `money`, ...) or raw
/// number-format codes; see [`crate::ooxml::xlsx::number_format::standardize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    columns: Vec<(String, String)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn column(mut self, label: impl Into<String>, format: impl Into<String>) -> Self {
        self.columns.push((label.into(), format.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(label, _)| label.as_str())
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(_, format)| format.as_str())
    }
}

impl<L, F> FromIterator<(L, F)> for Header
where
    L: Into<String>,
    F: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, F)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(label, format)| (label.into(), format.into()))
                .collect(),
        }
    }
}

/// Style applied to every cell of a row, or one style per column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StyleOverride {
    PerColumn(Vec<CellStyle>),
    Uniform(CellStyle),
}

impl StyleOverride {
    /// Style for the cell in `col`. Per-column lists shorter than the row
    /// leave the remaining cells on the column default.
    pub fn for_column(&self, col: usize) -> Option<&CellStyle> {
        match self {
            StyleOverride::PerColumn(styles) => styles.get(col),
            StyleOverride::Uniform(style) => Some(style),
        }
    }
}

impl From<CellStyle> for StyleOverride {
    fn from(style: CellStyle) -> Self {
        StyleOverride::Uniform(style)
    }
}

impl From<Vec<CellStyle>> for StyleOverride {
    fn from(styles: Vec<CellStyle>) -> Self {
        StyleOverride::PerColumn(styles)
    }
}

/// Options for [`write_header`](super::StreamingWorkbook::write_header).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    /// Explicit widths for the leading columns
    pub widths: Vec<f64>,
    /// Add an autofilter over the written range
    pub auto_filter: bool,
    /// Number of rows frozen at the top
    pub freeze_rows: u32,
    /// Number of columns frozen at the left
    pub freeze_columns: u32,
    /// Declare the column formats without writing the label row
    pub suppress_row: bool,
    /// Style for the label row
    pub style: Option<StyleOverride>,
}

impl HeaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widths(mut self, widths: impl Into<Vec<f64>>) -> Self {
        self.widths = widths.into();
        self
    }

    pub fn auto_filter(mut self, enabled: bool) -> Self {
        self.auto_filter = enabled;
        self
    }

    pub fn freeze(mut self, rows: u32, columns: u32) -> Self {
        self.freeze_rows = rows;
        self.freeze_columns = columns;
        self
    }

    pub fn suppress_row(mut self, suppress: bool) -> Self {
        self.suppress_row = suppress;
        self
    }

    pub fn style(mut self, style: impl Into<StyleOverride>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Options for [`write_row`](super::StreamingWorkbook::write_row).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RowOptions {
    /// Row height in points; the default height is used when unset
    pub height: Option<f64>,
    pub hidden: bool,
    pub collapsed: bool,
    pub style: Option<StyleOverride>,
}

impl RowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn style(mut self, style: impl Into<StyleOverride>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// Workbook-wide settings.
///
/// ```
/// use streamxlsx::WriterOptions;
///
/// let options: WriterOptions =
///     serde_json::from_str(r#"{"buffer_size": 65536, "compression": "stored"}"#).unwrap();
/// assert_eq!(options.buffer_size, 65536);
/// assert!(options.temp_dir.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Directory for sheet backing files; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Bytes buffered per sheet before a flush
    pub buffer_size: usize,
    /// Log the first invalid UTF-8 chunk written to each sheet.
    ///
    /// Sheet XML is always assembled from `str`, so through the workbook
    /// API this never fires. It only catches bad input when a
    /// [`BufferedWriter`](super::buffer::BufferedWriter) is fed raw bytes
    /// with `write_bytes`.
    pub check_utf8: bool,
    pub compression: Compression,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            temp_dir: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            check_utf8: false,
            compression: Compression::default(),
        }
    }
}

impl WriterOptions {
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn check_utf8(mut self, enabled: bool) -> Self {
        self.check_utf8 = enabled;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}
