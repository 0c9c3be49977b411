//! Streaming worksheet writer.
//!
//! A [`SheetStream`] owns a self-deleting temp file holding the worksheet
//! XML. Rows are serialized as they arrive; the only state kept in memory is
//! the column list, the merge ranges and a few counters. The `<dimension>`
//! tag is reserved at its widest possible size when the sheet is created and
//! patched in place once the final extent is known.

use crate::common::error::{Error, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::cell::{CellRef, CellValue, MAX_COLS, MAX_ROWS};
use crate::ooxml::xlsx::names::sanitize_sheet_name;
use crate::ooxml::xlsx::number_format::{ColumnFormat, GENERAL, NumberFormatType};
use crate::ooxml::xlsx::writer::buffer::BufferedWriter;
use crate::ooxml::xlsx::writer::cell::{format_number, write_cell};
use crate::ooxml::xlsx::writer::options::{HeaderOptions, RowOptions, StyleOverride, WriterOptions};
use crate::ooxml::xlsx::writer::styles::StylesBuilder;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::path::Path;
use tempfile::TempPath;

/// Row height written when the caller does not set one.
const DEFAULT_ROW_HEIGHT: f64 = 12.1;

/// Last column covered by the default `<col>` range.
const DEFAULT_COL_RANGE_END: usize = 1024;

/// A declared column: canonical format plus the style used when a cell has
/// no override.
#[derive(Debug, Clone)]
struct Column {
    format: ColumnFormat,
    default_style: usize,
}

/// One worksheet being written.
#[derive(Debug)]
pub struct SheetStream {
    /// Sanitized tab name
    name: String,
    /// Part file name inside `xl/worksheets/`
    xml_name: String,
    writer: BufferedWriter<File>,
    /// Backing file, removed when the stream is dropped
    path: TempPath,
    row_count: u32,
    columns: Vec<Column>,
    merge_cells: Vec<String>,
    dimension_offset: u64,
    dimension_width: usize,
    auto_filter: bool,
    /// Closing elements written; no further content is accepted
    trailer_written: bool,
    finalized: bool,
}

impl SheetStream {
    /// Create the backing file and write everything up to `<sheetData>`.
    ///
    /// # Arguments
    /// * `name` - Caller-supplied sheet name, sanitized for the tab
    /// * `position` - 1-based tab position; only the first sheet is selected
    /// * `layout` - Column widths, autofilter and frozen panes
    /// * `right_to_left` - Sheet view direction
    /// * `options` - Temp directory and buffering
    pub fn create(
        name: &str,
        position: usize,
        layout: &HeaderOptions,
        right_to_left: bool,
        options: &WriterOptions,
    ) -> Result<Self> {
        for width in &layout.widths {
            check_size("column width", *width)?;
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("xlsx_writer_").suffix(".xml");
        let (file, path) = match &options.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        }
        .into_parts();
        let writer = BufferedWriter::with_capacity(file, options.buffer_size).check_utf8(options.check_utf8);

        let mut sheet = Self {
            name: sanitize_sheet_name(name, position),
            xml_name: format!("sheet{position}.xml"),
            writer,
            path,
            row_count: 0,
            columns: Vec::new(),
            merge_cells: Vec::new(),
            dimension_offset: 0,
            dimension_width: 0,
            auto_filter: layout.auto_filter,
            trailer_written: false,
            finalized: false,
        };
        sheet.write_preamble(position == 1, layout, right_to_left)?;

        log::debug!(
            "created sheet '{}' as {} in {}",
            sheet.name,
            sheet.xml_name,
            sheet.path().display()
        );
        Ok(sheet)
    }

    fn write_preamble(&mut self, tab_selected: bool, layout: &HeaderOptions, right_to_left: bool) -> Result<()> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        write!(
            xml,
            r#"<worksheet xmlns="{}" xmlns:r="{}">"#,
            namespace::SML_MAIN,
            namespace::OFC_RELATIONSHIPS
        )?;
        xml.push_str(r#"<sheetPr filterMode="false"><pageSetUpPr fitToPage="false"/></sheetPr>"#);
        self.writer.write(&xml)?;

        // Reserve room for the largest possible extent; patched on finalize.
        self.dimension_offset = self.writer.tell()?;
        let placeholder = dimension_tag(CellRef::new(MAX_ROWS, MAX_COLS));
        self.dimension_width = placeholder.len();
        self.writer.write(&placeholder)?;

        xml.clear();
        write!(
            xml,
            concat!(
                r#"<sheetViews><sheetView colorId="64" defaultGridColor="true" rightToLeft="{}" "#,
                r#"showFormulas="false" showGridLines="true" showOutlineSymbols="true" "#,
                r#"showRowColHeaders="true" showZeros="true" tabSelected="{}" topLeftCell="A1" "#,
                r#"view="normal" windowProtection="false" workbookViewId="0" zoomScale="100" "#,
                r#"zoomScaleNormal="100" zoomScalePageLayoutView="100">"#
            ),
            right_to_left, tab_selected
        )?;
        write_panes(&mut xml, layout.freeze_rows, layout.freeze_columns)?;
        xml.push_str("</sheetView></sheetViews>");

        xml.push_str("<cols>");
        for (i, width) in layout.widths.iter().enumerate() {
            write!(
                xml,
                r#"<col collapsed="false" hidden="false" max="{n}" min="{n}" style="0" customWidth="true" width="{}"/>"#,
                format_number(*width),
                n = i + 1
            )?;
        }
        if layout.widths.len() < DEFAULT_COL_RANGE_END {
            write!(
                xml,
                r#"<col collapsed="false" hidden="false" max="{}" min="{}" style="0" customWidth="false" width="11.5"/>"#,
                DEFAULT_COL_RANGE_END,
                layout.widths.len() + 1
            )?;
        }
        xml.push_str("</cols><sheetData>");
        self.writer.write(&xml)
    }

    /// Fix the column formats. Each format is standardized and its default
    /// style interned once.
    pub fn set_columns<'a, I>(&mut self, formats: I, styles: &mut StylesBuilder) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ensure_open()?;
        let columns: Vec<Column> = formats
            .into_iter()
            .map(|format| {
                let format = ColumnFormat::new(format);
                let default_style = styles.add_cell_style(&format.pattern, None);
                Column { format, default_style }
            })
            .collect();
        if columns.len() > MAX_COLS as usize {
            return Err(Error::ColumnLimitExceeded(columns.len() as u32));
        }
        self.columns = columns;
        Ok(())
    }

    /// Write the label row. Labels are always text; a style override is
    /// combined with the general format rather than the column format.
    pub fn write_header_row<I, S>(
        &mut self,
        labels: I,
        style: Option<&StyleOverride>,
        styles: &mut StylesBuilder,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_open()?;
        self.ensure_row_available()?;

        let row = self.row_count;
        let mut xml = String::with_capacity(256);
        write_row_open(&mut xml, row, None)?;
        for (c, label) in labels.into_iter().enumerate() {
            if c >= MAX_COLS as usize {
                return Err(Error::ColumnLimitExceeded(c as u32 + 1));
            }
            let style_idx = match style.and_then(|s| s.for_column(c)) {
                Some(cell_style) => styles.add_cell_style(GENERAL, Some(cell_style)),
                None => self
                    .columns
                    .get(c)
                    .map_or(0, |column| column.default_style),
            };
            let value = CellValue::from(label.as_ref());
            write_cell(&mut xml, row, c as u32, &value, NumberFormatType::String, style_idx);
        }
        xml.push_str("</row>");
        self.writer.write(&xml)?;
        self.row_count += 1;
        Ok(())
    }

    /// Write one data row.
    ///
    /// Rows wider than the declared columns extend them with general columns;
    /// existing columns keep their format.
    pub fn write_row(
        &mut self,
        values: &[CellValue],
        options: Option<&RowOptions>,
        styles: &mut StylesBuilder,
    ) -> Result<()> {
        self.ensure_open()?;
        self.ensure_row_available()?;
        if values.len() > MAX_COLS as usize {
            return Err(Error::ColumnLimitExceeded(values.len() as u32));
        }
        if let Some(height) = options.and_then(|o| o.height) {
            check_size("row height", height)?;
        }

        if self.columns.len() < values.len() {
            let default_style = styles.add_cell_style(GENERAL, None);
            self.columns.resize(
                values.len(),
                Column {
                    format: ColumnFormat::general(),
                    default_style,
                },
            );
        }

        let row = self.row_count;
        let style = options.and_then(|o| o.style.as_ref());
        let mut xml = String::with_capacity(64 + values.len() * 48);
        write_row_open(&mut xml, row, options)?;
        for (c, value) in values.iter().enumerate() {
            let column = &self.columns[c];
            let style_idx = match style.and_then(|s| s.for_column(c)) {
                Some(cell_style) => styles.add_cell_style(&column.format.pattern, Some(cell_style)),
                None => column.default_style,
            };
            write_cell(&mut xml, row, c as u32, value, column.format.kind, style_idx);
        }
        xml.push_str("</row>");
        self.writer.write(&xml)?;
        self.row_count += 1;
        Ok(())
    }

    /// Record a merged range. Coordinates are zero-based and inclusive.
    pub fn merge_cells(&mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Result<()> {
        self.ensure_open()?;
        for col in [first_col, last_col] {
            if col >= MAX_COLS {
                return Err(Error::ColumnLimitExceeded(col));
            }
        }
        for row in [first_row, last_row] {
            if row >= MAX_ROWS {
                return Err(Error::RowLimitExceeded(row));
            }
        }
        self.merge_cells.push(format!(
            "{}:{}",
            CellRef::new(first_row, first_col),
            CellRef::new(last_row, last_col)
        ));
        Ok(())
    }

    /// Write the closing elements, patch the dimension and close the file.
    /// Calling it again does nothing; after a failed attempt it resumes
    /// without writing the closing elements twice.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        if !self.trailer_written {
            self.write_trailer()?;
        }

        let tag = dimension_tag(self.max_cell());
        let patched = format!("{tag:<width$}", width = self.dimension_width);
        self.writer
            .seek_and_overwrite(self.dimension_offset, patched.as_bytes())?;
        self.writer.close_and_sync()?;
        self.finalized = true;

        log::debug!(
            "finalized sheet '{}': {} rows, {} columns",
            self.name,
            self.row_count,
            self.columns.len()
        );
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<()> {
        // Marked before writing: rows are refused even if this write fails.
        self.trailer_written = true;
        let max_cell = self.max_cell();
        let mut xml = String::with_capacity(1024 + self.merge_cells.len() * 32);
        xml.push_str("</sheetData>");
        if self.auto_filter {
            write!(xml, r#"<autoFilter ref="A1:{max_cell}"/>"#)?;
        }
        if !self.merge_cells.is_empty() {
            write!(xml, r#"<mergeCells count="{}">"#, self.merge_cells.len())?;
            for range in &self.merge_cells {
                write!(xml, r#"<mergeCell ref="{range}"/>"#)?;
            }
            xml.push_str("</mergeCells>");
        }
        xml.push_str(concat!(
            r#"<printOptions headings="false" gridLines="false" gridLinesSet="true" "#,
            r#"horizontalCentered="false" verticalCentered="false"/>"#,
            r#"<pageMargins left="0.5" right="0.5" top="1.0" bottom="1.0" header="0.5" footer="0.5"/>"#,
            r#"<pageSetup blackAndWhite="false" cellComments="none" copies="1" draft="false" "#,
            r#"firstPageNumber="1" fitToHeight="1" fitToWidth="1" horizontalDpi="300" "#,
            r#"orientation="portrait" pageOrder="downThenOver" paperSize="1" scale="100" "#,
            r#"useFirstPageNumber="true" usePrinterDefaults="false" verticalDpi="300"/>"#,
            r#"<headerFooter differentFirst="false" differentOddEven="false">"#,
            r#"<oddHeader>&amp;C&amp;&quot;Times New Roman,Regular&quot;&amp;12&amp;A</oddHeader>"#,
            r#"<oddFooter>&amp;C&amp;&quot;Times New Roman,Regular&quot;&amp;12Page &amp;P</oddFooter>"#,
            r#"</headerFooter></worksheet>"#
        ));
        self.writer.write(&xml)
    }

    /// Bottom-right cell of the written area; `A1` for an empty sheet.
    pub fn max_cell(&self) -> CellRef {
        CellRef::new(
            self.row_count.saturating_sub(1),
            (self.columns.len() as u32).saturating_sub(1),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xml_name(&self) -> &str {
        &self.xml_name
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Format of a column, if declared or extended to.
    pub fn column_format(&self, col: usize) -> Option<&ColumnFormat> {
        self.columns.get(col).map(|column| &column.format)
    }

    pub fn has_auto_filter(&self) -> bool {
        self.auto_filter
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_open(&self) -> Result<()> {
        if self.trailer_written {
            return Err(Error::SheetFinalized(self.name.clone()));
        }
        Ok(())
    }

    fn ensure_row_available(&self) -> Result<()> {
        if self.row_count >= MAX_ROWS {
            return Err(Error::RowLimitExceeded(self.row_count + 1));
        }
        Ok(())
    }
}

fn check_size(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidSize(what, value))
    }
}

fn dimension_tag(max_cell: CellRef) -> String {
    format!(r#"<dimension ref="A1:{max_cell}"/>"#)
}

fn write_row_open(xml: &mut String, row: u32, options: Option<&RowOptions>) -> Result<()> {
    let height = options.and_then(|o| o.height);
    let hidden = options.is_some_and(|o| o.hidden);
    let collapsed = options.is_some_and(|o| o.collapsed);
    write!(
        xml,
        r#"<row collapsed="{}" customFormat="false" customHeight="{}" hidden="{}" ht="{}" outlineLevel="0" r="{}">"#,
        collapsed,
        height.is_some(),
        hidden,
        format_number(height.unwrap_or(DEFAULT_ROW_HEIGHT)),
        u64::from(row) + 1
    )?;
    Ok(())
}

fn write_selection(xml: &mut String, cell: CellRef, pane: &str) -> Result<()> {
    write!(
        xml,
        r#"<selection activeCell="{cell}" activeCellId="0" pane="{pane}" sqref="{cell}"/>"#
    )?;
    Ok(())
}

/// Pane and selection elements for the frozen-pane layout.
fn write_panes(xml: &mut String, rows: u32, cols: u32) -> Result<()> {
    match (rows, cols) {
        (0, 0) => write_selection(xml, CellRef::new(0, 0), "topLeft"),
        (rows, 0) => {
            let top_left = CellRef::new(rows, 0);
            write!(
                xml,
                r#"<pane ySplit="{rows}" topLeftCell="{top_left}" activePane="bottomLeft" state="frozen"/>"#
            )?;
            write_selection(xml, top_left, "bottomLeft")
        },
        (0, cols) => {
            let top_left = CellRef::new(0, cols);
            write!(
                xml,
                r#"<pane xSplit="{cols}" topLeftCell="{top_left}" activePane="topRight" state="frozen"/>"#
            )?;
            write_selection(xml, top_left, "topRight")
        },
        (rows, cols) => {
            let top_left = CellRef::new(rows, cols);
            write!(
                xml,
                r#"<pane ySplit="{rows}" xSplit="{cols}" topLeftCell="{top_left}" activePane="bottomRight" state="frozen"/>"#
            )?;
            write_selection(xml, CellRef::new(rows, 0), "topRight")?;
            write_selection(xml, CellRef::new(0, cols), "bottomLeft")?;
            write_selection(xml, top_left, "bottomRight")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::format::CellStyle;

    fn new_sheet(layout: &HeaderOptions) -> SheetStream {
        SheetStream::create("Data", 1, layout, false, &WriterOptions::default()).unwrap()
    }

    fn contents(sheet: &SheetStream) -> String {
        std::fs::read_to_string(sheet.path()).unwrap()
    }

    #[test]
    fn test_create_writes_preamble() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        assert_eq!(sheet.name(), "Data");
        assert_eq!(sheet.xml_name(), "sheet1.xml");
        sheet.finalize().unwrap();

        let xml = contents(&sheet);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<worksheet"));
        assert!(xml.contains(r#"tabSelected="true""#));
        assert!(xml.contains(r#"rightToLeft="false""#));
        assert!(xml.contains(r#"<selection activeCell="A1" activeCellId="0" pane="topLeft" sqref="A1"/>"#));
        assert!(xml.contains(
            r#"<cols><col collapsed="false" hidden="false" max="1024" min="1" style="0" customWidth="false" width="11.5"/></cols><sheetData>"#
        ));
        assert!(xml.ends_with("</worksheet>"));
    }

    #[test]
    fn test_dimension_is_patched_in_place() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.set_columns(["string", "integer"], &mut styles).unwrap();
        sheet
            .write_row(&["a".into(), 1.into()], None, &mut styles)
            .unwrap();
        sheet
            .write_row(&["b".into(), 2.into()], None, &mut styles)
            .unwrap();
        sheet.finalize().unwrap();

        let xml = contents(&sheet);
        let reserved = dimension_tag(CellRef::new(MAX_ROWS, MAX_COLS)).len();
        let start = xml.find("<dimension").unwrap();
        let patched = &xml[start..start + reserved];
        assert_eq!(patched.trim_end(), r#"<dimension ref="A1:B2"/>"#);
        assert!(xml[start + reserved..].starts_with("<sheetViews>"));
    }

    #[test]
    fn test_empty_sheet_dimension() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        sheet.finalize().unwrap();
        assert_eq!(sheet.max_cell(), CellRef::new(0, 0));
        assert!(contents(&sheet).contains(r#"<dimension ref="A1:A1"/>"#));
    }

    #[test]
    fn test_header_row_uses_string_cells() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.set_columns(["integer"], &mut styles).unwrap();
        sheet.write_header_row(["42"], None, &mut styles).unwrap();
        sheet.finalize().unwrap();

        let xml = contents(&sheet);
        assert!(xml.contains(
            r#"<row collapsed="false" customFormat="false" customHeight="false" hidden="false" ht="12.1" outlineLevel="0" r="1"><c r="A1" s="1" t="inlineStr"><is><t>42</t></is></c></row>"#
        ));
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_header_style_override_uses_general_format() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.set_columns(["date"], &mut styles).unwrap();
        let bold = StyleOverride::from(CellStyle::new().bold());
        sheet
            .write_header_row(["when"], Some(&bold), &mut styles)
            .unwrap();

        let expected = styles.add_cell_style(GENERAL, Some(&CellStyle::new().bold()));
        sheet.finalize().unwrap();
        assert!(contents(&sheet).contains(&format!(r#"<c r="A1" s="{expected}" t="inlineStr">"#)));
    }

    #[test]
    fn test_wider_rows_extend_columns() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.set_columns(["string"], &mut styles).unwrap();
        sheet
            .write_row(&["007".into(), "42".into(), "x".into()], None, &mut styles)
            .unwrap();
        sheet.write_row(&["008".into()], None, &mut styles).unwrap();
        sheet.finalize().unwrap();

        assert_eq!(sheet.column_count(), 3);
        assert_eq!(sheet.column_format(0).unwrap().kind, NumberFormatType::String);
        assert_eq!(sheet.column_format(1).unwrap().kind, NumberFormatType::Auto);
        assert_eq!(sheet.column_format(2).unwrap().pattern, GENERAL);

        let xml = contents(&sheet);
        assert!(xml.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t>007</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B1" s="0" t="n"><v>42</v></c>"#));
        assert!(xml.contains(r#"<c r="A2" s="1" t="inlineStr"><is><t>008</t></is></c>"#));
    }

    #[test]
    fn test_row_options() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        let options = RowOptions::new().height(30.0).hidden(true).collapsed(true);
        sheet
            .write_row(&["x".into()], Some(&options), &mut styles)
            .unwrap();
        sheet.finalize().unwrap();
        assert!(contents(&sheet).contains(
            r#"<row collapsed="true" customFormat="false" customHeight="true" hidden="true" ht="30" outlineLevel="0" r="1">"#
        ));
    }

    #[test]
    fn test_row_style_override_per_column() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.set_columns(["integer", "integer"], &mut styles).unwrap();
        let default_style = styles.add_cell_style("0", None);
        let options = RowOptions::new().style(vec![CellStyle::new().italic()]);
        sheet
            .write_row(&[1.into(), 2.into()], Some(&options), &mut styles)
            .unwrap();
        let italic = styles.add_cell_style("0", Some(&CellStyle::new().italic()));
        sheet.finalize().unwrap();

        assert_ne!(italic, default_style);
        let xml = contents(&sheet);
        assert!(xml.contains(&format!(r#"<c r="A1" s="{italic}" t="n">"#)));
        assert!(xml.contains(&format!(r#"<c r="B1" s="{default_style}" t="n">"#)));
    }

    #[test]
    fn test_freeze_panes() {
        let mut sheet = new_sheet(&HeaderOptions::new().freeze(1, 0));
        sheet.finalize().unwrap();
        let xml = contents(&sheet);
        assert!(xml.contains(r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#));
        assert!(xml.contains(r#"<selection activeCell="A2" activeCellId="0" pane="bottomLeft" sqref="A2"/>"#));

        let mut sheet = new_sheet(&HeaderOptions::new().freeze(0, 2));
        sheet.finalize().unwrap();
        let xml = contents(&sheet);
        assert!(xml.contains(r#"<pane xSplit="2" topLeftCell="C1" activePane="topRight" state="frozen"/>"#));

        let mut sheet = new_sheet(&HeaderOptions::new().freeze(1, 1));
        sheet.finalize().unwrap();
        let xml = contents(&sheet);
        assert!(xml.contains(r#"<pane ySplit="1" xSplit="1" topLeftCell="B2" activePane="bottomRight" state="frozen"/>"#));
        assert_eq!(xml.matches("<selection ").count(), 3);
    }

    #[test]
    fn test_column_widths() {
        let mut sheet = new_sheet(&HeaderOptions::new().widths(vec![10.0, 20.5]));
        sheet.finalize().unwrap();
        let xml = contents(&sheet);
        assert!(xml.contains(r#"<col collapsed="false" hidden="false" max="1" min="1" style="0" customWidth="true" width="10"/>"#));
        assert!(xml.contains(r#"<col collapsed="false" hidden="false" max="2" min="2" style="0" customWidth="true" width="20.5"/>"#));
        assert!(xml.contains(r#"max="1024" min="3""#));
    }

    #[test]
    fn test_autofilter_precedes_merge_cells() {
        let mut sheet = new_sheet(&HeaderOptions::new().auto_filter(true));
        let mut styles = StylesBuilder::new();
        sheet
            .write_row(&["a".into(), "b".into()], None, &mut styles)
            .unwrap();
        sheet.merge_cells(0, 0, 0, 1).unwrap();
        sheet.finalize().unwrap();

        let xml = contents(&sheet);
        let filter = xml.find(r#"<autoFilter ref="A1:B1"/>"#).unwrap();
        let merges = xml
            .find(r#"<mergeCells count="1"><mergeCell ref="A1:B1"/></mergeCells>"#)
            .unwrap();
        assert!(filter < merges);
    }

    #[test]
    fn test_finalize_twice_is_noop() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        sheet.finalize().unwrap();
        let first = contents(&sheet);
        sheet.finalize().unwrap();
        assert_eq!(contents(&sheet), first);
        assert!(sheet.is_finalized());
    }

    #[test]
    fn test_writes_after_finalize_are_rejected() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.finalize().unwrap();
        assert!(matches!(
            sheet.write_row(&["x".into()], None, &mut styles),
            Err(Error::SheetFinalized(name)) if name == "Data"
        ));
        assert!(matches!(sheet.merge_cells(0, 0, 1, 1), Err(Error::SheetFinalized(_))));
        assert_eq!(sheet.row_count(), 0);
    }

    #[test]
    fn test_finalize_resumes_after_trailer() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        sheet.write_row(&["x".into()], None, &mut styles).unwrap();

        // An earlier finalize got as far as the closing elements.
        sheet.write_trailer().unwrap();
        assert!(!sheet.is_finalized());
        assert!(matches!(
            sheet.write_row(&["late".into()], None, &mut styles),
            Err(Error::SheetFinalized(_))
        ));

        sheet.finalize().unwrap();
        let xml = contents(&sheet);
        assert_eq!(xml.matches("</sheetData>").count(), 1);
        assert_eq!(xml.matches("</worksheet>").count(), 1);
        assert!(xml.contains(r#"<dimension ref="A1:A1"/>"#));
        assert!(!xml.contains("late"));
    }

    #[test]
    fn test_non_finite_sizes_are_rejected() {
        for width in [f64::NAN, f64::INFINITY, -1.0] {
            let layout = HeaderOptions::new().widths(vec![10.0, width]);
            assert!(matches!(
                SheetStream::create("Data", 1, &layout, false, &WriterOptions::default()),
                Err(Error::InvalidSize("column width", _))
            ));
        }

        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        let options = RowOptions::new().height(f64::INFINITY);
        assert!(matches!(
            sheet.write_row(&["x".into()], Some(&options), &mut styles),
            Err(Error::InvalidSize("row height", _))
        ));
        assert_eq!(sheet.row_count(), 0);
        sheet.finalize().unwrap();
        assert!(!contents(&sheet).contains("inf"));
    }

    #[test]
    fn test_utf8_check_passes_sheet_text() {
        let options = WriterOptions::default().buffer_size(1).check_utf8(true);
        let mut sheet = SheetStream::create("Data", 1, &HeaderOptions::default(), false, &options).unwrap();
        let mut styles = StylesBuilder::new();
        sheet
            .write_row(&["Größe".into(), "€ 5".into(), "日本".into()], None, &mut styles)
            .unwrap();
        sheet.finalize().unwrap();
        assert!(contents(&sheet).contains("<t>Größe</t>"));
    }

    #[test]
    fn test_column_limit() {
        let mut sheet = new_sheet(&HeaderOptions::default());
        let mut styles = StylesBuilder::new();
        let row = vec![CellValue::Empty; MAX_COLS as usize + 1];
        assert!(matches!(
            sheet.write_row(&row, None, &mut styles),
            Err(Error::ColumnLimitExceeded(_))
        ));
        assert!(matches!(
            sheet.merge_cells(0, 0, 0, MAX_COLS),
            Err(Error::ColumnLimitExceeded(_))
        ));
    }

    #[test]
    fn test_sheet_name_is_sanitized() {
        let sheet =
            SheetStream::create("a/b:c", 2, &HeaderOptions::default(), true, &WriterOptions::default())
                .unwrap();
        assert_eq!(sheet.name(), "abc");
        assert_eq!(sheet.xml_name(), "sheet2.xml");
    }

    #[test]
    fn test_temp_dir_option() {
        let dir = tempfile::tempdir().unwrap();
        let options = WriterOptions::default().temp_dir(dir.path());
        let sheet = SheetStream::create("S", 1, &HeaderOptions::default(), false, &options).unwrap();
        assert!(sheet.path().starts_with(dir.path()));
        let path = sheet.path().to_path_buf();
        drop(sheet);
        assert!(!path.exists());
    }
}
