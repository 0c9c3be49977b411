//! Streaming workbook assembler.
//!
//! [`StreamingWorkbook`] owns every open [`SheetStream`] plus the shared
//! style tables and document metadata. Sheets are created lazily by the
//! first call that names them and packaged together into a single `.xlsx`
//! archive at the end.

use crate::common::error::{Error, Result};
use crate::common::xml::escape_xml;
use crate::ooxml::common::DocumentProperties;
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::{ContentTypes, PhysPkgWriter, Relationships};
use crate::ooxml::xlsx::cell::CellValue;
use crate::ooxml::xlsx::writer::options::{Header, HeaderOptions, RowOptions, WriterOptions};
use crate::ooxml::xlsx::writer::sheet::SheetStream;
use crate::ooxml::xlsx::writer::styles::StylesBuilder;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name used by [`StreamingWorkbook::write_sheet`] when none is given.
const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// A workbook written row by row.
///
/// # Example
///
/// ```no_run
/// use streamxlsx::{Header, HeaderOptions, StreamingWorkbook};
///
/// let mut workbook = StreamingWorkbook::new();
/// workbook.set_title("Sales");
///
/// let header: Header = [("year", "string"), ("amount", "money")].into_iter().collect();
/// workbook.write_header("Sales", &header, &HeaderOptions::new().auto_filter(true))?;
/// workbook.write_row("Sales", ["2023", "1200.50"], None)?;
/// workbook.write_row("Sales", ["2024", "1375.00"], None)?;
///
/// workbook.package("sales.xlsx")?;
/// # Ok::<(), streamxlsx::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct StreamingWorkbook {
    /// Sheets in declaration order
    sheets: Vec<SheetStream>,
    /// Caller-supplied sheet name to position in `sheets`
    sheet_index: HashMap<String, usize>,
    /// Sheet touched by the most recent header or row call
    current_sheet: Option<usize>,
    styles: StylesBuilder,
    properties: DocumentProperties,
    right_to_left: bool,
    options: WriterOptions,
}

impl StreamingWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.properties.title = title.to_string();
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.properties.subject = subject.to_string();
    }

    pub fn set_author(&mut self, author: &str) {
        self.properties.creator = author.to_string();
    }

    pub fn set_company(&mut self, company: &str) {
        self.properties.company = company.to_string();
    }

    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.keywords = keywords.into_iter().map(Into::into).collect();
    }

    pub fn set_description(&mut self, description: &str) {
        self.properties.description = description.to_string();
    }

    /// Lay out sheets created from now on right to left.
    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        self.right_to_left = right_to_left;
    }

    /// Directory for the backing files of sheets created from now on.
    pub fn set_temp_dir(&mut self, dir: impl Into<PathBuf>) {
        self.options.temp_dir = Some(dir.into());
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub fn styles(&self) -> &StylesBuilder {
        &self.styles
    }

    /// Position of the named sheet, creating it with `layout` if needed.
    fn sheet_entry(&mut self, name: &str, layout: &HeaderOptions) -> Result<usize> {
        if name.is_empty() {
            return Err(Error::EmptySheetName);
        }
        if let Some(&idx) = self.sheet_index.get(name) {
            return Ok(idx);
        }

        let idx = self.sheets.len();
        let sheet = SheetStream::create(name, idx + 1, layout, self.right_to_left, &self.options)?;
        self.sheets.push(sheet);
        self.sheet_index.insert(name.to_string(), idx);
        Ok(idx)
    }

    /// Write a whole sheet at once: optional header, every row, then finalize.
    ///
    /// An empty name falls back to `Sheet1`; no rows still produce one row
    /// holding a single empty cell.
    pub fn write_sheet<R, I, V>(&mut self, name: &str, rows: R, header: Option<&Header>) -> Result<()>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let name = if name.is_empty() { DEFAULT_SHEET_NAME } else { name };
        if let Some(header) = header
            && !header.is_empty()
        {
            self.write_header(name, header, &HeaderOptions::default())?;
        }

        let mut written = false;
        for row in rows {
            self.write_row(name, row, None)?;
            written = true;
        }
        if !written {
            self.write_row(name, [CellValue::Empty], None)?;
        }
        self.finalize_sheet(name)
    }

    /// Create a sheet and fix its column formats, writing the label row
    /// unless `options.suppress_row` is set.
    ///
    /// Declaring a header for a sheet that already exists does nothing.
    pub fn write_header(&mut self, name: &str, header: &Header, options: &HeaderOptions) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptySheetName);
        }
        if header.is_empty() {
            return Ok(());
        }
        if self.sheet_index.contains_key(name) {
            log::warn!("header for sheet '{name}' ignored: the sheet already exists");
            return Ok(());
        }

        let idx = self.sheet_entry(name, options)?;
        let sheet = &mut self.sheets[idx];
        sheet.set_columns(header.formats(), &mut self.styles)?;
        if !options.suppress_row {
            sheet.write_header_row(header.labels(), options.style.as_ref(), &mut self.styles)?;
        }
        self.current_sheet = Some(idx);
        Ok(())
    }

    /// Append a row to the named sheet, creating the sheet if needed.
    pub fn write_row<I, V>(&mut self, name: &str, values: I, options: Option<&RowOptions>) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        let idx = self.sheet_entry(name, &HeaderOptions::default())?;
        self.sheets[idx].write_row(&values, options, &mut self.styles)?;
        self.current_sheet = Some(idx);
        Ok(())
    }

    /// Merge the inclusive zero-based range on the named sheet.
    pub fn mark_merged_cells(
        &mut self,
        name: &str,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
    ) -> Result<()> {
        let idx = self.sheet_entry(name, &HeaderOptions::default())?;
        self.sheets[idx].merge_cells(first_row, first_col, last_row, last_col)
    }

    /// Close the named sheet. Unknown or already finalized sheets are left
    /// alone.
    pub fn finalize_sheet(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptySheetName);
        }
        match self.sheet_index.get(name) {
            Some(&idx) => self.sheets[idx].finalize(),
            None => {
                log::debug!("finalize requested for unknown sheet '{name}'");
                Ok(())
            },
        }
    }

    /// Rows written so far to the named sheet, or to the most recently used
    /// sheet when `name` is empty. Unknown sheets count zero.
    pub fn count_sheet_rows(&self, name: &str) -> u32 {
        let idx = if name.is_empty() {
            self.current_sheet
        } else {
            self.sheet_index.get(name).copied()
        };
        idx.map_or(0, |idx| self.sheets[idx].row_count())
    }

    /// Tab names in declaration order, as they appear in the package.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(SheetStream::name).collect()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Finalize every sheet and write the archive to `destination`.
    ///
    /// The archive is first written to a temp file in the destination's
    /// directory and then moved into place, so a failure never leaves a
    /// partial file behind. Nothing is created when no sheet was declared.
    pub fn package(&mut self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        if self.sheets.is_empty() {
            log::warn!("not writing {}: no worksheets defined", destination.display());
            return Err(Error::NoWorksheets);
        }
        if let Ok(metadata) = std::fs::metadata(destination)
            && (metadata.is_dir() || metadata.permissions().readonly())
        {
            log::warn!("not writing {}: destination is not writable", destination.display());
            return Err(Error::DestinationNotWritable(destination.display().to_string()));
        }

        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        self.write_to(&mut staged)?;
        staged.as_file().sync_all()?;
        staged.persist(destination)?;

        log::debug!("packaged {} sheets into {}", self.sheets.len(), destination.display());
        Ok(())
    }

    /// Finalize every sheet and write the archive to `writer`.
    pub fn write_to<W: Write + Seek>(&mut self, writer: W) -> Result<W> {
        if self.sheets.is_empty() {
            return Err(Error::NoWorksheets);
        }
        for sheet in &mut self.sheets {
            sheet.finalize()?;
        }

        let mut package = PhysPkgWriter::with_compression(writer, self.options.compression);
        package.write("docProps/app.xml", self.properties.to_app_xml().as_bytes())?;
        package.write("docProps/core.xml", self.properties.to_core_xml().as_bytes())?;
        package.write("_rels/.rels", package_rels().to_xml().as_bytes())?;
        for sheet in &self.sheets {
            let membername = format!("xl/worksheets/{}", sheet.xml_name());
            let size = package.write_file(&membername, sheet.path())?;
            log::debug!("added {membername} ({size} bytes)");
        }
        package.write("xl/workbook.xml", self.workbook_xml()?.as_bytes())?;
        package.write("xl/styles.xml", self.styles.to_xml()?.as_bytes())?;
        package.write("[Content_Types].xml", self.content_types().to_xml().as_bytes())?;
        package.write("xl/_rels/workbook.xml.rels", self.workbook_rels().to_xml().as_bytes())?;
        package.finish()
    }

    /// Finalize every sheet and return the archive bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    fn workbook_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024 + self.sheets.len() * 128);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        write!(
            xml,
            r#"<workbook xmlns="{}" xmlns:r="{}">"#,
            namespace::SML_MAIN,
            namespace::OFC_RELATIONSHIPS
        )?;
        xml.push_str(concat!(
            r#"<fileVersion appName="Calc"/>"#,
            r#"<workbookPr backupFile="false" showObjects="all" date1904="false"/>"#,
            r#"<workbookProtection/>"#,
            r#"<bookViews><workbookView activeTab="0" firstSheet="0" showHorizontalScroll="true" "#,
            r#"showSheetTabs="true" showVerticalScroll="true" tabRatio="212" windowHeight="8192" "#,
            r#"windowWidth="16384" xWindow="0" yWindow="0"/></bookViews>"#
        ));

        xml.push_str("<sheets>");
        for (i, sheet) in self.sheets.iter().enumerate() {
            write!(
                xml,
                r#"<sheet name="{}" sheetId="{}" state="visible" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 2
            )?;
        }
        xml.push_str("</sheets>");

        let mut filters = self
            .sheets
            .iter()
            .enumerate()
            .filter(|(_, sheet)| sheet.has_auto_filter())
            .peekable();
        if filters.peek().is_some() {
            xml.push_str("<definedNames>");
            for (i, sheet) in filters {
                let quoted = sheet.name().replace('\'', "''");
                write!(
                    xml,
                    r#"<definedName name="_xlnm._FilterDatabase" localSheetId="{}" hidden="1">{}</definedName>"#,
                    i,
                    escape_xml(&format!("'{quoted}'!$A$1:{}", sheet.max_cell().to_absolute()))
                )?;
            }
            xml.push_str("</definedNames>");
        }

        xml.push_str(r#"<calcPr iterateCount="100" refMode="A1" iterate="false" iterateDelta="0.001"/>"#);
        xml.push_str("</workbook>");
        Ok(xml)
    }

    fn workbook_rels(&self) -> Relationships {
        let mut rels = Relationships::new();
        rels.add("rId1", rt::STYLES, "styles.xml");
        for (i, sheet) in self.sheets.iter().enumerate() {
            rels.add(
                format!("rId{}", i + 2),
                rt::WORKSHEET,
                format!("worksheets/{}", sheet.xml_name()),
            );
        }
        rels
    }

    fn content_types(&self) -> ContentTypes {
        let mut types = ContentTypes::new();
        for sheet in &self.sheets {
            types.add_override(format!("/xl/worksheets/{}", sheet.xml_name()), ct::SML_WORKSHEET);
        }
        types.add_override("/xl/workbook.xml", ct::SML_SHEET_MAIN);
        types.add_override("/xl/styles.xml", ct::SML_STYLES);
        types.add_override("/docProps/app.xml", ct::OFC_EXTENDED_PROPERTIES);
        types.add_override("/docProps/core.xml", ct::OPC_CORE_PROPERTIES);
        types
    }
}

fn package_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("rId1", rt::OFFICE_DOCUMENT, "xl/workbook.xml");
    rels.add("rId2", rt::CORE_PROPERTIES, "docProps/core.xml");
    rels.add("rId3", rt::EXTENDED_PROPERTIES, "docProps/app.xml");
    rels
}
