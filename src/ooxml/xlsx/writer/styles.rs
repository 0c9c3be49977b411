//! Styles.xml generator for XLSX files.
//!
//! This module interns number formats, fonts, fills, borders and cell formats
//! (XF records) into dense index tables while sheets are being streamed, and
//! generates the complete styles.xml once every sheet is finalized.
//!
//! Index spaces start with the built-in records every package carries:
//! one number format (`GENERAL`), four fonts, two fills (`none` and
//! `gray125`), one border and one cell format. Custom number formats are
//! written with `numFmtId = 164 + index`.

use crate::common::error::Result;
use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::format::{
    BorderLineStyle, BorderSides, CellStyle, Color, FontSize, FontStyle, HorizontalAlignment,
    VerticalAlignment,
};
use crate::ooxml::xlsx::number_format::GENERAL;
use crate::ooxml::xlsx::writer::cell::format_number;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// First id available for custom number formats.
pub const CUSTOM_NUM_FMT_BASE: usize = 164;

const BUILTIN_FONTS: usize = 4;
const BUILTIN_FILLS: usize = 2;
const BUILTIN_BORDERS: usize = 1;

const DEFAULT_FONT_NAME: &str = "Arial";
const DEFAULT_FONT_FAMILY: u8 = 2;
const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Master cell style records after the first one: `(fontId, numFmtId)`.
const STYLE_XFS: [(usize, usize); 19] = [
    (1, 0),
    (1, 0),
    (2, 0),
    (2, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (0, 0),
    (1, 43),
    (1, 41),
    (1, 44),
    (1, 42),
    (1, 9),
];

/// Named cell styles: `(builtinId, name, xfId)`.
const CELL_STYLES: [(u8, &str, usize); 6] = [
    (0, "Normal", 0),
    (3, "Comma", 15),
    (6, "Comma [0]", 16),
    (4, "Currency", 17),
    (7, "Currency [0]", 18),
    (5, "Percent", 19),
];

/// Resolved font record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontRecord {
    name: String,
    family: u8,
    size: FontSize,
    color: Option<Color>,
    style: FontStyle,
}

impl FontRecord {
    fn default_font() -> Self {
        Self {
            name: DEFAULT_FONT_NAME.to_string(),
            family: DEFAULT_FONT_FAMILY,
            size: FontSize::from_trusted(DEFAULT_FONT_SIZE),
            color: None,
            style: FontStyle::empty(),
        }
    }

    /// Overlay the font attributes of a style on the default font.
    fn from_style(style: &CellStyle) -> Self {
        let mut font = Self::default_font();
        if let Some(size) = style.font_size {
            font.size = size;
        }
        if let Some(ref name) = style.font {
            font.family = font_family(name).unwrap_or(font.family);
            font.name = name.clone();
        }
        font.style = style.font_style;
        font.color = style.color.clone();
        font
    }
}

/// Font family class for well-known faces.
fn font_family(name: &str) -> Option<u8> {
    match name {
        "Times New Roman" => Some(1),
        "Courier New" => Some(3),
        "Comic Sans MS" => Some(4),
        _ => None,
    }
}

/// Resolved border record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BorderRecord {
    sides: BorderSides,
    style: BorderLineStyle,
    color: Option<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
    wrap_text: bool,
}

/// Cell format (XF record) referencing the other tables by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellXf {
    num_fmt_idx: usize,
    font_id: usize,
    fill_id: usize,
    border_id: Option<usize>,
    alignment: Option<Alignment>,
}

/// Interner for every table in styles.xml.
///
/// Identical requests always return identical indices and indices never
/// change once handed out, so they can be written into sheet XML
/// immediately.
#[derive(Debug)]
pub struct StylesBuilder {
    /// Number formats (index -> pattern)
    number_formats: Vec<String>,
    /// Number format lookup (pattern -> index)
    number_format_map: HashMap<String, usize>,
    /// Custom fonts, stored after the built-in ones
    fonts: Vec<FontRecord>,
    font_map: HashMap<FontRecord, usize>,
    /// Custom solid fills, stored after the built-in ones
    fills: Vec<Color>,
    fill_map: HashMap<Color, usize>,
    /// Custom borders, stored after the built-in one
    borders: Vec<BorderRecord>,
    border_map: HashMap<BorderRecord, usize>,
    /// Cell formats (index -> XF record)
    cell_formats: Vec<CellXf>,
    /// Cell format lookup (format index -> style -> index)
    cell_format_map: HashMap<usize, HashMap<CellStyle, usize>>,
}

impl StylesBuilder {
    /// Create a new StylesBuilder holding the built-in records.
    pub fn new() -> Self {
        let mut builder = Self {
            number_formats: Vec::new(),
            number_format_map: HashMap::new(),
            fonts: Vec::new(),
            font_map: HashMap::new(),
            fills: Vec::new(),
            fill_map: HashMap::new(),
            borders: Vec::new(),
            border_map: HashMap::new(),
            cell_formats: Vec::new(),
            cell_format_map: HashMap::new(),
        };

        // Style 0 is the general format without attributes.
        builder.add_cell_style(GENERAL, None);
        builder
    }

    /// Intern a canonical number-format pattern and return its index.
    pub fn intern_format(&mut self, pattern: &str) -> usize {
        if let Some(&index) = self.number_format_map.get(pattern) {
            return index;
        }

        let index = self.number_formats.len();
        self.number_formats.push(pattern.to_string());
        self.number_format_map.insert(pattern.to_string(), index);
        index
    }

    /// Intern a `(number format, style)` pair and return its style index.
    ///
    /// Fonts, fills and borders the style needs are interned on first sight.
    pub fn intern_style(&mut self, num_fmt_idx: usize, style: &CellStyle) -> usize {
        if let Some(&index) = self
            .cell_format_map
            .get(&num_fmt_idx)
            .and_then(|styles| styles.get(style))
        {
            return index;
        }

        let border_id = (!style.border.is_empty()).then(|| {
            self.add_border(BorderRecord {
                sides: style.border,
                style: style.border_style.unwrap_or_default(),
                color: style.border_color.clone(),
            })
        });

        let fill_id = style.fill.as_ref().map_or(0, |color| self.add_fill(color));

        let alignment = style.has_alignment().then(|| Alignment {
            horizontal: style.halign.unwrap_or_default(),
            vertical: style.valign.unwrap_or_default(),
            wrap_text: style.wrap_text.unwrap_or(false),
        });

        let font = FontRecord::from_style(style);
        let font_id = if font == FontRecord::default_font() {
            0
        } else {
            self.add_font(font)
        };

        let index = self.cell_formats.len();
        self.cell_formats.push(CellXf {
            num_fmt_idx,
            font_id,
            fill_id,
            border_id,
            alignment,
        });
        self.cell_format_map
            .entry(num_fmt_idx)
            .or_default()
            .insert(style.clone(), index);
        index
    }

    /// Intern a pattern and an optional style in one step.
    pub fn add_cell_style(&mut self, pattern: &str, style: Option<&CellStyle>) -> usize {
        let num_fmt_idx = self.intern_format(pattern);
        match style {
            Some(style) => self.intern_style(num_fmt_idx, style),
            None => self.intern_style(num_fmt_idx, &CellStyle::default()),
        }
    }

    /// Number of cell formats, built-in included.
    pub fn style_count(&self) -> usize {
        self.cell_formats.len()
    }

    /// Number of number formats, `GENERAL` included.
    pub fn format_count(&self) -> usize {
        self.number_formats.len()
    }

    pub fn font_count(&self) -> usize {
        BUILTIN_FONTS + self.fonts.len()
    }

    pub fn fill_count(&self) -> usize {
        BUILTIN_FILLS + self.fills.len()
    }

    pub fn border_count(&self) -> usize {
        BUILTIN_BORDERS + self.borders.len()
    }

    /// Pattern of an interned number format.
    pub fn format_pattern(&self, index: usize) -> Option<&str> {
        self.number_formats.get(index).map(String::as_str)
    }

    fn add_font(&mut self, font: FontRecord) -> usize {
        if let Some(&index) = self.font_map.get(&font) {
            return index;
        }

        let index = BUILTIN_FONTS + self.fonts.len();
        self.fonts.push(font.clone());
        self.font_map.insert(font, index);
        index
    }

    fn add_fill(&mut self, color: &Color) -> usize {
        if let Some(&index) = self.fill_map.get(color) {
            return index;
        }

        let index = BUILTIN_FILLS + self.fills.len();
        self.fills.push(color.clone());
        self.fill_map.insert(color.clone(), index);
        index
    }

    fn add_border(&mut self, border: BorderRecord) -> usize {
        if let Some(&index) = self.border_map.get(&border) {
            return index;
        }

        let index = BUILTIN_BORDERS + self.borders.len();
        self.borders.push(border.clone());
        self.border_map.insert(border, index);
        index
    }

    /// Generate the complete styles.xml content.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(8192 + self.cell_formats.len() * 320);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        write!(xml, r#"<styleSheet xmlns="{}">"#, namespace::SML_MAIN)?;

        write!(xml, r#"<numFmts count="{}">"#, self.number_formats.len())?;
        for (i, num_fmt) in self.number_formats.iter().enumerate() {
            write!(
                xml,
                r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                CUSTOM_NUM_FMT_BASE + i,
                escape_xml(num_fmt)
            )?;
        }
        xml.push_str("</numFmts>");

        write!(xml, r#"<fonts count="{}">"#, self.font_count())?;
        xml.push_str(r#"<font><name val="Arial"/><charset val="1"/><family val="2"/><sz val="10"/></font>"#);
        for _ in 1..BUILTIN_FONTS {
            xml.push_str(r#"<font><name val="Arial"/><family val="0"/><sz val="10"/></font>"#);
        }
        for font in &self.fonts {
            self.write_font(&mut xml, font)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, self.fill_count())?;
        xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
        xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
        for fill in &self.fills {
            write!(
                xml,
                r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/><bgColor indexed="64"/></patternFill></fill>"#,
                fill.as_argb()
            )?;
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, self.border_count())?;
        xml.push_str(r#"<border diagonalDown="false" diagonalUp="false"><left/><right/><top/><bottom/><diagonal/></border>"#);
        for border in &self.borders {
            self.write_border(&mut xml, border)?;
        }
        xml.push_str("</borders>");

        self.write_style_xfs(&mut xml)?;

        write!(xml, r#"<cellXfs count="{}">"#, self.cell_formats.len())?;
        for xf in &self.cell_formats {
            self.write_cell_xf(&mut xml, xf)?;
        }
        xml.push_str("</cellXfs>");

        write!(xml, r#"<cellStyles count="{}">"#, CELL_STYLES.len())?;
        for (builtin_id, name, xf_id) in CELL_STYLES {
            write!(
                xml,
                r#"<cellStyle builtinId="{builtin_id}" customBuiltin="false" name="{name}" xfId="{xf_id}"/>"#
            )?;
        }
        xml.push_str("</cellStyles>");

        xml.push_str("</styleSheet>");

        Ok(xml)
    }

    /// Write a font element to XML.
    fn write_font(&self, xml: &mut String, font: &FontRecord) -> Result<()> {
        write!(
            xml,
            r#"<font><name val="{}"/><charset val="1"/><family val="{}"/><sz val="{}"/>"#,
            escape_xml(&font.name),
            font.family,
            format_number(font.size.points())
        )?;

        if let Some(ref color) = font.color {
            write!(xml, r#"<color rgb="{}"/>"#, color.as_argb())?;
        }
        if font.style.contains(FontStyle::BOLD) {
            xml.push_str(r#"<b val="true"/>"#);
        }
        if font.style.contains(FontStyle::ITALIC) {
            xml.push_str(r#"<i val="true"/>"#);
        }
        if font.style.contains(FontStyle::UNDERLINE) {
            xml.push_str(r#"<u val="single"/>"#);
        }
        if font.style.contains(FontStyle::STRIKE) {
            xml.push_str(r#"<strike val="true"/>"#);
        }

        xml.push_str("</font>");
        Ok(())
    }

    /// Write a border element to XML.
    fn write_border(&self, xml: &mut String, border: &BorderRecord) -> Result<()> {
        xml.push_str(r#"<border diagonalDown="false" diagonalUp="false">"#);

        for (side, name) in [
            (BorderSides::LEFT, "left"),
            (BorderSides::RIGHT, "right"),
            (BorderSides::TOP, "top"),
            (BorderSides::BOTTOM, "bottom"),
        ] {
            if border.sides.contains(side) {
                write!(xml, r#"<{} style="{}">"#, name, border.style.as_str())?;
                if let Some(ref color) = border.color {
                    write!(xml, r#"<color rgb="{}"/>"#, color.as_argb())?;
                }
                write!(xml, "</{}>", name)?;
            } else {
                write!(xml, "<{}/>", name)?;
            }
        }

        xml.push_str("<diagonal/></border>");
        Ok(())
    }

    /// Write the master cell style records referenced by the named styles.
    fn write_style_xfs(&self, xml: &mut String) -> Result<()> {
        write!(xml, r#"<cellStyleXfs count="{}">"#, STYLE_XFS.len() + 1)?;
        write!(
            xml,
            r#"<xf applyAlignment="true" applyBorder="true" applyFont="true" applyProtection="true" borderId="0" fillId="0" fontId="0" numFmtId="{}">"#,
            CUSTOM_NUM_FMT_BASE
        )?;
        xml.push_str(r#"<alignment horizontal="general" indent="0" shrinkToFit="false" textRotation="0" vertical="bottom" wrapText="false"/>"#);
        xml.push_str(r#"<protection hidden="false" locked="true"/>"#);
        xml.push_str("</xf>");
        for (font_id, num_fmt_id) in STYLE_XFS {
            write!(
                xml,
                r#"<xf applyAlignment="false" applyBorder="false" applyFont="true" applyProtection="false" borderId="0" fillId="0" fontId="{font_id}" numFmtId="{num_fmt_id}"/>"#
            )?;
        }
        xml.push_str("</cellStyleXfs>");
        Ok(())
    }

    /// Write one cell format record.
    fn write_cell_xf(&self, xml: &mut String, xf: &CellXf) -> Result<()> {
        let alignment = xf.alignment.unwrap_or(Alignment {
            horizontal: HorizontalAlignment::General,
            vertical: VerticalAlignment::Bottom,
            wrap_text: false,
        });

        write!(
            xml,
            r#"<xf applyAlignment="{}" applyBorder="{}" applyFont="true" applyProtection="false" borderId="{}" fillId="{}" fontId="{}" numFmtId="{}" xfId="0">"#,
            xf.alignment.is_some(),
            xf.border_id.is_some(),
            xf.border_id.unwrap_or(0),
            xf.fill_id,
            xf.font_id,
            CUSTOM_NUM_FMT_BASE + xf.num_fmt_idx
        )?;
        write!(
            xml,
            r#"<alignment horizontal="{}" vertical="{}" textRotation="0" wrapText="{}" indent="0" shrinkToFit="false"/>"#,
            alignment.horizontal.as_str(),
            alignment.vertical.as_str(),
            alignment.wrap_text
        )?;
        xml.push_str(r#"<protection locked="true" hidden="false"/>"#);
        xml.push_str("</xf>");
        Ok(())
    }
}

impl Default for StylesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        "#f00".parse().unwrap()
    }

    #[test]
    fn test_create_default_styles() {
        let builder = StylesBuilder::new();
        assert_eq!(builder.font_count(), 4);
        assert_eq!(builder.fill_count(), 2);
        assert_eq!(builder.border_count(), 1);
        assert_eq!(builder.style_count(), 1);
        assert_eq!(builder.format_pattern(0), Some("GENERAL"));
    }

    #[test]
    fn test_general_without_style_is_style_zero() {
        let mut builder = StylesBuilder::new();
        assert_eq!(builder.add_cell_style(GENERAL, None), 0);
        assert_eq!(builder.add_cell_style(GENERAL, Some(&CellStyle::default())), 0);
    }

    #[test]
    fn test_add_cell_style_is_idempotent() {
        let mut builder = StylesBuilder::new();
        let style = CellStyle::new().bold();

        let index = builder.add_cell_style("0", Some(&style));
        assert_eq!(index, 1);
        assert_eq!(builder.add_cell_style("0", Some(&style)), index);
        assert_eq!(builder.style_count(), 2);
    }

    #[test]
    fn test_construction_order_does_not_matter() {
        let mut builder = StylesBuilder::new();
        let a = CellStyle::new().fill(red()).bold().halign(HorizontalAlignment::Center);
        let b = CellStyle::new()
            .halign(HorizontalAlignment::Center)
            .font_style(FontStyle::BOLD)
            .fill(Color::rgb(255, 0, 0));

        assert_eq!(builder.add_cell_style("@", Some(&a)), builder.add_cell_style("@", Some(&b)));
    }

    #[test]
    fn test_distinct_pairs_get_distinct_indices() {
        let mut builder = StylesBuilder::new();
        let bold = CellStyle::new().bold();

        let s1 = builder.add_cell_style("0", Some(&bold));
        let s2 = builder.add_cell_style("@", Some(&bold));
        let s3 = builder.add_cell_style("0", None);
        assert_ne!(s1, s2);
        assert_ne!(s1, s3);
        assert_ne!(s2, s3);
        // One bold font shared by both styles.
        assert_eq!(builder.font_count(), 5);
    }

    #[test]
    fn test_default_font_is_not_interned() {
        let mut builder = StylesBuilder::new();
        builder.add_cell_style("0", Some(&CellStyle::new().font("Arial")));
        assert_eq!(builder.font_count(), 4);

        builder.add_cell_style("0", Some(&CellStyle::new().font("Courier New")));
        assert_eq!(builder.font_count(), 5);
    }

    #[test]
    fn test_fill_and_border_dedup() {
        let mut builder = StylesBuilder::new();
        let boxed = CellStyle::new()
            .border(BorderSides::all())
            .border_color(red())
            .fill(red());
        builder.add_cell_style("0", Some(&boxed));
        builder.add_cell_style("@", Some(&boxed));
        builder.add_cell_style("@", Some(&CellStyle::new().fill(red())));

        assert_eq!(builder.fill_count(), 3);
        assert_eq!(builder.border_count(), 2);
    }

    #[test]
    fn test_generate_xml() {
        let mut builder = StylesBuilder::new();

        let style = CellStyle::new()
            .font("Times New Roman")
            .font_size(FontSize::new(12.0).unwrap())
            .bold()
            .color(Color::rgb(0, 0, 255))
            .fill(red())
            .border(BorderSides::LEFT | BorderSides::BOTTOM)
            .halign(HorizontalAlignment::Right)
            .wrap_text(true);
        let index = builder.add_cell_style("#,##0.00", Some(&style));
        assert_eq!(index, 1);

        let xml = builder.to_xml().unwrap();
        assert!(xml.contains(r##"<numFmts count="2"><numFmt numFmtId="164" formatCode="GENERAL"/><numFmt numFmtId="165" formatCode="#,##0.00"/></numFmts>"##));
        assert!(xml.contains(r#"<fonts count="5">"#));
        assert!(xml.contains(r#"<font><name val="Times New Roman"/><charset val="1"/><family val="1"/><sz val="12"/><color rgb="FF0000FF"/><b val="true"/></font>"#));
        assert!(xml.contains(r#"<fill><patternFill patternType="solid"><fgColor rgb="FFFF0000"/><bgColor indexed="64"/></patternFill></fill>"#));
        assert!(xml.contains(r#"<left style="hair"></left><right/><top/><bottom style="hair"></bottom><diagonal/>"#));
        assert!(xml.contains(r#"<xf applyAlignment="true" applyBorder="true" applyFont="true" applyProtection="false" borderId="1" fillId="2" fontId="4" numFmtId="165" xfId="0"><alignment horizontal="right" vertical="bottom" textRotation="0" wrapText="true""#));
        assert!(xml.contains(r#"<cellStyleXfs count="20">"#));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
        assert!(xml.contains(r#"<cellStyle builtinId="5" customBuiltin="false" name="Percent" xfId="19"/>"#));
        assert!(xml.ends_with("</styleSheet>"));
    }

    #[test]
    fn test_fractional_font_size() {
        let mut builder = StylesBuilder::new();
        builder.add_cell_style("0", Some(&CellStyle::new().font_size(FontSize::new(10.5).unwrap())));
        assert!(builder.to_xml().unwrap().contains(r#"<sz val="10.5"/>"#));
    }
}
