//! Cell serializer.
//!
//! Turns one value plus its column type and style index into a `<c>` element.
//! The decision order is fixed: empty, formula, then the column type, with
//! `Auto` columns sniffing numeric-looking text.

use crate::common::xml::escape_xml;
use crate::ooxml::xlsx::cell::{CellRef, CellValue};
use crate::ooxml::xlsx::date::to_excel_serial;
use crate::ooxml::xlsx::number_format::NumberFormatType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as FmtWrite;

static NUMERIC_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?$").expect("valid numeric pattern"));

/// Whether text is written as a number in an `Auto` column.
///
/// Leading zeros disqualify (`"042"` stays text) except for a lone `"0"`.
pub fn is_numeric_text(text: &str) -> bool {
    NUMERIC_TEXT.is_match(text)
}

/// Render a float the way it is stored in `<v>`: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(value as i64).to_string()
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format(value).to_string()
    }
}

/// Typed value rendered as text, for string columns.
fn typed_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        CellValue::Int(i) => Some(itoa::Buffer::new().format(*i).to_string()),
        CellValue::Float(f) if f.is_finite() => Some(format_number(*f)),
        CellValue::Float(f) => Some(f.to_string()),
        CellValue::Empty | CellValue::String(_) => None,
    }
}

/// Typed value as a finite number, if it is one.
fn typed_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Int(i) => Some(*i as f64),
        CellValue::Float(f) if f.is_finite() => Some(*f),
        _ => None,
    }
}

fn push_open(xml: &mut String, cell: CellRef, style: usize, kind: &str) {
    let _ = write!(xml, r#"<c r="{cell}" s="{style}" t="{kind}">"#);
}

fn push_number(xml: &mut String, cell: CellRef, style: usize, value: &str) {
    push_open(xml, cell, style, "n");
    xml.push_str("<v>");
    xml.push_str(value);
    xml.push_str("</v></c>");
}

fn push_inline_string(xml: &mut String, cell: CellRef, style: usize, text: &str) {
    push_open(xml, cell, style, "inlineStr");
    xml.push_str("<is><t>");
    xml.push_str(&escape_xml(text));
    xml.push_str("</t></is></c>");
}

fn push_integer(xml: &mut String, cell: CellRef, style: usize, value: i64) {
    let mut buf = itoa::Buffer::new();
    push_number(xml, cell, style, buf.format(value));
}

/// Append the XML for one cell.
pub fn write_cell(
    xml: &mut String,
    row: u32,
    col: u32,
    value: &CellValue,
    kind: NumberFormatType,
    style: usize,
) {
    let cell = CellRef::new(row, col);

    if value.is_empty() {
        let _ = write!(xml, r#"<c r="{cell}" s="{style}"/>"#);
        return;
    }

    if let CellValue::String(text) = value
        && text.starts_with('=')
    {
        push_open(xml, cell, style, "s");
        xml.push_str("<f>");
        xml.push_str(&escape_xml(text));
        xml.push_str("</f></c>");
        return;
    }

    match (kind, value) {
        (NumberFormatType::Date, CellValue::String(text)) => {
            push_integer(xml, cell, style, to_excel_serial(text).trunc() as i64)
        },
        (NumberFormatType::DateTime, CellValue::String(text)) => {
            push_number(xml, cell, style, &format_number(to_excel_serial(text)))
        },
        (NumberFormatType::Date, value) => match typed_number(value) {
            Some(serial) => push_integer(xml, cell, style, serial.trunc() as i64),
            None => push_inline_string(xml, cell, style, &typed_text(value).unwrap_or_default()),
        },
        (NumberFormatType::Numeric, CellValue::String(text)) => {
            push_number(xml, cell, style, &escape_xml(text))
        },
        (NumberFormatType::String, CellValue::String(text)) => {
            push_inline_string(xml, cell, style, text)
        },
        (NumberFormatType::String, value) => {
            push_inline_string(xml, cell, style, &typed_text(value).unwrap_or_default())
        },
        (NumberFormatType::Auto, CellValue::String(text)) => {
            if is_numeric_text(text) {
                push_number(xml, cell, style, text)
            } else {
                push_inline_string(xml, cell, style, text)
            }
        },
        (_, value) => match typed_number(value) {
            Some(number) => push_number(xml, cell, style, &format_number(number)),
            // Non-finite floats have no numeric representation.
            None => push_inline_string(xml, cell, style, &typed_text(value).unwrap_or_default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: impl Into<CellValue>, kind: NumberFormatType) -> String {
        let mut xml = String::new();
        write_cell(&mut xml, 0, 0, &value.into(), kind, 3);
        xml
    }

    #[test]
    fn test_empty_cell() {
        assert_eq!(cell("", NumberFormatType::Numeric), r#"<c r="A1" s="3"/>"#);
        assert_eq!(cell(CellValue::Empty, NumberFormatType::Auto), r#"<c r="A1" s="3"/>"#);
    }

    #[test]
    fn test_formula_cell() {
        assert_eq!(
            cell("=SUM(A1:A2)", NumberFormatType::Numeric),
            r#"<c r="A1" s="3" t="s"><f>=SUM(A1:A2)</f></c>"#
        );
        assert_eq!(
            cell("=A1&\"x\"", NumberFormatType::String),
            r#"<c r="A1" s="3" t="s"><f>=A1&amp;&quot;x&quot;</f></c>"#
        );
    }

    #[test]
    fn test_auto_numeric_detection() {
        assert_eq!(cell("42", NumberFormatType::Auto), r#"<c r="A1" s="3" t="n"><v>42</v></c>"#);
        assert_eq!(cell("0", NumberFormatType::Auto), r#"<c r="A1" s="3" t="n"><v>0</v></c>"#);
        assert_eq!(cell("-3.25", NumberFormatType::Auto), r#"<c r="A1" s="3" t="n"><v>-3.25</v></c>"#);
        assert_eq!(
            cell("042", NumberFormatType::Auto),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>042</t></is></c>"#
        );
        assert_eq!(
            cell("1.", NumberFormatType::Auto),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>1.</t></is></c>"#
        );
    }

    #[test]
    fn test_numeric_text_predicate() {
        assert!(is_numeric_text("0"));
        assert!(is_numeric_text("0.5"));
        assert!(is_numeric_text("-10"));
        assert!(!is_numeric_text("00"));
        assert!(!is_numeric_text("1e5"));
        assert!(!is_numeric_text(" 1"));
        assert!(!is_numeric_text("+1"));
    }

    #[test]
    fn test_date_and_datetime_columns() {
        assert_eq!(
            cell("2024-01-01 18:00:00", NumberFormatType::Date),
            r#"<c r="A1" s="3" t="n"><v>45292</v></c>"#
        );
        assert_eq!(
            cell("2024-01-01 18:00:00", NumberFormatType::DateTime),
            r#"<c r="A1" s="3" t="n"><v>45292.75</v></c>"#
        );
        assert_eq!(cell(45292.5, NumberFormatType::Date), r#"<c r="A1" s="3" t="n"><v>45292</v></c>"#);
        assert_eq!(
            cell(45292.5, NumberFormatType::DateTime),
            r#"<c r="A1" s="3" t="n"><v>45292.5</v></c>"#
        );
    }

    #[test]
    fn test_numeric_column_writes_text_verbatim() {
        assert_eq!(
            cell("1234.50", NumberFormatType::Numeric),
            r#"<c r="A1" s="3" t="n"><v>1234.50</v></c>"#
        );
    }

    #[test]
    fn test_string_column() {
        assert_eq!(
            cell("007 <b>", NumberFormatType::String),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>007 &lt;b&gt;</t></is></c>"#
        );
        assert_eq!(
            cell(12, NumberFormatType::String),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>12</t></is></c>"#
        );
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(cell(7i64, NumberFormatType::Auto), r#"<c r="A1" s="3" t="n"><v>7</v></c>"#);
        assert_eq!(cell(2.5, NumberFormatType::Numeric), r#"<c r="A1" s="3" t="n"><v>2.5</v></c>"#);
        assert_eq!(cell(true, NumberFormatType::Auto), r#"<c r="A1" s="3" t="n"><v>1</v></c>"#);
        assert_eq!(
            cell(f64::NAN, NumberFormatType::Numeric),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>NaN</t></is></c>"#
        );
    }

    #[test]
    fn test_cell_reference_uses_row_and_column() {
        let mut xml = String::new();
        write_cell(&mut xml, 9, 27, &CellValue::Int(1), NumberFormatType::Auto, 0);
        assert!(xml.starts_with(r#"<c r="AB10" s="0""#));
    }

    #[test]
    fn test_control_characters_are_replaced() {
        assert_eq!(
            cell("a\u{01}b", NumberFormatType::String),
            r#"<c r="A1" s="3" t="inlineStr"><is><t>a b</t></is></c>"#
        );
    }
}
