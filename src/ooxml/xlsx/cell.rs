//! Cell values and A1-style cell addressing.
//!
//! Addresses are zero-based `(row, col)` pairs internally and rendered with
//! bijective base-26 column letters: column 0 is `A`, 25 is `Z`, 26 is `AA`.

use crate::common::error::{Error, Result};
use crate::ooxml::xlsx::date::{date_serial, datetime_serial};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Number of addressable rows in a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Number of addressable columns in a worksheet.
pub const MAX_COLS: u32 = 16_384;

/// Types of data that can be written to a cell.
///
/// Text is interpreted according to the column's number format (dates are
/// given as `YYYY-MM-DD` text, formulas start with `=`). Typed numbers skip
/// the text heuristics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (written with its style only)
    #[default]
    Empty,
    /// Boolean value, written as 1 or 0
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// Text value
    String(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::String(value.clone())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Float(f64::from(value))
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CellValue {
                fn from(value: $t) -> Self {
                    CellValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Stored as its day serial; a date-formatted column displays it as a date.
impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Float(date_serial(value))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Float(datetime_serial(value))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// Convert a zero-based column index to Excel column letters
/// (e.g., 0 -> "A", 25 -> "Z", 26 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = u64::from(col) + 1;

    while n > 0 {
        n -= 1;
        letters.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    letters.reverse();
    // Only ASCII capitals were pushed.
    letters.into_iter().map(char::from).collect()
}

/// Convert Excel column letters to a zero-based column index.
///
/// Returns `None` for an empty string, non-letters or an index that would
/// overflow `u32`.
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u64 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + u64::from(b.to_ascii_uppercase() - b'A' + 1);
        if col > u64::from(u32::MAX) {
            return None;
        }
    }
    u32::try_from(col - 1).ok()
}

/// A zero-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Render as an absolute reference (`$A$1`).
    pub fn to_absolute(&self) -> String {
        let mut buf = itoa::Buffer::new();
        let mut out = String::with_capacity(10);
        out.push('$');
        out.push_str(&column_to_letters(self.col));
        out.push('$');
        out.push_str(buf.format(u64::from(self.row) + 1));
        out
    }

    /// Render as a relative or absolute reference.
    pub fn to_a1(&self, absolute: bool) -> String {
        if absolute {
            self.to_absolute()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = itoa::Buffer::new();
        f.write_str(&column_to_letters(self.col))?;
        f.write_str(buf.format(u64::from(self.row) + 1))
    }
}

impl FromStr for CellRef {
    type Err = Error;

    /// Parse `A1` or `$A$1` (either dollar sign is optional).
    fn from_str(reference: &str) -> Result<Self> {
        let invalid = || Error::InvalidCellRef(reference.to_string());

        let rest = reference.strip_prefix('$').unwrap_or(reference);
        let split = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (letters, digits) = rest.split_at(split);
        let digits = digits.strip_prefix('$').unwrap_or(digits);

        let col = letters_to_column(letters).ok_or_else(invalid)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u64 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        let row = u32::try_from(row - 1).map_err(|_| invalid())?;

        Ok(CellRef { row, col })
    }
}

/// Render a zero-based coordinate in A1 notation.
pub fn xls_cell(row: u32, col: u32, absolute: bool) -> String {
    CellRef::new(row, col).to_a1(absolute)
}

/// Parse an A1 reference into a zero-based coordinate.
pub fn parse_cell_ref(reference: &str) -> Result<CellRef> {
    reference.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(column_to_letters(16_383), "XFD");
        assert_eq!(column_to_letters(16_384), "XFE");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(letters_to_column("A"), Some(0));
        assert_eq!(letters_to_column("z"), Some(25));
        assert_eq!(letters_to_column("AA"), Some(26));
        assert_eq!(letters_to_column("XFD"), Some(16_383));
        assert_eq!(letters_to_column(""), None);
        assert_eq!(letters_to_column("A1"), None);
    }

    #[test]
    fn test_xls_cell() {
        assert_eq!(xls_cell(0, 0, false), "A1");
        assert_eq!(xls_cell(9, 27, false), "AB10");
        assert_eq!(xls_cell(0, 0, true), "$A$1");
        assert_eq!(xls_cell(1_048_576, 16_384, false), "XFE1048577");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), CellRef::new(0, 0));
        assert_eq!(parse_cell_ref("$AB$10").unwrap(), CellRef::new(9, 27));
        assert_eq!(parse_cell_ref("c3").unwrap(), CellRef::new(2, 2));
        assert!(parse_cell_ref("A0").is_err());
        assert!(parse_cell_ref("11").is_err());
        assert!(parse_cell_ref("A").is_err());
        assert!(parse_cell_ref("A1B").is_err());
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(5u8), CellValue::Int(5));
        assert_eq!(CellValue::from("x"), CellValue::String("x".into()));
        assert_eq!(CellValue::from(None::<i32>), CellValue::Empty);
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(CellValue::from(date), CellValue::Float(45351.0));
        let dt = date.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(CellValue::from(dt), CellValue::Float(45351.5));
    }

    proptest! {
        #[test]
        fn prop_address_round_trip(row in 0u32..MAX_ROWS, col in 0u32..MAX_COLS, absolute in any::<bool>()) {
            let rendered = xls_cell(row, col, absolute);
            let parsed = parse_cell_ref(&rendered).unwrap();
            prop_assert_eq!(parsed, CellRef::new(row, col));
        }

        #[test]
        fn prop_column_letters_round_trip(col in 0u32..1_000_000) {
            prop_assert_eq!(letters_to_column(&column_to_letters(col)), Some(col));
        }
    }
}
