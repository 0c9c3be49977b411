//! Number-format keywords, canonical patterns and coarse classification.
//!
//! Column formats arrive either as a keyword (`"date"`, `"money"`, ...) or as
//! a literal Excel pattern. [`standardize`] turns both into the canonical
//! pattern written to the stylesheet; [`classify`] decides how cell values in
//! that column are serialized.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern of the built-in general format.
pub const GENERAL: &str = "GENERAL";

/// How values in a column are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberFormatType {
    /// Decide per value: numeric-looking text becomes a number
    #[default]
    Auto,
    /// Always an inline string
    String,
    /// Always a number, text is written verbatim
    Numeric,
    /// Whole-day serial
    Date,
    /// Serial with time fraction
    DateTime,
}

/// Expand a keyword into its pattern; `None` for literal patterns.
fn preset(keyword: &str) -> Option<&'static str> {
    let pattern = match keyword {
        "string" => "@",
        "integer" | "number" => "0",
        "date" => "YYYY-MM-DD",
        "datetime" => "YYYY-MM-DD HH:MM:SS",
        "time" => "HH:MM:SS",
        "price" => "#,##0.00",
        "dollar" | "money" => "[$$-1009]#,##0.00;[RED]-[$$-1009]#,##0.00",
        "euro" => "#,##0.00 [$€-407];[RED]-#,##0.00 [$€-407]",
        k if k.eq_ignore_ascii_case(GENERAL) => GENERAL,
        _ => return None,
    };
    Some(pattern)
}

/// Produce the canonical pattern for a keyword or literal pattern.
///
/// Spaces, hyphens and parentheses outside `[...]` sections and `"..."`
/// literals are backslash-escaped, except after `_` (which pads by the width
/// of the following character) and when already escaped.
///
/// ```
/// use streamxlsx::ooxml::xlsx::number_format::standardize;
/// assert_eq!(standardize("date"), "YYYY\\-MM\\-DD");
/// assert_eq!(standardize("#,##0_);(#,##0)"), "#,##0_);\\(#,##0\\)");
/// ```
pub fn standardize(format: &str) -> String {
    let pattern = preset(format).unwrap_or(format);

    let mut escaped = String::with_capacity(pattern.len() + 8);
    let mut closing: Option<char> = None;
    let mut prev: Option<char> = None;

    for c in pattern.chars() {
        match closing {
            None if c == '[' => closing = Some(']'),
            None if c == '"' => closing = Some('"'),
            Some(end) if end == c => closing = None,
            _ => {},
        }
        let literal = matches!(c, ' ' | '-' | '(' | ')');
        if closing.is_none() && literal && !matches!(prev, Some('_') | Some('\\')) {
            escaped.push('\\');
        }
        escaped.push(c);
        // An escaped backslash must not protect the next character.
        prev = if prev == Some('\\') && c == '\\' { None } else { Some(c) };
    }

    escaped
}

static COLOR_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(Black|Blue|Cyan|Green|Magenta|Red|White|Yellow)\]")
        .expect("valid colour tag pattern")
});
/// Quoted literals (closed or running to the end) and backslash escapes.
static LITERALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*"?|\\."#).expect("valid literal pattern"));
static HOUR_MINUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)h{1,2}:m{1,2}").expect("valid hour pattern"));
static MINUTE_SECOND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)m{1,2}:s{1,2}").expect("valid second pattern"));
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)y{2,4}").expect("valid year pattern"));

/// Determine the coarse semantic type of a canonical pattern.
///
/// Colour tags are ignored, and so are tokens inside quoted literals or
/// behind a backslash.
pub fn classify(pattern: &str) -> NumberFormatType {
    let without_colors = COLOR_TAG.replace_all(pattern, "");
    if without_colors.eq_ignore_ascii_case(GENERAL) {
        return NumberFormatType::Auto;
    }
    if without_colors == "@" {
        return NumberFormatType::String;
    }
    if without_colors == "0" {
        return NumberFormatType::Numeric;
    }

    let tokens = LITERALS.replace_all(&without_colors, "");
    if HOUR_MINUTE.is_match(&tokens) || MINUTE_SECOND.is_match(&tokens) {
        return NumberFormatType::DateTime;
    }
    let lower = tokens.to_ascii_lowercase();
    if YEAR.is_match(&tokens) || lower.contains('d') || lower.contains('m') {
        return NumberFormatType::Date;
    }
    if tokens.contains(['$', '%', '0']) {
        return NumberFormatType::Numeric;
    }
    NumberFormatType::Auto
}

/// Canonical pattern and type for a column declaration, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFormat {
    pub pattern: String,
    pub kind: NumberFormatType,
}

impl ColumnFormat {
    pub fn new(format: &str) -> Self {
        let pattern = standardize(format);
        let kind = classify(&pattern);
        Self { pattern, kind }
    }

    pub fn general() -> Self {
        Self {
            pattern: GENERAL.to_string(),
            kind: NumberFormatType::Auto,
        }
    }
}
