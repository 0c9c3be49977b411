//! Cell style requests for the writer.
//!
//! A [`CellStyle`] is what callers attach to a column, header or row. It is
//! deliberately flat and hashable: the style interner uses the whole value as
//! its lookup key, so two structurally equal requests always resolve to the
//! same style index no matter how they were built.
//!
//! Styles can also be deserialized from loosely typed payloads using the
//! familiar attribute keys (`border`, `border-style`, `font-size`, ...).

use crate::common::error::{Error, Result};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

bitflags! {
    /// Which edges of a cell carry a border.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BorderSides: u8 {
        const LEFT = 0b0001;
        const RIGHT = 0b0010;
        const TOP = 0b0100;
        const BOTTOM = 0b1000;
    }
}

impl Default for BorderSides {
    fn default() -> Self {
        BorderSides::empty()
    }
}

impl BorderSides {
    /// Parse a comma separated side list such as `"left,top"`.
    ///
    /// Unknown names are ignored.
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .fold(BorderSides::empty(), |acc, side| match side {
                "left" => acc | BorderSides::LEFT,
                "right" => acc | BorderSides::RIGHT,
                "top" => acc | BorderSides::TOP,
                "bottom" => acc | BorderSides::BOTTOM,
                _ => acc,
            })
    }
}

bitflags! {
    /// Font decorations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FontStyle: u8 {
        const BOLD = 0b0001;
        const ITALIC = 0b0010;
        const STRIKE = 0b0100;
        const UNDERLINE = 0b1000;
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        FontStyle::empty()
    }
}

impl FontStyle {
    /// Detect decorations by substring, so `"bold,italic"` and
    /// `"bolditalic"` both enable two flags.
    pub fn parse_flags(text: &str) -> Self {
        let mut style = FontStyle::empty();
        for (needle, flag) in [
            ("bold", FontStyle::BOLD),
            ("italic", FontStyle::ITALIC),
            ("strike", FontStyle::STRIKE),
            ("underline", FontStyle::UNDERLINE),
        ] {
            if text.contains(needle) {
                style |= flag;
            }
        }
        style
    }
}

/// An opaque ARGB colour, stored as `FFRRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(String);

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(format!("FF{r:02X}{g:02X}{b:02X}"))
    }

    /// The `FFRRGGBB` form written to the stylesheet.
    pub fn as_argb(&self) -> &str {
        &self.0
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `#RGB` or `#RRGGBB` (case-insensitive).
    fn from_str(text: &str) -> Result<Self> {
        let hex = text
            .strip_prefix('#')
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::InvalidStyle(format!("invalid colour '{text}'")))?;
        let expanded = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => hex.to_string(),
            _ => return Err(Error::InvalidStyle(format!("invalid colour '{text}'"))),
        };
        Ok(Color(format!("FF{}", expanded.to_ascii_uppercase())))
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Border line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderLineStyle {
    Thin,
    Medium,
    Thick,
    DashDot,
    DashDotDot,
    Dashed,
    Dotted,
    Double,
    #[default]
    Hair,
    MediumDashDot,
    MediumDashDotDot,
    MediumDashed,
    SlantDashDot,
}

impl BorderLineStyle {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::DashDot => "dashDot",
            Self::DashDotDot => "dashDotDot",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashDot => "mediumDashDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::MediumDashed => "mediumDashed",
            Self::SlantDashDot => "slantDashDot",
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    #[default]
    General,
    Left,
    Right,
    Justify,
    Center,
}

impl HorizontalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Left => "left",
            Self::Right => "right",
            Self::Justify => "justify",
            Self::Center => "center",
        }
    }
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    #[default]
    Bottom,
    Center,
    Distributed,
    Top,
}

impl VerticalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Center => "center",
            Self::Distributed => "distributed",
            Self::Top => "top",
        }
    }
}

/// Font size in points.
///
/// Compared and hashed by bit pattern so it can take part in interner keys.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "NumberOrText")]
pub struct FontSize(f64);

impl FontSize {
    pub fn new(points: f64) -> Result<Self> {
        if points.is_finite() && points > 0.0 {
            Ok(FontSize(points))
        } else {
            Err(Error::InvalidStyle(format!("invalid font size {points}")))
        }
    }

    /// Construct from a size known to be positive and finite.
    pub(crate) const fn from_trusted(points: f64) -> Self {
        FontSize(points)
    }

    pub fn points(&self) -> f64 {
        self.0
    }
}

impl PartialEq for FontSize {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FontSize {}

impl Hash for FontSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl TryFrom<NumberOrText> for FontSize {
    type Error = Error;

    fn try_from(value: NumberOrText) -> Result<Self> {
        match value {
            NumberOrText::Number(n) => FontSize::new(n),
            NumberOrText::Text(t) => t
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidStyle(format!("invalid font size '{t}'")))
                .and_then(FontSize::new),
        }
    }
}

fn de_border_sides<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<BorderSides, D::Error> {
    let list = String::deserialize(deserializer)?;
    Ok(BorderSides::parse_list(&list))
}

fn de_font_style<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<FontStyle, D::Error> {
    let text = String::deserialize(deserializer)?;
    Ok(FontStyle::parse_flags(&text))
}

/// Visual attributes requested for a cell.
///
/// Every field is optional; the default value means "no styling" and maps to
/// the built-in font, fill and border.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    #[serde(deserialize_with = "de_border_sides")]
    pub border: BorderSides,
    #[serde(rename = "border-style")]
    pub border_style: Option<BorderLineStyle>,
    #[serde(rename = "border-color")]
    pub border_color: Option<Color>,
    pub fill: Option<Color>,
    pub halign: Option<HorizontalAlignment>,
    pub valign: Option<VerticalAlignment>,
    pub wrap_text: Option<bool>,
    pub font: Option<String>,
    #[serde(rename = "font-size")]
    pub font_size: Option<FontSize>,
    #[serde(rename = "font-style", deserialize_with = "de_font_style")]
    pub font_style: FontStyle,
    pub color: Option<Color>,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border(mut self, sides: BorderSides) -> Self {
        self.border = sides;
        self
    }

    pub fn border_style(mut self, style: BorderLineStyle) -> Self {
        self.border_style = Some(style);
        self
    }

    pub fn border_color(mut self, color: Color) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn halign(mut self, align: HorizontalAlignment) -> Self {
        self.halign = Some(align);
        self
    }

    pub fn valign(mut self, align: VerticalAlignment) -> Self {
        self.valign = Some(align);
        self
    }

    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = Some(wrap);
        self
    }

    pub fn font(mut self, name: &str) -> Self {
        self.font = Some(name.to_string());
        self
    }

    pub fn font_size(mut self, size: FontSize) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn font_style(mut self, style: FontStyle) -> Self {
        self.font_style |= style;
        self
    }

    pub fn bold(self) -> Self {
        self.font_style(FontStyle::BOLD)
    }

    pub fn italic(self) -> Self {
        self.font_style(FontStyle::ITALIC)
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Whether any alignment attribute was requested.
    pub(crate) fn has_alignment(&self) -> bool {
        self.halign.is_some() || self.valign.is_some() || self.wrap_text.is_some()
    }
}
