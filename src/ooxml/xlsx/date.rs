//! Excel 1900-system date serials.
//!
//! Excel counts days from 1899-12-31 and, for compatibility with Lotus 1-2-3,
//! pretends 1900 was a leap year. Serial 60 is the fictitious 1900-02-29 and
//! every real date from 1900-03-01 on is one day later than a proleptic
//! Gregorian count would give. The time of day is the fractional part.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid date pattern"));
static TIME_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d{2}):(\d{2})").expect("valid time pattern"));

const SECONDS_PER_DAY: f64 = 86_400.0;
const FIRST_YEAR: i32 = 1900;
const LAST_YEAR: i32 = 9999;
/// Serial of the fictitious 1900-02-29.
const PHANTOM_LEAP_DAY: i64 = 60;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or(NaiveDate::MIN)
}

fn day_fraction(hours: f64, minutes: f64, seconds: f64) -> f64 {
    (hours * 3600.0 + minutes * 60.0 + seconds) / SECONDS_PER_DAY
}

/// Whole-day serial for a calendar date, or 0 when out of range.
fn day_serial(year: i32, month: u32, day: u32) -> Option<i64> {
    if !(FIRST_YEAR..=LAST_YEAR).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let days = date.signed_duration_since(epoch()).num_days();
    Some(if days >= PHANTOM_LEAP_DAY { days + 1 } else { days })
}

/// Convert `YYYY-MM-DD`, `H:MM:SS` or `YYYY-MM-DD HH:MM:SS` text to a serial.
///
/// The date and time are located anywhere in the text; either may be absent.
/// Text with neither, or with an impossible date, yields 0.
///
/// ```
/// use streamxlsx::ooxml::xlsx::date::to_excel_serial;
/// assert_eq!(to_excel_serial("1900-01-01"), 1.0);
/// assert_eq!(to_excel_serial("1900-03-01"), 61.0);
/// assert_eq!(to_excel_serial("2024-01-01 12:00:00"), 45292.5);
/// ```
pub fn to_excel_serial(text: &str) -> f64 {
    let fraction = TIME_PART
        .captures(text)
        .map(|caps| {
            let field = |i: usize| caps[i].parse::<f64>().unwrap_or(0.0);
            day_fraction(field(1), field(2), field(3))
        })
        .unwrap_or(0.0);

    let Some(caps) = DATE_PART.captures(text) else {
        return fraction;
    };
    // Each group is exactly 4 or 2 ASCII digits.
    let year: i32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);

    match (year, month, day) {
        (1899, 12, 31) | (1900, 1, 0) => fraction,
        (1900, 2, 29) => PHANTOM_LEAP_DAY as f64 + fraction,
        _ => day_serial(year, month, day).map_or(0.0, |days| days as f64 + fraction),
    }
}

/// Serial for a calendar date (0 for dates outside 1900..=9999).
pub fn date_serial(date: NaiveDate) -> f64 {
    if date == epoch() {
        return 0.0;
    }
    day_serial(date.year(), date.month(), date.day()).map_or(0.0, |days| days as f64)
}

/// Serial for a date and time (0 for dates outside 1900..=9999).
pub fn datetime_serial(datetime: NaiveDateTime) -> f64 {
    let fraction = day_fraction(
        f64::from(datetime.hour()),
        f64::from(datetime.minute()),
        f64::from(datetime.second()),
    );
    let date = datetime.date();
    if date == epoch() {
        return fraction;
    }
    day_serial(date.year(), date.month(), date.day()).map_or(0.0, |days| days as f64 + fraction)
}
