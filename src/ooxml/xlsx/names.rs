//! Sheet-name and file-name sanitization.

/// Characters Excel refuses in sheet names.
const SHEET_NAME_ILLEGAL: [char; 7] = ['\\', '/', '?', '*', ':', '[', ']'];
/// Maximum sheet name length, in characters.
pub const SHEET_NAME_MAX_LEN: usize = 31;

const FILENAME_ILLEGAL: [char; 10] = ['<', '>', '?', '"', ':', '|', '\\', '/', '*', '&'];

/// Make a caller-supplied name acceptable as a worksheet tab name.
///
/// Illegal characters are removed, the result is cut to 31 characters and
/// surrounding whitespace and single quotes are trimmed. An empty result
/// falls back to `Sheet{position}` (1-based tab position).
pub fn sanitize_sheet_name(name: &str, position: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !SHEET_NAME_ILLEGAL.contains(c))
        .take(SHEET_NAME_MAX_LEN)
        .collect();

    let trimmed = cleaned.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        format!("Sheet{position}")
    } else {
        trimmed.to_string()
    }
}

/// Strip control characters and characters that are unsafe in file names
/// on common platforms.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !(u32::from(*c) < 32 || FILENAME_ILLEGAL.contains(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_strips_illegal_characters() {
        assert_eq!(sanitize_sheet_name("Q1/Q2: [draft]?", 1), "Q1Q2 draft");
    }

    #[test]
    fn test_sheet_name_truncates_to_31_chars() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        let name = sanitize_sheet_name(long, 1);
        assert_eq!(name.chars().count(), 31);
        assert_eq!(name, "abcdefghijklmnopqrstuvwxyz01234");

        let wide = "ü".repeat(40);
        assert_eq!(sanitize_sheet_name(&wide, 1).chars().count(), 31);
    }

    #[test]
    fn test_sheet_name_trims_quotes_and_whitespace() {
        assert_eq!(sanitize_sheet_name("  ' Budget '  ", 1), "Budget");
    }

    #[test]
    fn test_sheet_name_fallback() {
        assert_eq!(sanitize_sheet_name("", 3), "Sheet3");
        assert_eq!(sanitize_sheet_name("[]*", 2), "Sheet2");
        assert_eq!(sanitize_sheet_name("''", 1), "Sheet1");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("re:port<1>?.xlsx"), "report1.xlsx");
        assert_eq!(sanitize_filename("a\u{01}b\tc&d.xlsx"), "abcd.xlsx");
        assert_eq!(sanitize_filename("tabelle_ä.xlsx"), "tabelle_ä.xlsx");
    }
}
