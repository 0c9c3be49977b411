use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// Control characters that are not allowed in XML 1.0 text.
///
/// Tab, line feed and carriage return are legal and stay untouched.
const CONTROL_CHARS: &[char] = &[
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{04}', '\u{05}', '\u{06}', '\u{07}', '\u{08}',
    '\u{0B}', '\u{0C}', '\u{0E}', '\u{0F}', '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{14}',
    '\u{15}', '\u{16}', '\u{17}', '\u{18}', '\u{19}', '\u{1A}', '\u{1B}', '\u{1C}', '\u{1D}',
    '\u{1E}', '\u{1F}', '\u{7F}',
];

const ENTITIES: [(&str, &str); 5] = [
    ("&", "&amp;"),
    ("<", "&lt;"),
    (">", "&gt;"),
    ("\"", "&quot;"),
    ("'", "&apos;"),
];

struct Escaper {
    automaton: AhoCorasick,
    replacements: Vec<String>,
}

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<Escaper> = Lazy::new(|| {
    let mut patterns: Vec<String> = ENTITIES.iter().map(|(c, _)| (*c).to_string()).collect();
    let mut replacements: Vec<String> = ENTITIES.iter().map(|(_, r)| (*r).to_string()).collect();
    for c in CONTROL_CHARS {
        patterns.push(c.to_string());
        replacements.push(" ".to_string());
    }
    Escaper {
        automaton: AhoCorasick::builder()
            .build(&patterns)
            .expect("Failed to build XML escaper"),
        replacements,
    }
});

/// Escape XML special characters.
///
/// The five markup characters become entities and control characters that
/// XML 1.0 forbids become spaces, so arbitrary cell text always yields a
/// well-formed document.
///
/// # Examples
///
/// ```
/// use streamxlsx::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// assert_eq!(escape_xml("bell\u{07}"), "bell ");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER
        .automaton
        .replace_all(s, &XML_ESCAPER.replacements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_xml("Tom & Jerry's <show>"), "Tom &amp; Jerry&apos;s &lt;show&gt;");
    }

    #[test]
    fn test_escape_preserves_whitespace_controls() {
        assert_eq!(escape_xml("a\tb\nc\rd"), "a\tb\nc\rd");
    }

    #[test]
    fn test_escape_replaces_forbidden_controls() {
        assert_eq!(escape_xml("\u{00}x\u{0B}\u{1F}\u{7F}"), " x   ");
    }

    #[test]
    fn test_escape_multibyte_untouched() {
        assert_eq!(escape_xml("€ 10 – ünïcødé"), "€ 10 – ünïcødé");
    }
}
