//! Canonicalization of raw extracted text.
//!
//! Every pattern in the extraction pipeline runs against the output of
//! [`normalize`]; CSV index values and header lines go through it as well so
//! that both sides of a comparison share one form.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Entity written in place of a bare double quote that precedes markup.
pub const QUOTE_ENTITY: &str = "&#34;";

const LIGATURES: &[(&str, &str)] = &[
    ("&#64257;", "fi"),
    ("\u{FB01}", "fi"),
    ("&#64258;", "fl"),
    ("\u{FB02}", "fl"),
];

const DINGBAT_RANGES: &[(char, char)] = &[
    ('\u{2020}', '\u{2020}'),
    ('\u{2702}', '\u{27B0}'),
    ('\u{1F300}', '\u{1F5FF}'),
    ('\u{1F600}', '\u{1F64F}'),
    ('\u{1F680}', '\u{1F6FF}'),
];

static LINE_BREAKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\x0b\x0c\r\n]+").expect("valid line break regex"));
static HYPHEN_WRAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\s+").expect("valid hyphen wrap regex"));

/// Canonicalize raw text before any pattern matching.
///
/// One pass strips leading whitespace/control runs, escapes bare quotes that
/// precede a later `<`, repairs fi/fl ligatures, strips dingbats and applies
/// NFKC, in that order. Composition can surface new leading whitespace or new
/// quotes, so passes repeat until the text is stable.
pub fn normalize(raw: &str) -> String {
    let mut current = normalize_pass(raw);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(raw: &str) -> String {
    let text = strip_leading(raw);
    let text = escape_bare_quotes(text);
    let text = replace_ligatures(&text);
    let text = strip_dingbats(&text);
    text.nfkc().collect()
}

fn strip_leading(text: &str) -> &str {
    text.trim_start_matches(|ch: char| ch.is_whitespace() || ch.is_control())
}

/// Escape each `"` whose next angle bracket is a `<`.
fn escape_bare_quotes(text: &str) -> String {
    if !text.contains('"') {
        return text.to_string();
    }

    // Decisions are collected back to front, so popping yields them in order.
    let mut decisions = Vec::new();
    let mut next_angle = None;
    for ch in text.chars().rev() {
        match ch {
            '<' | '>' => next_angle = Some(ch),
            '"' => decisions.push(next_angle == Some('<')),
            _ => {}
        }
    }

    let mut out = String::with_capacity(text.len() + decisions.len() * 4);
    for ch in text.chars() {
        if ch == '"' && decisions.pop().unwrap_or(false) {
            out.push_str(QUOTE_ENTITY);
        } else {
            out.push(ch);
        }
    }
    out
}

fn replace_ligatures(text: &str) -> String {
    LIGATURES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn strip_dingbats(text: &str) -> String {
    text.chars().filter(|ch| !is_dingbat(*ch)).collect()
}

fn is_dingbat(ch: char) -> bool {
    DINGBAT_RANGES
        .iter()
        .any(|(lo, hi)| (*lo..=*hi).contains(&ch))
}

/// Collapse tab, vertical-tab, form-feed and line-break runs into one space.
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS_RE.replace_all(text, " ").into_owned()
}

/// Join words split by a line-wrap hyphen (`-` followed by whitespace).
pub fn remove_line_hyphenation(text: &str) -> String {
    HYPHEN_WRAP_RE.replace_all(text, "").into_owned()
}

/// Collapse every whitespace run into a single space and trim.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_whitespace_and_controls() {
        assert_eq!(normalize("\r\n\t \u{0007}Title"), "Title");
    }

    #[test]
    fn escapes_quotes_before_markup_only() {
        let text = r#"say "hi" <b>bold</b> and "plain""#;
        assert_eq!(
            normalize(text),
            "say &#34;hi&#34; <b>bold</b> and \"plain\""
        );
    }

    #[test]
    fn quote_inside_tag_is_left_alone() {
        let text = r#"<a href="x">link</a>"#;
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn repairs_ligatures_in_code_point_and_entity_form() {
        assert_eq!(normalize("e\u{FB03}cient \u{FB01}le &#64258;ow"), "efficient file flow");
        assert_eq!(normalize("&#64257;rst"), "first");
    }

    #[test]
    fn strips_dingbats() {
        assert_eq!(normalize("Jane Doe\u{2020} \u{2709} mail \u{1F600}"), "Jane Doe  mail ");
    }

    #[test]
    fn composes_with_nfkc() {
        assert_eq!(normalize("Cafe\u{0301} \u{00B9}MIT"), "Café 1MIT");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "\u{00B4}acute first",
            "\u{2709} \u{FF02}quoted\u{FF02} \u{FF1C}tag>",
            "a \"b\" <c> \"d",
            "\u{FB01}&#64257;\u{2020}\u{00A0}x",
            "plain text\nwith lines\r\n",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn collapses_line_breaks_and_hyphenation() {
        assert_eq!(collapse_line_breaks("a\r\n\tb\x0cc"), "a b c");
        assert_eq!(remove_line_hyphenation("imple-\nmentation"), "implementation");
        assert_eq!(squash_whitespace("  a \n b  "), "a b");
    }
}
