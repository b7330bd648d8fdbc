use once_cell::sync::Lazy;
use procmeta_core::config::ExtractionConfig;
use procmeta_core::text::{remove_line_hyphenation, squash_whitespace};
use procmeta_core::{Field, IssueLog, Reference};
use regex::Regex;

use super::partition::partition;

// A link continues onto the next line only when the line breaks right after a
// URL separator and the continuation does not start a capitalized word.
static HYPERLINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[^\s,]*(?:[/\-_.=?&#~%][ \t]*\r?\n[ \t]*[^\s,A-Z][^\s,]*)*")
        .expect("valid hyperlink regex")
});

/// Turns a reference block into validated, sequentially numbered entries.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    min_len: usize,
    max_len: usize,
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl ReferenceParser {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.min_reference_len, config.max_reference_len)
    }

    /// Parse a reference block.
    ///
    /// The expected number starts at 1 and advances once per segment whether
    /// or not the segment is accepted; a segment is kept only when its number
    /// equals the expected one. Rejected segments are logged, never fatal.
    pub fn parse(&self, block: &str, issues: &mut IssueLog) -> Vec<Reference> {
        let parts = partition(block);
        let mut references = Vec::with_capacity(parts.segments.len());

        for (expected, segment) in (1u32..).zip(parts.segments) {
            let text = self.clean(&segment.text, issues);

            if text.chars().count() < self.min_len {
                issues.log_with(
                    Field::References,
                    format!("Reference {} text is empty or cut-off", segment.number),
                    &text,
                );
                continue;
            }

            match segment.number.parse::<u32>() {
                Ok(number) if number == expected => references.push(Reference {
                    ref_seq_no: number,
                    ref_text: text,
                }),
                _ => issues.log_with(
                    Field::References,
                    format!(
                        "Reference number {} is an invalid value (expected {expected})",
                        segment.number
                    ),
                    &text,
                ),
            }
        }

        if parts.last_unterminated {
            issues.log(Field::References, "Last reference lost or invalid");
        }
        references
    }

    fn clean(&self, raw: &str, issues: &mut IssueLog) -> String {
        let mut text = raw.trim().to_string();
        if text.chars().count() > self.max_len {
            text = truncate_at_sentence(&text, self.max_len);
            issues.log_with(Field::References, "Truncated very long reference", &text);
        }

        let (protected, links) = protect_hyperlinks(&text);
        let cleaned = squash_whitespace(&remove_line_hyphenation(&protected));
        restore_hyperlinks(cleaned, &links)
    }
}

/// Cut `text` to at most `max_chars`, ending at the last sentence boundary
/// inside the limit. Without a boundary the text is cut at the limit.
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    let limit = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let boundary = text[..limit]
        .char_indices()
        .filter(|(idx, ch)| {
            *ch == '.'
                && text[idx + 1..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
        })
        .map(|(idx, _)| idx + 1)
        .last()
        .unwrap_or(limit);

    text[..boundary].trim_end().to_string()
}

/// Swap each hyperlink for a placeholder. Links keep their text minus any
/// whitespace so that line wraps inside a URL do not split it.
fn protect_hyperlinks(text: &str) -> (String, Vec<String>) {
    let mut links = Vec::new();
    let protected = HYPERLINK_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let matched = &caps[0];
            let url = matched.trim_end_matches('.');
            let placeholder = format!("%%%link{}%%%{}", links.len(), &matched[url.len()..]);
            links.push(url.split_whitespace().collect::<String>());
            placeholder
        })
        .into_owned();
    (protected, links)
}

fn restore_hyperlinks(mut text: String, links: &[String]) -> String {
    for (idx, url) in links.iter().enumerate() {
        text = text.replace(&format!("%%%link{idx}%%%"), url);
    }
    text
}
