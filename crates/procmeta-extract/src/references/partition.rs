//! Sentinel-based partitioning of a reference block into numbered segments.
//!
//! Bracketed citation numbers (`[n]`) are wrapped in sentinel tokens that
//! cannot occur in document text. Entries begin where a wrapped number starts a
//! line; each segment runs to the next such number. The final entry has no
//! number after it and is bounded by the last sentence-terminating period at a
//! line end instead.

use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN_SENTINEL: &str = "--%%%start%%%--";
pub const CLOSE_SENTINEL: &str = "--%%%end%%%--";

static CITATION_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("valid citation number regex"));
static ENTRY_HEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*--%%%start%%%--(\d+)--%%%end%%%--").expect("valid entry head regex")
});
static MARKED_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"--%%%start%%%--(\d+)--%%%end%%%--").expect("valid marked number regex")
});
static FINAL_PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)\.[ \t\r]*$").expect("valid final period regex"));

/// One numbered entry of a reference block, sentinels removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub number: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub segments: Vec<Segment>,
    /// The last numbered entry had no terminating period and was dropped.
    pub last_unterminated: bool,
}

/// Wrap every `[n]` in sentinels.
pub fn mark_citation_numbers(block: &str) -> String {
    CITATION_NUMBER_RE
        .replace_all(block, format!("{OPEN_SENTINEL}${{1}}{CLOSE_SENTINEL}"))
        .into_owned()
}

/// Restore sentinel-wrapped numbers to their bracketed form.
pub fn unmark(text: &str) -> String {
    MARKED_NUMBER_RE.replace_all(text, "[${1}]").into_owned()
}

/// Split a reference block into numbered segments.
///
/// Text before the first numbered entry is discarded.
pub fn partition(block: &str) -> Partition {
    let marked = mark_citation_numbers(block);
    let heads = ENTRY_HEAD_RE
        .captures_iter(&marked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().to_string();
            Some((whole.start(), whole.end(), number))
        })
        .collect::<Vec<_>>();

    let mut result = Partition::default();
    for (current, next) in heads.iter().zip(heads.iter().skip(1)) {
        result.segments.push(Segment {
            number: current.2.clone(),
            text: unmark(&marked[current.1..next.0]),
        });
    }

    if let Some((_, end, number)) = heads.last() {
        match final_sentence(&marked[*end..]) {
            Some(text) => result.segments.push(Segment {
                number: number.clone(),
                text: unmark(text),
            }),
            None => result.last_unterminated = true,
        }
    }
    result
}

/// Text up to and including the last period that ends a line.
fn final_sentence(tail: &str) -> Option<&str> {
    let last = FINAL_PERIOD_RE.find_iter(tail).last()?;
    Some(&tail[..last.start() + 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_and_unmarks_citation_numbers() {
        let marked = mark_citation_numbers("[12] Foo, see [3].");
        assert_eq!(
            marked,
            "--%%%start%%%--12--%%%end%%%-- Foo, see --%%%start%%%--3--%%%end%%%--."
        );
        assert_eq!(unmark(&marked), "[12] Foo, see [3].");
    }

    #[test]
    fn splits_on_line_leading_numbers_only() {
        let block = "heading noise\n[1] First entry, cf. [2] inline.\n[2] Second entry.\n";
        let parts = partition(block);

        assert_eq!(parts.segments.len(), 2);
        assert_eq!(parts.segments[0].number, "1");
        assert_eq!(parts.segments[0].text, " First entry, cf. [2] inline.\n");
        assert_eq!(parts.segments[1].number, "2");
        assert_eq!(parts.segments[1].text, " Second entry.");
        assert!(!parts.last_unterminated);
    }

    #[test]
    fn final_segment_ends_at_last_line_period() {
        let block = "[1] Only entry. Continued\nonto a second line.\n\nPage 12 footer";
        let parts = partition(block);
        assert_eq!(parts.segments.len(), 1);
        assert_eq!(
            parts.segments[0].text,
            " Only entry. Continued\nonto a second line."
        );
    }

    #[test]
    fn unterminated_final_segment_is_reported() {
        let parts = partition("[1] One.\n[2] Two without end");
        assert_eq!(parts.segments.len(), 1);
        assert!(parts.last_unterminated);
    }

    #[test]
    fn block_without_numbers_is_empty() {
        let parts = partition("Some unnumbered reference text.");
        assert!(parts.segments.is_empty());
        assert!(!parts.last_unterminated);
    }

    #[test]
    fn sentinels_never_leak_into_segments() {
        let parts = partition("[1] A [7] B.\n[2] C [8].\n");
        for segment in &parts.segments {
            assert!(!segment.text.contains(OPEN_SENTINEL));
            assert!(!segment.text.contains(CLOSE_SENTINEL));
        }
    }
}
