//! Simple field extractors run on located section regions.

use once_cell::sync::Lazy;
use procmeta_core::text::{collapse_line_breaks, remove_line_hyphenation, squash_whitespace};
use procmeta_core::{Category, Field, IssueLog, normalize};
use regex::Regex;

use crate::categories::CategoryTable;

static ENUMERATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\. \d").expect("valid enumeration regex"));
static CATEGORY_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Z]\.[0-9a-zA-Z](?:\.[0-9]|\.[a-z])?").expect("valid category code regex")
});
static CONCEPT_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-; |\u{2014}; |; |, |\u{2022}").expect("valid concept group regex"));
static CONCEPT_STEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{2012}-\u{2015}\u{2192}:*\n] ?([A-Za-z])").expect("valid concept step regex")
});

/// Clean the abstract region; `None` when nothing is left.
pub fn clean_abstract(
    block: &str,
    min_len: usize,
    max_len: usize,
    issues: &mut IssueLog,
) -> Option<String> {
    let text = collapse_line_breaks(block.trim());
    let text = remove_line_hyphenation(&text);
    let text = ENUMERATION_RE.replace_all(&text, ".");
    let text = normalize(&text).trim().to_string();

    if text.is_empty() {
        issues.log(Field::Abstract, "Abstract is empty");
        return None;
    }

    let len = text.chars().count();
    if len < min_len {
        issues.log(Field::Abstract, "Abstract may have been truncated");
    }
    if text.contains('@') || len > max_len {
        issues.log(Field::Abstract, "Abstract may contain extraneous text");
    }
    Some(text)
}

/// Split the keywords region on `,` and `;`.
pub fn parse_keywords(block: &str) -> Vec<String> {
    let text = remove_line_hyphenation(block);
    let text = collapse_line_breaks(&text).replace(": ", "");
    text.split([',', ';'])
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split the general-terms region on `,`, dropping periods.
pub fn parse_general_terms(block: &str, issues: &mut IssueLog) -> Vec<String> {
    let text = squash_whitespace(&remove_line_hyphenation(block)).replace('.', "");
    let text = text.trim().trim_start_matches(':');
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut terms = Vec::new();
    for term in text.split(',').map(str::trim) {
        if term.is_empty() {
            issues.log_with(Field::GeneralTerms, "Invalid general terms", text);
        } else {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Extract category codes and look each up in the category table.
///
/// The text following a code up to the next code is its in-document
/// descriptor; the stored descriptor always comes from the table.
pub fn parse_categories(block: &str, table: &CategoryTable, issues: &mut IssueLog) -> Vec<Category> {
    let text = squash_whitespace(&remove_line_hyphenation(block));
    let codes = CATEGORY_CODE_RE.find_iter(&text).collect::<Vec<_>>();

    let mut categories = Vec::new();
    for (idx, code) in codes.iter().enumerate() {
        let tail_end = codes.get(idx + 1).map_or(text.len(), |next| next.start());
        let in_text = text[code.end()..tail_end].trim().trim_end_matches(';').trim();

        if table.contains(code.as_str()) {
            categories.push(Category::subject(code.as_str(), table.get(code.as_str())));
        } else {
            issues.log_with(
                Field::Categories,
                "Invalid categories extracted",
                format!("{} {}", code.as_str(), in_text),
            );
        }
    }
    categories
}

/// Split the classification region into top-to-bottom phrase chains.
pub fn split_concept_chains(block: &str) -> Vec<Vec<String>> {
    let text = collapse_line_breaks(block);
    CONCEPT_GROUP_RE
        .split(&text)
        .map(|group| {
            let group = remove_line_hyphenation(group.trim());
            CONCEPT_STEP_RE
                .replace_all(&group, "~$1")
                .split('~')
                .map(|phrase| squash_whitespace(phrase).replace('.', ""))
                .filter(|phrase| !phrase.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|chain| !chain.is_empty())
        .collect()
}
