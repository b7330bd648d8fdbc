//! Header-based affiliation and email heuristics.

use once_cell::sync::Lazy;
use procmeta_core::normalize;
use procmeta_core::text::squash_whitespace;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").expect("valid email regex")
});

/// ASCII punctuation that never acts as a superscript marker.
const NON_MARKERS: &str = "~`!?<>.,*_-/@#$&%^()'\"=;: {}[]\t\n";

/// Why the header gave no affiliation for an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationMiss {
    NameNotInHeader,
    NoAffiliationLine,
}

/// Normalized, non-empty lines of a document header.
#[derive(Debug, Clone, Default)]
pub struct HeaderLines {
    lines: Vec<String>,
}

impl HeaderLines {
    pub fn parse(block: &str) -> Self {
        let lines = block
            .lines()
            .map(|line| normalize(line).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Find the affiliation line for an author by last name.
    ///
    /// Superscript markers next to the name pick the first later line that
    /// starts with one of them, else the last later line containing one.
    /// Without markers the following line is used, or the one after it when
    /// the following line holds an email address.
    pub fn affiliation_for(&self, last_name: &str) -> Result<String, AffiliationMiss> {
        let name_idx = self
            .lines
            .iter()
            .position(|line| line.contains(last_name))
            .ok_or(AffiliationMiss::NameNotInHeader)?;

        let name_line = &self.lines[name_idx];
        let fragment = name_line
            .split(',')
            .find(|part| part.contains(last_name))
            .unwrap_or(name_line);
        let mut markers = fragment.chars().filter(|ch| is_marker(*ch)).collect::<Vec<_>>();
        markers.dedup();

        let later = &self.lines[name_idx + 1..];
        let by_marker = if markers.is_empty() {
            None
        } else {
            later
                .iter()
                .filter(|line| !line.contains('@'))
                .find(|line| line.starts_with(markers.as_slice()))
                .or_else(|| {
                    later
                        .iter()
                        .filter(|line| !line.contains('@'))
                        .rfind(|line| line.contains(markers.as_slice()))
                })
                .map(|line| strip_markers(line, &markers))
        };

        let affiliation = by_marker.or_else(|| match later {
            [next, ..] if !next.contains('@') => Some(next.clone()),
            [_, after, ..] => Some(after.clone()),
            _ => None,
        });

        affiliation
            .filter(|text| !text.is_empty())
            .ok_or(AffiliationMiss::NoAffiliationLine)
    }

    /// First header email whose local part mentions the author's last or first name.
    pub fn email_for(&self, first_name: &str, last_name: &str) -> Option<String> {
        let names = [last_name, first_name]
            .into_iter()
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>();

        self.lines
            .iter()
            .flat_map(|line| EMAIL_RE.find_iter(line))
            .map(|found| found.as_str())
            .find(|email| {
                let local = email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                names.iter().any(|name| local.contains(name.as_str()))
            })
            .map(str::to_string)
    }
}

/// Drop every occurrence of the author's markers from an affiliation line.
fn strip_markers(line: &str, markers: &[char]) -> String {
    let stripped = line.replace(markers, " ");
    squash_whitespace(&stripped.replace(" ,", ","))
}

fn is_marker(ch: char) -> bool {
    !ch.is_alphabetic() && !ch.is_whitespace() && !NON_MARKERS.contains(ch)
}
