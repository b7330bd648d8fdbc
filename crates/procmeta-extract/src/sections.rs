//! Anchor-based segmentation of normalized document text into field regions.
//!
//! Each section has ordered start anchors and a set of stop anchors. The first
//! start anchor that matches opens the region; the earliest stop anchor after
//! it closes the region, so a field never absorbs the sections that follow it.
//! Without a stop anchor the region runs to the end of the text.
//!
//! Reviewers correcting cached raw text can bracket a field with
//! `======<name>-start======` / `======<name>-end======` markers, which take
//! precedence over the heading anchors.

use procmeta_core::config::{AnchorConfig, SectionsConfig};
use procmeta_core::{Field, IssueLog};
use regex::{Regex, RegexBuilder};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Abstract,
    Keywords,
    Categories,
    GeneralTerms,
    Concepts,
    References,
}

const INTRODUCTION: &str = r"^[ \t]*(?:(?:[0-9]+|[ivx]+)\.?[ \t]*)?introduction\b";
const REFERENCES: &str =
    r"^[ \t]*(?:\d{1,2}(?:[.)][ \t]*)?[ \t]*)?(?:references|bibliography)[ \t]*:?[ \t\r]*$";
const PERMISSION: &str = r"^[ \t]*permission to make\b";

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Abstract,
        Section::Keywords,
        Section::Categories,
        Section::GeneralTerms,
        Section::Concepts,
        Section::References,
    ];

    /// Issue-log field a missing section is reported against.
    pub fn field(self) -> Field {
        match self {
            Section::Abstract => Field::Abstract,
            Section::Keywords => Field::Keywords,
            Section::Categories => Field::Categories,
            Section::GeneralTerms => Field::GeneralTerms,
            Section::Concepts => Field::Concepts,
            Section::References => Field::References,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Section::Abstract => "abstract",
            Section::Keywords => "keywords",
            Section::Categories => "categories",
            Section::GeneralTerms => "general-terms",
            Section::Concepts => "index",
            Section::References => "references",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Section::Abstract => "Abstract is empty",
            Section::Keywords => "Keywords not found",
            Section::Categories => "Categories not found",
            Section::GeneralTerms => "General terms not found",
            Section::Concepts => "CCS concepts not found",
            Section::References => "References not found",
        }
    }

    fn default_start(self) -> Vec<String> {
        let heading = match self {
            Section::Abstract => r"^[ \t]*abstract[ \t\r]*(?:$|[.:—–-])",
            Section::Keywords => {
                r"^[ \t]*(?:author[ \t]+)?(?:keywords|key words|index terms)\b[ \t]*[.:—-]?"
            }
            Section::Categories => r"categories and subject descriptors?[ \t]*[.:]?",
            Section::GeneralTerms => r"\bgeneral terms\b[ \t]*[.:]?",
            Section::Concepts => r"^[ \t]*ccs concepts\b[ \t]*[.:]?",
            Section::References => REFERENCES,
        };
        vec![
            format!(r"^\s?======{}-start======[ \t]*\n?", self.marker()),
            heading.to_string(),
        ]
    }

    fn default_stop(self) -> Vec<String> {
        let mut stops = vec![format!(r"^\s?======{}-end======", self.marker())];
        let headings: &[&str] = match self {
            Section::Abstract => &[
                r"^[ \t]*(?:categories and subject descriptors?|general terms|(?:author[ \t]+)?keywords|index terms|ccs concepts|acm reference format)\b",
                INTRODUCTION,
                PERMISSION,
                REFERENCES,
            ],
            Section::Keywords => &[
                r"^[ \t]*(?:categories and subject descriptors?|general terms|ccs concepts|acm reference format)\b",
                INTRODUCTION,
                PERMISSION,
                REFERENCES,
            ],
            Section::Categories => &[
                r"\b(?:general terms|(?:author[ \t]+)?keywords|ccs concepts)\b",
                r"\bintroduction\b",
                PERMISSION,
                REFERENCES,
            ],
            Section::GeneralTerms => &[
                r"\b(?:(?:author[ \t]+)?keywords|ccs concepts)\b",
                INTRODUCTION,
                PERMISSION,
                REFERENCES,
            ],
            Section::Concepts => &[
                r"^[ \t]*(?:(?:author[ \t]+)?keywords|categories and subject descriptors?|general terms|acm reference format)\b",
                INTRODUCTION,
                PERMISSION,
                REFERENCES,
            ],
            Section::References => &[
                r"^[ \t]*(?:\d{1,2}(?:[.)][ \t]*)?)?(?:appendix(?:[ \t]+[a-z0-9]+)?|supplementary(?:[ \t]+materials?)?)[ \t]*:?[ \t\r]*$",
            ],
        };
        stops.extend(headings.iter().map(|pattern| pattern.to_string()));
        stops
    }
}

#[derive(Debug, Clone)]
struct Anchors {
    start: Vec<Regex>,
    stop: Vec<Regex>,
}

impl Anchors {
    fn compile(section: Section, overrides: &AnchorConfig) -> Result<Self> {
        let start = if overrides.start.is_empty() {
            section.default_start()
        } else {
            overrides.start.clone()
        };
        let stop = if overrides.stop.is_empty() {
            section.default_stop()
        } else {
            overrides.stop.clone()
        };

        Ok(Self {
            start: compile_all(&start)?,
            stop: compile_all(&stop)?,
        })
    }

    /// Byte range of the region, if a start anchor matches.
    fn locate(&self, text: &str) -> Option<(usize, usize, usize)> {
        let opening = self.start.iter().find_map(|re| re.find(text))?;
        let body_start = opening.end();
        let tail = &text[body_start..];
        let body_end = self
            .stop
            .iter()
            .filter_map(|re| re.find(tail))
            .map(|m| body_start + m.start())
            .min()
            .unwrap_or(text.len());
        Some((opening.start(), body_start, body_end))
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map_err(Into::into)
        })
        .collect()
}

/// Compiled anchors for every section, built once per run.
#[derive(Debug, Clone)]
pub struct SectionPatterns {
    abstract_text: Anchors,
    keywords: Anchors,
    categories: Anchors,
    general_terms: Anchors,
    concepts: Anchors,
    references: Anchors,
}

impl SectionPatterns {
    pub fn compile(config: &SectionsConfig) -> Result<Self> {
        Ok(Self {
            abstract_text: Anchors::compile(Section::Abstract, &config.abstract_text)?,
            keywords: Anchors::compile(Section::Keywords, &config.keywords)?,
            categories: Anchors::compile(Section::Categories, &config.categories)?,
            general_terms: Anchors::compile(Section::GeneralTerms, &config.general_terms)?,
            concepts: Anchors::compile(Section::Concepts, &config.concepts)?,
            references: Anchors::compile(Section::References, &config.references)?,
        })
    }

    fn anchors(&self, section: Section) -> &Anchors {
        match section {
            Section::Abstract => &self.abstract_text,
            Section::Keywords => &self.keywords,
            Section::Categories => &self.categories,
            Section::GeneralTerms => &self.general_terms,
            Section::Concepts => &self.concepts,
            Section::References => &self.references,
        }
    }
}

/// Locates field sub-regions in normalized text.
#[derive(Debug, Clone)]
pub struct SectionSegmenter {
    patterns: SectionPatterns,
}

impl SectionSegmenter {
    pub fn new(patterns: SectionPatterns) -> Self {
        Self { patterns }
    }

    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(SectionPatterns::compile(&SectionsConfig::default())?))
    }

    /// Region of `section`, or `None` when its start anchor is missing.
    pub fn find<'t>(&self, section: Section, text: &'t str) -> Option<&'t str> {
        let (_, start, end) = self.patterns.anchors(section).locate(text)?;
        Some(&text[start..end])
    }

    /// Like [`find`](Self::find), logging a missing section against its field.
    pub fn extract<'t>(
        &self,
        section: Section,
        text: &'t str,
        issues: &mut IssueLog,
    ) -> Option<&'t str> {
        let region = self.find(section, text);
        if region.is_none() {
            issues.log(section.field(), section.missing_message());
        }
        region
    }

    pub fn abstract_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        self.extract(Section::Abstract, text, issues)
    }

    pub fn keywords_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        self.extract(Section::Keywords, text, issues)
    }

    pub fn categories_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        self.extract(Section::Categories, text, issues)
    }

    pub fn general_terms_block<'t>(
        &self,
        text: &'t str,
        issues: &mut IssueLog,
    ) -> Option<&'t str> {
        self.extract(Section::GeneralTerms, text, issues)
    }

    pub fn concepts_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        self.extract(Section::Concepts, text, issues)
    }

    pub fn references_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        self.extract(Section::References, text, issues)
    }

    /// Everything before the abstract anchor; title, authors and affiliations.
    pub fn header_block<'t>(&self, text: &'t str, issues: &mut IssueLog) -> Option<&'t str> {
        match self.patterns.anchors(Section::Abstract).locate(text) {
            Some((opening, _, _)) => Some(&text[..opening]),
            None => {
                issues.log(Field::Authors, "Empty header in document text");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "Sensing the City\n\
Jane Doe\n\
MIT\n\
jane@mit.edu\n\
ABSTRACT\n\
We study things in the city.\n\
CCS CONCEPTS\n\
• Computer systems organization → Real-time systems;\n\
KEYWORDS\n\
sensing, cities; maps\n\
ACM Reference Format:\n\
Doe. 2019. Sensing.\n\
1 INTRODUCTION\n\
Body text.\n\
REFERENCES\n\
[1] A. Author. First paper. 2001.\n\
[2] B. Author. Second paper. 2002.\n";

    fn segmenter() -> SectionSegmenter {
        SectionSegmenter::with_defaults().unwrap()
    }

    #[test]
    fn abstract_stops_at_next_heading() {
        let mut issues = IssueLog::new();
        let region = segmenter().abstract_block(PAPER, &mut issues).unwrap();
        assert_eq!(region.trim(), "We study things in the city.");
        assert!(issues.is_clean());
    }

    #[test]
    fn header_is_text_before_abstract() {
        let mut issues = IssueLog::new();
        let header = segmenter().header_block(PAPER, &mut issues).unwrap();
        assert!(header.starts_with("Sensing the City"));
        assert!(header.contains("jane@mit.edu"));
        assert!(!header.contains("ABSTRACT"));
    }

    #[test]
    fn keywords_and_concepts_regions() {
        let seg = segmenter();
        assert_eq!(
            seg.find(Section::Keywords, PAPER).unwrap().trim(),
            "sensing, cities; maps"
        );
        assert_eq!(
            seg.find(Section::Concepts, PAPER).unwrap().trim(),
            "• Computer systems organization → Real-time systems;"
        );
    }

    #[test]
    fn index_terms_stop_at_roman_numbered_introduction() {
        let text = "Abstract\nShort.\nIndex Terms\u{2014}sensing, maps\nI. INTRODUCTION\nBody, more body, and more.\nREFERENCES\n[1] A. B. Paper. 2001.\n";
        let region = segmenter().find(Section::Keywords, text).unwrap();
        assert_eq!(region.trim(), "sensing, maps");
    }

    #[test]
    fn front_matter_never_runs_into_references() {
        let text = "Abstract\nShort.\nKeywords\nsensing, maps\nREFERENCES\n[1] A. B. Paper. 2001.\n";
        let seg = segmenter();
        assert_eq!(seg.find(Section::Keywords, text).unwrap().trim(), "sensing, maps");

        let text = "Abstract\nWe study things.\nReferences\n[1] A. B. Paper. 2001.\n";
        assert_eq!(seg.find(Section::Abstract, text).unwrap().trim(), "We study things.");

        let text = "CCS Concepts\n\u{2022} Networks \u{2192} Protocols;\nBibliography\n[1] A. B. Paper. 2001.\n";
        assert_eq!(
            seg.find(Section::Concepts, text).unwrap().trim(),
            "\u{2022} Networks \u{2192} Protocols;"
        );
    }

    #[test]
    fn references_run_to_end_of_text() {
        let region = segmenter().find(Section::References, PAPER).unwrap();
        assert!(region.trim_start().starts_with("[1] A. Author."));
        assert!(region.trim_end().ends_with("2002."));
    }

    #[test]
    fn references_stop_before_appendix() {
        let text = "References\n[1] A. Author. Paper. 2001.\nAppendix A\nExtra tables.";
        let region = segmenter().find(Section::References, text).unwrap();
        assert!(!region.contains("Extra tables"));
    }

    #[test]
    fn missing_anchor_logs_against_field() {
        let mut issues = IssueLog::new();
        let seg = segmenter();
        let text = "Title\nNo sections here.";
        assert!(seg.abstract_block(text, &mut issues).is_none());
        assert!(seg.header_block(text, &mut issues).is_none());
        assert!(seg.references_block(text, &mut issues).is_none());

        assert_eq!(issues.get(Field::Abstract), ["<Abstract is empty>"]);
        assert_eq!(issues.get(Field::Authors), ["<Empty header in document text>"]);
        assert_eq!(issues.get(Field::References), ["<References not found>"]);
    }

    #[test]
    fn legacy_categories_and_general_terms() {
        let text = "Abstract\nShort.\nCategories and Subject Descriptors\nH.5.2 [Information Interfaces]: User Interfaces\nGeneral Terms\nDesign, Human Factors\nKeywords\nmaps\n";
        let seg = segmenter();
        let cats = seg.find(Section::Categories, text).unwrap();
        assert!(cats.contains("H.5.2"));
        assert!(!cats.contains("General"));
        assert_eq!(
            seg.find(Section::GeneralTerms, text).unwrap().trim(),
            "Design, Human Factors"
        );
    }

    #[test]
    fn reviewer_markers_take_precedence() {
        let text = "Abstract\nwrong one\n======abstract-start======\nRight one.\n======abstract-end======\nKeywords\nx";
        let region = segmenter().find(Section::Abstract, text).unwrap();
        assert_eq!(region.trim(), "Right one.");
    }

    #[test]
    fn configured_anchors_replace_defaults() {
        let mut config = SectionsConfig::default();
        config.abstract_text.start = vec![r"^summary:".to_string()];
        let seg = SectionSegmenter::new(SectionPatterns::compile(&config).unwrap());

        let text = "Summary: the gist.\nKeywords\nx";
        assert_eq!(seg.find(Section::Abstract, text).unwrap().trim(), "the gist.");
    }

    #[test]
    fn invalid_configured_pattern_is_an_error() {
        let mut config = SectionsConfig::default();
        config.keywords.stop = vec!["(unclosed".to_string()];
        assert!(SectionPatterns::compile(&config).is_err());
    }
}
