use serde::{Deserialize, Serialize};

use super::{Author, Category, ConceptAssignment, Reference};

/// Metadata extracted for one document of the proceedings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub id: String,
    /// Position of the article in the index.
    pub number: String,
    pub doi: String,
    pub file_id: String,
    pub filename: String,
    pub title: String,
    pub session: String,
    pub url: String,
    pub page_from: String,
    pub page_to: String,
    pub pages: String,

    pub authors: Vec<Author>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub concepts: Vec<ConceptAssignment>,
    pub keywords: Vec<String>,
    pub categories: Vec<Category>,
    pub general_terms: Vec<String>,
    pub references: Vec<Reference>,

    /// Normalized raw text the fields were extracted from.
    #[serde(skip)]
    pub text: String,
}

impl DocumentRecord {
    /// Page span as `to - from`, from the explicit bounds or a `from-to` range.
    pub fn page_span(&self) -> Option<i64> {
        let (from, to) = match (parse_page(&self.page_from), parse_page(&self.page_to)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                let (from, to) = self
                    .pages
                    .split_once(['-', '\u{2013}'])
                    .map(|(from, to)| (parse_page(from), parse_page(to)))?;
                (from?, to?)
            }
        };
        Some(to - from)
    }
}

fn parse_page(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
