//! Author and affiliation resolution.
//!
//! Names come from the index CSV. Affiliations come from the CSV when it has
//! them, otherwise from superscript-marker heuristics over the header block.

pub mod affiliation;
pub mod names;

pub use affiliation::{AffiliationMiss, HeaderLines};
pub use names::{NameRule, NameTables, PersonName, split_name};

use procmeta_core::config::ExtractionConfig;
use procmeta_core::{Author, Field, IssueLog};

use crate::error::{ExtractError, Result};

pub const AUTHOR_DELIMITER: char = ',';
pub const AFFILIATION_DELIMITER: char = ';';

#[derive(Debug, Clone, Default)]
pub struct AuthorAffiliationResolver {
    tables: NameTables,
}

impl AuthorAffiliationResolver {
    pub fn new(tables: NameTables) -> Self {
        Self { tables }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(NameTables::from_config(config))
    }

    /// Build the author list for one document.
    ///
    /// A non-empty affiliation list whose length differs from the author list
    /// is a document-level error. Per-author problems are logged and never
    /// abort the document.
    pub fn resolve(
        &self,
        document: &str,
        csv_authors: &str,
        csv_affiliations: &str,
        header: Option<&str>,
        issues: &mut IssueLog,
    ) -> Result<Vec<Author>> {
        let people = split_list(csv_authors, AUTHOR_DELIMITER);
        if people.is_empty() {
            issues.log(Field::Authors, "Author CSV data is empty");
            return Ok(Vec::new());
        }

        let affiliations = split_list(csv_affiliations, AFFILIATION_DELIMITER);
        if !affiliations.is_empty() && affiliations.len() != people.len() {
            return Err(ExtractError::AffiliationCountMismatch {
                document: document.to_string(),
                authors: people.len(),
                affiliations: affiliations.len(),
            });
        }

        let header = header.map(HeaderLines::parse);

        let mut authors = Vec::with_capacity(people.len());
        for (position, person) in people.iter().enumerate() {
            let Some(name) = split_name(person, &self.tables) else {
                issues.log_with(Field::Authors, "Invalid name", person);
                continue;
            };

            let affiliation = match affiliations.get(position).filter(|a| !a.is_empty()) {
                Some(given) => (*given).to_string(),
                None => self.header_affiliation(header.as_ref(), &name, issues),
            };
            let email = header
                .as_ref()
                .and_then(|lines| lines.email_for(&name.first, &name.last));

            authors.push(Author {
                seq_no: position as u32 + 1,
                first_name: name.first,
                middle_name: name.middle,
                last_name: name.last,
                suffix: name.suffix,
                affiliation,
                email,
            });
        }
        Ok(authors)
    }

    fn header_affiliation(
        &self,
        header: Option<&HeaderLines>,
        name: &PersonName,
        issues: &mut IssueLog,
    ) -> String {
        let Some(header) = header else {
            issues.log_with(
                Field::Authors,
                "Affiliation not found in document header",
                &name.last,
            );
            return String::new();
        };

        match header.affiliation_for(&name.last) {
            Ok(affiliation) => affiliation,
            Err(AffiliationMiss::NameNotInHeader) => {
                issues.log_with(
                    Field::Authors,
                    format!("Name '{}' may not match in documents", name.last),
                    header.lines().join(" | "),
                );
                String::new()
            }
            Err(AffiliationMiss::NoAffiliationLine) => {
                issues.log_with(
                    Field::Authors,
                    "Affiliation not found in document header",
                    &name.last,
                );
                String::new()
            }
        }
    }
}

/// Split a delimited CSV cell, trimming entries and dropping trailing empties.
fn split_list(raw: &str, delimiter: char) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let mut items = raw.split(delimiter).map(str::trim).collect::<Vec<_>>();
    while items.last().is_some_and(|item| item.is_empty()) {
        items.pop();
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        authors: &str,
        affiliations: &str,
        header: Option<&str>,
    ) -> (Result<Vec<Author>>, IssueLog) {
        let mut issues = IssueLog::new();
        let result = AuthorAffiliationResolver::default().resolve(
            "paper-1",
            authors,
            affiliations,
            header,
            &mut issues,
        );
        (result, issues)
    }

    #[test]
    fn csv_affiliations_are_paired_in_order() {
        let (result, issues) = resolve("Jane Doe, John A. Smith Jr.", "MIT; Stanford", None);
        let authors = result.unwrap();

        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].seq_no, 1);
        assert_eq!(authors[0].first_name, "Jane");
        assert_eq!(authors[0].last_name, "Doe");
        assert_eq!(authors[0].affiliation, "MIT");

        assert_eq!(authors[1].seq_no, 2);
        assert_eq!(authors[1].first_name, "John");
        assert_eq!(authors[1].middle_name, "A.");
        assert_eq!(authors[1].last_name, "Smith");
        assert_eq!(authors[1].suffix, "Jr.");
        assert_eq!(authors[1].affiliation, "Stanford");
        assert!(issues.is_clean());
    }

    #[test]
    fn count_mismatch_is_a_document_error() {
        let (result, _) = resolve("Jane Doe, John Smith", "MIT", None);
        match result {
            Err(ExtractError::AffiliationCountMismatch {
                document,
                authors,
                affiliations,
            }) => {
                assert_eq!(document, "paper-1");
                assert_eq!(authors, 2);
                assert_eq!(affiliations, 1);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn trailing_delimiter_is_tolerated() {
        let (result, _) = resolve("Jane Doe,", "MIT;", None);
        assert_eq!(result.unwrap()[0].affiliation, "MIT");
    }

    #[test]
    fn falls_back_to_header_with_markers() {
        let header = "Jane Doe\u{00B9}, John Smith\u{00B2}\n\u{00B9}MIT\n\u{00B2}Stanford\njane@mit.edu\n";
        let (result, issues) = resolve("Jane Doe, John Smith", "", Some(header));
        let authors = result.unwrap();

        assert_eq!(authors[0].affiliation, "MIT");
        assert_eq!(authors[1].affiliation, "Stanford");
        assert_eq!(authors[0].email.as_deref(), Some("jane@mit.edu"));
        assert_eq!(authors[1].email, None);
        assert!(issues.is_clean());
    }

    #[test]
    fn invalid_names_are_skipped_but_keep_positions() {
        let (result, issues) = resolve("Cher, Jane Doe", "Studio; MIT", None);
        let authors = result.unwrap();

        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].seq_no, 2);
        assert_eq!(issues.get(Field::Authors), ["<Invalid name> ---- Cher"]);
    }

    #[test]
    fn empty_author_data_is_logged() {
        let (result, issues) = resolve("  ", "MIT", None);
        assert!(result.unwrap().is_empty());
        assert_eq!(issues.get(Field::Authors), ["<Author CSV data is empty>"]);
    }

    #[test]
    fn unmatched_header_name_is_logged() {
        let (result, issues) = resolve("Jane Doe", "", Some("Someone Else\nMIT\n"));
        assert_eq!(result.unwrap()[0].affiliation, "");
        assert!(issues.get(Field::Authors)[0].starts_with("<Name 'Doe' may not match"));
    }
}
