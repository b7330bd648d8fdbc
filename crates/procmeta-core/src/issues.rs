//! Per-document diagnostics collected during extraction.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Record fields that can carry review issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Authors,
    Abstract,
    References,
    Keywords,
    Categories,
    Concepts,
    GeneralTerms,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Authors,
        Field::Abstract,
        Field::References,
        Field::Keywords,
        Field::Categories,
        Field::Concepts,
        Field::GeneralTerms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Authors => "authors",
            Field::Abstract => "abstract",
            Field::References => "references",
            Field::Keywords => "keywords",
            Field::Categories => "categories",
            Field::Concepts => "concepts",
            Field::GeneralTerms => "general_terms",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered issue messages per field, scoped to one document.
///
/// Serializes with every field present so review tooling sees a stable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueLog {
    entries: BTreeMap<Field, Vec<String>>,
}

impl Default for IssueLog {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueLog {
    pub fn new() -> Self {
        Self {
            entries: Field::ALL.into_iter().map(|field| (field, Vec::new())).collect(),
        }
    }

    /// Log `<message>` against a field.
    pub fn log(&mut self, field: Field, message: impl AsRef<str>) {
        let entry = format!("<{}>", message.as_ref());
        tracing::debug!(%field, issue = %entry);
        self.entries.entry(field).or_default().push(entry);
    }

    /// Log `<message> ---- data` against a field.
    pub fn log_with(&mut self, field: Field, message: impl AsRef<str>, data: impl fmt::Display) {
        let entry = format!("<{}> ---- {}", message.as_ref(), data);
        tracing::debug!(%field, issue = %entry);
        self.entries.entry(field).or_default().push(entry);
    }

    pub fn get(&self, field: Field) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of messages across all fields.
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Fields with at least one message, in declaration order.
    pub fn flagged_fields(&self) -> Vec<Field> {
        self.entries
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, _)| *field)
            .collect()
    }
}
