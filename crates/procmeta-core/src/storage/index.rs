//! CSV article index: the authoritative per-document fields.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{ProcmetaError, Result};
use crate::text::normalize;

/// One index row. Missing columns read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    fields: HashMap<String, String>,
}

impl IndexEntry {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Index rows keyed by the configured identifier column, in file order.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: HashMap<String, IndexEntry>,
    order: Vec<String>,
}

impl Index {
    /// Parse CSV with a header row. Header names are lowercased with spaces
    /// replaced by `_`; values are normalized.
    pub fn from_reader<R: Read>(reader: R, key: &str) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let header = csv
            .headers()?
            .iter()
            .map(|name| name.trim().to_lowercase().replace(' ', "_"))
            .collect::<Vec<_>>();

        if !header.iter().any(|name| name == key) {
            return Err(ProcmetaError::MissingColumn(key.to_string()));
        }

        let mut index = Index::default();
        for row in csv.records() {
            let row = row?;
            let entry = IndexEntry::from_pairs(
                header
                    .iter()
                    .zip(row.iter())
                    .filter(|(name, _)| !name.is_empty())
                    .map(|(name, value)| (name.clone(), normalize(value))),
            );

            let id = entry.get(key).trim().to_string();
            if id.is_empty() {
                tracing::warn!(column = key, "skipping index row without identifier");
                continue;
            }
            index.insert(id, entry);
        }
        Ok(index)
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: IndexEntry) {
        let id = id.into();
        if self.entries.insert(id.clone(), entry).is_some() {
            tracing::warn!(%id, "duplicate index identifier, keeping last row");
        } else {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Load the index file at `path`, keyed by `key`.
pub fn load_index(path: &Path, key: &str) -> Result<Index> {
    let file = std::fs::File::open(path)?;
    let index = Index::from_reader(file, key)?;
    tracing::info!(path = %path.display(), rows = index.len(), "loaded article index");
    Ok(index)
}
