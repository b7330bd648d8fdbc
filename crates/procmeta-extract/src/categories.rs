//! Flat category-code table (`H.5.2` → descriptor).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{ExtractError, Result};

#[derive(Debug, Deserialize)]
struct CategoriesXml {
    #[serde(rename = "category", default)]
    entries: Vec<CategoryXml>,
}

#[derive(Debug, Deserialize)]
struct CategoryXml {
    cat_node: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    descriptors: HashMap<String, String>,
}

impl CategoryTable {
    pub fn load(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path).map_err(|e| {
            ExtractError::Taxonomy(format!("cannot read category table {}: {e}", path.display()))
        })?;
        let table = Self::parse(&xml)?;
        tracing::info!(path = %path.display(), categories = table.len(), "loaded category table");
        Ok(table)
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let doc: CategoriesXml = from_str(xml)
            .map_err(|e| ExtractError::Taxonomy(format!("invalid category xml: {e}")))?;
        Ok(doc
            .entries
            .into_iter()
            .map(|entry| (entry.cat_node.trim().to_string(), entry.name.trim().to_string()))
            .collect())
    }

    /// Descriptor for `code`, or `""` when absent.
    pub fn get(&self, code: &str) -> &str {
        self.descriptors.get(code).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, code: &str) -> bool {
        self.descriptors.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl FromIterator<(String, String)> for CategoryTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_xml() {
        let table = CategoryTable::parse(
            "<categories>\
               <category><cat_node>H.5.2</cat_node><name>User Interfaces</name></category>\
               <category><cat_node>D.2</cat_node><name>Software Engineering</name></category>\
             </categories>",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("H.5.2"), "User Interfaces");
        assert_eq!(table.get("Z.9"), "");
        assert!(!table.contains("Z.9"));
    }

    #[test]
    fn empty_table_parses() {
        assert!(CategoryTable::parse("<categories/>").unwrap().is_empty());
    }
}
