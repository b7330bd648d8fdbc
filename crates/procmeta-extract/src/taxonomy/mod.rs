//! Concept taxonomy: graph, loaders and the path resolver.

pub mod graph;
pub mod loader;
pub mod resolver;

pub use graph::{ConceptGraph, ConceptNode, canonical_label};
pub use loader::{load_graph, parse_json, parse_skos};
pub use resolver::{ConceptLookup, ConceptTaxonomyResolver};

use std::path::Path;

use crate::categories::CategoryTable;
use crate::error::Result;

/// Read-only reference data loaded once per run and shared across workers.
#[derive(Debug, Default)]
pub struct Taxonomy {
    pub graph: ConceptGraph,
    pub categories: CategoryTable,
}

impl Taxonomy {
    pub fn new(graph: ConceptGraph, categories: CategoryTable) -> Self {
        Self { graph, categories }
    }

    /// Load the concept graph and, when given, the category table.
    pub fn load(graph_path: &Path, categories_path: Option<&Path>) -> Result<Self> {
        let graph = load_graph(graph_path)?;
        let categories = match categories_path {
            Some(path) => CategoryTable::load(path)?,
            None => CategoryTable::default(),
        };
        Ok(Self::new(graph, categories))
    }

    pub fn resolver(&self) -> ConceptTaxonomyResolver<'_> {
        ConceptTaxonomyResolver::new(&self.graph)
    }
}
