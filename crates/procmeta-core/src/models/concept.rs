use serde::{Deserialize, Serialize};

/// A validated broader-chain through the concept graph, top concept first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptPath {
    /// Full node ids from the top concept down to the leaf.
    pub ids: Vec<String>,
    /// Preferred labels matching `ids`.
    pub labels: Vec<String>,
}

impl ConceptPath {
    /// Ids with namespace fragments stripped, joined with `.`.
    pub fn dotted_id(&self) -> String {
        self.ids
            .iter()
            .map(|id| strip_namespace(id))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Labels joined with `~`.
    pub fn label_chain(&self) -> String {
        self.labels.join("~")
    }
}

/// Drop everything up to and including the last `#` (or `/` for hashless IRIs).
pub fn strip_namespace(id: &str) -> &str {
    if let Some((_, local)) = id.rsplit_once('#') {
        return local;
    }
    if id.contains("://") {
        if let Some((_, local)) = id.rsplit_once('/') {
            return local;
        }
    }
    id
}

/// A resolved concept as stored on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptAssignment {
    pub id: String,
    pub description: String,
    pub significance: u32,
}

impl ConceptAssignment {
    pub fn from_path(path: &ConceptPath, significance: u32) -> Self {
        Self {
            id: path.dotted_id(),
            description: path.label_chain(),
            significance,
        }
    }
}
