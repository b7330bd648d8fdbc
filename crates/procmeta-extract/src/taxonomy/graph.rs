use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};

/// One taxonomy concept with its labels and broader links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: String,
    #[serde(default)]
    pub pref_label: String,
    #[serde(default)]
    pub alt_labels: Vec<String>,
    #[serde(default)]
    pub broader: Vec<String>,
}

impl ConceptNode {
    pub fn new(id: impl Into<String>, pref_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pref_label: pref_label.into(),
            ..Default::default()
        }
    }

    pub fn with_broader(mut self, parent: impl Into<String>) -> Self {
        self.broader.push(parent.into());
        self
    }

    pub fn with_alt_label(mut self, label: impl Into<String>) -> Self {
        self.alt_labels.push(label.into());
        self
    }

    fn absorb(&mut self, other: ConceptNode) {
        if self.pref_label.is_empty() {
            self.pref_label = other.pref_label;
        } else if !other.pref_label.is_empty() && other.pref_label != self.pref_label {
            self.alt_labels.push(other.pref_label);
        }
        for label in other.alt_labels {
            if !self.alt_labels.contains(&label) {
                self.alt_labels.push(label);
            }
        }
        for parent in other.broader {
            if !self.broader.contains(&parent) {
                self.broader.push(parent);
            }
        }
    }
}

/// Label lookup in insertion order, by exact text and by canonical key.
#[derive(Debug, Default)]
struct LabelIndex {
    exact: HashMap<String, Vec<String>>,
    canonical: HashMap<String, Vec<String>>,
}

impl LabelIndex {
    fn insert(&mut self, label: &str, id: &str) {
        if label.trim().is_empty() {
            return;
        }
        push_unique(self.exact.entry(label.trim().to_string()).or_default(), id);
        push_unique(self.canonical.entry(canonical_label(label)).or_default(), id);
    }

    fn exact(&self, label: &str) -> &[String] {
        self.exact.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    fn canonical(&self, key: &str) -> &[String] {
        self.canonical.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

/// Lowercase, hyphens as spaces, whitespace collapsed.
pub fn canonical_label(label: &str) -> String {
    label
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only concept graph shared by every extraction of a run.
#[derive(Debug, Default)]
pub struct ConceptGraph {
    nodes: HashMap<String, ConceptNode>,
    order: Vec<String>,
    top: HashSet<String>,
    preferred: LabelIndex,
    alternate: LabelIndex,
}

impl ConceptGraph {
    /// Build and validate a graph.
    ///
    /// Nodes sharing an id are merged. Without declared top concepts every node
    /// lacking broader links is a top concept. An empty graph, an unknown top
    /// id or a broader link to an unknown node is an error.
    pub fn new(nodes: Vec<ConceptNode>, top_concepts: Vec<String>) -> Result<Self> {
        let mut graph = ConceptGraph::default();
        for node in nodes {
            match graph.nodes.get_mut(&node.id) {
                Some(existing) => existing.absorb(node),
                None => {
                    graph.order.push(node.id.clone());
                    graph.nodes.insert(node.id.clone(), node);
                }
            }
        }

        if graph.nodes.is_empty() {
            return Err(ExtractError::Taxonomy("taxonomy has no concepts".to_string()));
        }

        for id in &graph.order {
            let node = &graph.nodes[id];
            if let Some(parent) = node.broader.iter().find(|p| !graph.nodes.contains_key(*p)) {
                return Err(ExtractError::Taxonomy(format!(
                    "concept '{id}' has unknown broader concept '{parent}'"
                )));
            }
        }

        for id in &top_concepts {
            if !graph.nodes.contains_key(id) {
                return Err(ExtractError::Taxonomy(format!("unknown top concept '{id}'")));
            }
        }
        graph.top = if top_concepts.is_empty() {
            graph
                .order
                .iter()
                .filter(|id| graph.nodes[*id].broader.is_empty())
                .cloned()
                .collect()
        } else {
            top_concepts.into_iter().collect()
        };

        for id in &graph.order {
            let node = &graph.nodes[id];
            graph.preferred.insert(&node.pref_label, id);
            for label in &node.alt_labels {
                graph.alternate.insert(label, id);
            }
        }

        tracing::debug!(
            concepts = graph.nodes.len(),
            top_concepts = graph.top.len(),
            "concept graph built"
        );
        Ok(graph)
    }

    pub fn get(&self, id: &str) -> Option<&ConceptNode> {
        self.nodes.get(id)
    }

    pub fn is_top(&self, id: &str) -> bool {
        self.top.contains(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn top_concepts(&self) -> impl Iterator<Item = &ConceptNode> {
        self.order
            .iter()
            .filter(|id| self.top.contains(*id))
            .map(|id| &self.nodes[id])
    }

    /// Nodes carrying `label`, most specific match first.
    ///
    /// Exact preferred, exact alternate, canonical preferred, canonical
    /// alternate; each id appears once.
    pub fn find_by_label(&self, label: &str) -> Vec<&ConceptNode> {
        let label = label.trim();
        let key = canonical_label(label);
        let mut ids: Vec<&String> = Vec::new();
        for candidates in [
            self.preferred.exact(label),
            self.alternate.exact(label),
            self.preferred.canonical(&key),
            self.alternate.canonical(&key),
        ] {
            for id in candidates {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids.into_iter().filter_map(|id| self.nodes.get(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConceptGraph {
        ConceptGraph::new(
            vec![
                ConceptNode::new("#1", "Computer systems organization"),
                ConceptNode::new("#2", "Embedded and cyber-physical systems").with_broader("#1"),
                ConceptNode::new("#3", "Real-time systems")
                    .with_broader("#2")
                    .with_alt_label("RTS"),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn roots_become_top_concepts_when_none_declared() {
        let graph = sample();
        assert!(graph.is_top("#1"));
        assert!(!graph.is_top("#3"));
        assert_eq!(graph.top_concepts().count(), 1);
    }

    #[test]
    fn finds_labels_exactly_then_canonically() {
        let graph = sample();
        assert_eq!(graph.find_by_label("Real-time systems")[0].id, "#3");
        assert_eq!(graph.find_by_label("real time  systems")[0].id, "#3");
        assert_eq!(graph.find_by_label("RTS")[0].id, "#3");
        assert!(graph.find_by_label("Quantum widgets").is_empty());
    }

    #[test]
    fn merges_repeated_nodes() {
        let graph = ConceptGraph::new(
            vec![
                ConceptNode::new("#1", "Root"),
                ConceptNode::new("#2", "Leaf"),
                ConceptNode::new("#2", "").with_broader("#1").with_alt_label("Twig"),
            ],
            vec!["#1".into()],
        )
        .unwrap();
        let leaf = graph.get("#2").unwrap();
        assert_eq!(leaf.pref_label, "Leaf");
        assert_eq!(leaf.broader, vec!["#1"]);
        assert_eq!(graph.find_by_label("twig")[0].id, "#2");
    }

    #[test]
    fn rejects_invalid_graphs() {
        assert!(matches!(
            ConceptGraph::new(vec![], vec![]),
            Err(ExtractError::Taxonomy(_))
        ));

        let dangling = ConceptGraph::new(vec![ConceptNode::new("#2", "Leaf").with_broader("#9")], vec![]);
        assert!(matches!(dangling, Err(ExtractError::Taxonomy(msg)) if msg.contains("#9")));

        let unknown_top = ConceptGraph::new(vec![ConceptNode::new("#1", "Root")], vec!["#7".into()]);
        assert!(unknown_top.is_err());
    }
}
