use procmeta_core::ConceptPath;

use super::graph::{ConceptGraph, ConceptNode};

/// Outcome of resolving one phrase chain, with the steps that led to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptLookup {
    pub path: Option<ConceptPath>,
    pub trace: Vec<String>,
}

impl ConceptLookup {
    pub fn is_resolved(&self) -> bool {
        self.path.is_some()
    }

    fn note(&mut self, step: String) {
        tracing::debug!(target: "procmeta::concepts", "{step}");
        self.trace.push(step);
    }
}

/// Maps a top-to-bottom phrase chain onto a broader-chain in the graph.
#[derive(Debug, Clone, Copy)]
pub struct ConceptTaxonomyResolver<'g> {
    graph: &'g ConceptGraph,
}

impl<'g> ConceptTaxonomyResolver<'g> {
    pub fn new(graph: &'g ConceptGraph) -> Self {
        Self { graph }
    }

    /// Resolve `phrases`, first = broadest label, last = narrowest label.
    ///
    /// The top label must match a designated top concept. Every node matching
    /// the bottom label is tried as a seed until one ascends to that top.
    pub fn lookup<S: AsRef<str>>(&self, phrases: &[S]) -> ConceptLookup {
        let mut lookup = ConceptLookup::default();
        let phrases = phrases
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>();

        let (Some(top_label), Some(bottom_label)) = (phrases.first(), phrases.last()) else {
            lookup.note("no concept phrases given".to_string());
            return lookup;
        };

        let top_matches = self.graph.find_by_label(top_label);
        let Some(top) = top_matches.iter().find(|node| self.graph.is_top(&node.id)) else {
            if top_matches.is_empty() {
                lookup.note(format!("top label '{top_label}' matches no concept"));
            } else {
                lookup.note(format!(
                    "top label '{top_label}' matches {:?}, none of them a top concept",
                    ids(&top_matches)
                ));
            }
            return lookup;
        };
        lookup.note(format!("top '{top_label}' -> {}", top.id));

        let seeds = self.graph.find_by_label(bottom_label);
        if seeds.is_empty() {
            lookup.note(format!("bottom label '{bottom_label}' matches no concept"));
            return lookup;
        }
        lookup.note(format!("bottom '{bottom_label}' -> {:?}", ids(&seeds)));

        for seed in seeds {
            let mut stack = Vec::new();
            match self.ascend(&seed.id, &top.id, &mut stack, &mut lookup) {
                Some(ids) => {
                    let labels = ids
                        .iter()
                        .map(|id| {
                            self.graph
                                .get(id)
                                .map(|node| node.pref_label.clone())
                                .unwrap_or_default()
                        })
                        .collect();
                    let path = ConceptPath { ids, labels };
                    lookup.note(format!("valid path {}", path.dotted_id()));
                    lookup.path = Some(path);
                    return lookup;
                }
                None => lookup.note(format!("seed {} does not reach {}", seed.id, top.id)),
            }
        }
        lookup
    }

    /// Depth-first ascent over broader links. Returns the chain from `top_id`
    /// down to `id` when one exists.
    fn ascend(
        &self,
        id: &str,
        top_id: &str,
        stack: &mut Vec<String>,
        lookup: &mut ConceptLookup,
    ) -> Option<Vec<String>> {
        let Some(node) = self.graph.get(id) else {
            lookup.note(format!("skipping missing concept {id}"));
            return None;
        };
        lookup.note(format!(
            "at {id}: broader {:?}, path {:?}",
            node.broader, stack
        ));

        if id == top_id {
            return Some(vec![id.to_string()]);
        }
        if node.broader.is_empty() {
            return None;
        }

        stack.push(id.to_string());
        let mut found = None;
        for parent in &node.broader {
            if stack.contains(parent) {
                lookup.note(format!("cycle at {parent}"));
                continue;
            }
            if let Some(mut chain) = self.ascend(parent, top_id, stack, lookup) {
                chain.push(id.to_string());
                found = Some(chain);
                break;
            }
        }
        stack.pop();
        found
    }
}

fn ids(nodes: &[&ConceptNode]) -> Vec<String> {
    nodes.iter().map(|node| node.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ConceptGraph {
        ConceptGraph::new(
            vec![
                ConceptNode::new("#10010520", "Computer systems organization"),
                ConceptNode::new("#10010553", "Embedded and cyber-physical systems")
                    .with_broader("#10010520"),
                ConceptNode::new("#10010554", "Real-time systems").with_broader("#10010553"),
                ConceptNode::new("#10002944", "General and reference"),
                ConceptNode::new("#10002945", "Real-time systems").with_broader("#10002944"),
                ConceptNode::new("#10003000", "Computer systems organization")
                    .with_broader("#10002944"),
            ],
            vec!["#10010520".into(), "#10002944".into()],
        )
        .unwrap()
    }

    #[test]
    fn resolves_full_chain_from_top_to_leaf() {
        let graph = graph();
        let lookup = ConceptTaxonomyResolver::new(&graph)
            .lookup(&["Computer systems organization", "Real-time systems"]);

        let path = lookup.path.expect("path should resolve");
        assert_eq!(path.ids, vec!["#10010520", "#10010553", "#10010554"]);
        assert_eq!(path.labels[0], "Computer systems organization");
        assert_eq!(path.dotted_id(), "10010520.10010553.10010554");
        assert_eq!(
            path.label_chain(),
            "Computer systems organization~Embedded and cyber-physical systems~Real-time systems"
        );
    }

    #[test]
    fn tries_every_colliding_bottom_label() {
        let graph = graph();
        let lookup =
            ConceptTaxonomyResolver::new(&graph).lookup(&["General and reference", "real-time systems"]);

        let path = lookup.path.unwrap();
        assert_eq!(path.ids, vec!["#10002944", "#10002945"]);
        assert!(lookup.trace.iter().any(|step| step.contains("does not reach")));
    }

    #[test]
    fn top_label_must_name_a_top_concept() {
        let graph = ConceptGraph::new(
            vec![
                ConceptNode::new("#1", "Root"),
                ConceptNode::new("#2", "Networks").with_broader("#1"),
                ConceptNode::new("#3", "Protocols").with_broader("#2"),
            ],
            vec![],
        )
        .unwrap();
        let lookup = ConceptTaxonomyResolver::new(&graph).lookup(&["Networks", "Protocols"]);

        assert!(!lookup.is_resolved());
        assert!(lookup.trace[0].contains("none of them a top concept"));
    }

    #[test]
    fn unknown_labels_are_traced() {
        let graph = graph();
        let resolver = ConceptTaxonomyResolver::new(&graph);

        let lookup = resolver.lookup(&["Computer systems organization", "Teleportation"]);
        assert!(!lookup.is_resolved());
        assert!(lookup.trace.last().unwrap().contains("matches no concept"));

        let empty: [&str; 0] = [];
        assert!(!resolver.lookup(&empty).is_resolved());
    }

    #[test]
    fn cycles_do_not_loop_forever() {
        let graph = ConceptGraph::new(
            vec![
                ConceptNode::new("#1", "Root"),
                ConceptNode::new("#2", "A").with_broader("#3"),
                ConceptNode::new("#3", "B").with_broader("#2"),
            ],
            vec!["#1".into()],
        )
        .unwrap();
        let lookup = ConceptTaxonomyResolver::new(&graph).lookup(&["Root", "A"]);

        assert!(!lookup.is_resolved());
        assert!(lookup.trace.iter().any(|step| step.starts_with("cycle")));
    }
}
