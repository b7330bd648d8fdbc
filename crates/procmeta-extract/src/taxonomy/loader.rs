//! Concept graph sources: SKOS RDF/XML and a flat JSON form.

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Deserialize;

use super::graph::{ConceptGraph, ConceptNode};
use crate::error::{ExtractError, Result};

/// Load a concept graph, choosing the format by file extension.
pub fn load_graph(path: &Path) -> Result<ConceptGraph> {
    let source = fs::read_to_string(path).map_err(|e| {
        ExtractError::Taxonomy(format!("cannot read taxonomy {}: {e}", path.display()))
    })?;

    let graph = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&source)?,
        _ => parse_skos(&source)?,
    };
    tracing::info!(path = %path.display(), concepts = graph.len(), "loaded concept graph");
    Ok(graph)
}

#[derive(Debug, Deserialize)]
struct JsonTaxonomy {
    #[serde(default)]
    top_concepts: Vec<String>,
    concepts: Vec<ConceptNode>,
}

pub fn parse_json(source: &str) -> Result<ConceptGraph> {
    let taxonomy: JsonTaxonomy = serde_json::from_str(source)
        .map_err(|e| ExtractError::Taxonomy(format!("invalid taxonomy json: {e}")))?;
    ConceptGraph::new(taxonomy.concepts, taxonomy.top_concepts)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelSlot {
    Preferred,
    Alternate,
    Ignored,
}

/// Parse SKOS RDF/XML.
///
/// Reads `skos:Concept` elements (`rdf:about`) with their `prefLabel`,
/// `altLabel`, `broader` and `narrower` children. Top concepts come from
/// `topConceptOf` and `hasTopConcept`. Labels tagged with a language other
/// than English are skipped.
pub fn parse_skos(xml: &str) -> Result<ConceptGraph> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut nodes = Vec::new();
    let mut top = Vec::new();
    let mut narrower = Vec::new();
    let mut current: Option<ConceptNode> = None;
    let mut slot: Option<LabelSlot> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"Concept" => {
                    let id = attribute(&e, b"about")?.ok_or_else(|| {
                        ExtractError::Taxonomy("skos:Concept without rdf:about".to_string())
                    })?;
                    current = Some(ConceptNode::new(id, ""));
                }
                b"prefLabel" if current.is_some() => {
                    slot = Some(if is_english(&e)? {
                        LabelSlot::Preferred
                    } else {
                        LabelSlot::Ignored
                    });
                }
                b"altLabel" if current.is_some() => {
                    slot = Some(if is_english(&e)? {
                        LabelSlot::Alternate
                    } else {
                        LabelSlot::Ignored
                    });
                }
                _ => relation(&e, current.as_mut(), &mut top, &mut narrower)?,
            },
            Event::Empty(e) => relation(&e, current.as_mut(), &mut top, &mut narrower)?,
            Event::Text(e) => {
                if let (Some(slot), Some(node)) = (slot, current.as_mut()) {
                    let text = e.unescape()?.trim().to_string();
                    match slot {
                        LabelSlot::Preferred if node.pref_label.is_empty() => node.pref_label = text,
                        LabelSlot::Preferred | LabelSlot::Alternate => {
                            if !node.alt_labels.contains(&text) {
                                node.alt_labels.push(text);
                            }
                        }
                        LabelSlot::Ignored => {}
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"Concept" => {
                    if let Some(node) = current.take() {
                        nodes.push(node);
                    }
                }
                b"prefLabel" | b"altLabel" => slot = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // `narrower` links are folded in as broader links on the narrower concept.
    for (parent, child) in narrower {
        if let Some(node) = nodes.iter_mut().find(|node| node.id == child) {
            if !node.broader.contains(&parent) {
                node.broader.push(parent);
            }
        }
    }

    top.dedup();
    ConceptGraph::new(nodes, top)
}

fn relation(
    e: &BytesStart<'_>,
    current: Option<&mut ConceptNode>,
    top: &mut Vec<String>,
    narrower: &mut Vec<(String, String)>,
) -> Result<()> {
    let name = e.local_name();
    let name = name.as_ref();
    if !matches!(
        name,
        b"broader" | b"narrower" | b"topConceptOf" | b"hasTopConcept"
    ) {
        return Ok(());
    }
    let Some(resource) = attribute(e, b"resource")? else {
        return Ok(());
    };

    match (name, current) {
        (b"hasTopConcept", _) => top.push(resource),
        (b"broader", Some(node)) => {
            if !node.broader.contains(&resource) {
                node.broader.push(resource);
            }
        }
        (b"narrower", Some(node)) => narrower.push((node.id.clone(), resource)),
        (b"topConceptOf", Some(node)) => top.push(node.id.clone()),
        _ => {}
    }
    Ok(())
}

/// Value of the attribute whose local name is `local`, unescaped.
fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.trim().to_string()));
        }
    }
    Ok(None)
}

fn is_english(e: &BytesStart<'_>) -> Result<bool> {
    Ok(attribute(e, b"lang")?.is_none_or(|lang| lang.is_empty() || lang.starts_with("en")))
}
