//! Per-document orchestration of the field extractors.

use std::sync::Arc;

use procmeta_core::config::{AppConfig, ExtractionConfig, SectionsConfig};
use procmeta_core::{
    ConceptAssignment, DocumentRecord, Field, Index, IndexEntry, IssueLog, normalize,
};

use crate::authors::AuthorAffiliationResolver;
use crate::error::{ExtractError, Result};
use crate::fields;
use crate::references::ReferenceParser;
use crate::sections::{SectionPatterns, SectionSegmenter};
use crate::taxonomy::Taxonomy;

/// A finished record with the issues logged while producing it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: DocumentRecord,
    pub issues: IssueLog,
}

impl Extraction {
    /// Documents with at least one issue go to manual review.
    pub fn needs_review(&self) -> bool {
        !self.issues.is_clean()
    }
}

/// Resolved concept chains plus the phrases of chains that did not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptResolution {
    pub concepts: Vec<ConceptAssignment>,
    pub unresolved: Vec<String>,
}

/// Extraction engine. Holds compiled patterns and the shared taxonomy; every
/// call owns its own issue log, so one engine serves many threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    segmenter: SectionSegmenter,
    references: ReferenceParser,
    authors: AuthorAffiliationResolver,
    taxonomy: Arc<Taxonomy>,
}

impl Extractor {
    pub fn new(config: &AppConfig, taxonomy: Arc<Taxonomy>) -> Result<Self> {
        Self::with_settings(&config.extraction, &config.sections, taxonomy)
    }

    pub fn with_settings(
        extraction: &ExtractionConfig,
        sections: &SectionsConfig,
        taxonomy: Arc<Taxonomy>,
    ) -> Result<Self> {
        Ok(Self {
            config: extraction.clone(),
            segmenter: SectionSegmenter::new(SectionPatterns::compile(sections)?),
            references: ReferenceParser::from_config(extraction),
            authors: AuthorAffiliationResolver::from_config(extraction),
            taxonomy,
        })
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Extract the document `id` after checking it is present in the index.
    pub fn extract_indexed(&self, id: &str, index: &Index, raw: &str) -> Result<Extraction> {
        let entry = index
            .get(id)
            .ok_or_else(|| ExtractError::DocumentNotIndexed(id.to_string()))?;
        self.extract(id, entry, raw)
    }

    /// Build the record for one document from its index row and raw text.
    ///
    /// Field problems are logged and never fail the call; a structural
    /// author/affiliation mismatch does, and no record is produced.
    pub fn extract(&self, id: &str, entry: &IndexEntry, raw: &str) -> Result<Extraction> {
        let mut issues = IssueLog::new();
        let text = normalize(raw);

        let header = self.segmenter.header_block(&text, &mut issues);
        let authors = self.authors.resolve(
            id,
            entry.get("authors"),
            entry.get("affiliations"),
            header,
            &mut issues,
        )?;

        let abstract_text = self
            .segmenter
            .abstract_block(&text, &mut issues)
            .and_then(|block| {
                fields::clean_abstract(
                    block,
                    self.config.min_abstract_len,
                    self.config.max_abstract_len,
                    &mut issues,
                )
            });

        let resolution = self
            .segmenter
            .concepts_block(&text, &mut issues)
            .map(|block| self.resolve_concepts(block, &mut issues))
            .unwrap_or_default();

        let mut keywords = self
            .segmenter
            .keywords_block(&text, &mut issues)
            .map(fields::parse_keywords)
            .unwrap_or_default();
        keywords.extend(resolution.unresolved);

        let categories = self
            .segmenter
            .categories_block(&text, &mut issues)
            .map(|block| fields::parse_categories(block, &self.taxonomy.categories, &mut issues))
            .unwrap_or_default();

        let general_terms = self
            .segmenter
            .general_terms_block(&text, &mut issues)
            .map(|block| fields::parse_general_terms(block, &mut issues))
            .unwrap_or_default();

        let references = self
            .segmenter
            .references_block(&text, &mut issues)
            .map(|block| self.references.parse(block, &mut issues))
            .unwrap_or_default();

        let record = DocumentRecord {
            id: id.to_string(),
            number: entry.get("order").to_string(),
            doi: entry.get("doi").to_string(),
            file_id: id.to_string(),
            filename: entry.get("filename").to_string(),
            title: entry.get("title").to_string(),
            session: entry.get("session").to_string(),
            url: entry.get("url").to_string(),
            page_from: entry.get("from").to_string(),
            page_to: entry.get("to").to_string(),
            pages: entry.get("pages").to_string(),
            authors,
            abstract_text,
            concepts: resolution.concepts,
            keywords,
            categories,
            general_terms,
            references,
            text,
        };

        tracing::info!(
            document = id,
            authors = record.authors.len(),
            references = record.references.len(),
            concepts = record.concepts.len(),
            issues = issues.total(),
            "extracted document"
        );
        Ok(Extraction { record, issues })
    }

    /// Resolve every phrase chain of a classification block.
    pub fn resolve_concepts(&self, block: &str, issues: &mut IssueLog) -> ConceptResolution {
        let resolver = self.taxonomy.resolver();
        let mut resolution = ConceptResolution::default();

        for chain in fields::split_concept_chains(block) {
            let lookup = resolver.lookup(&chain);
            match lookup.path {
                Some(path) => resolution.concepts.push(ConceptAssignment::from_path(
                    &path,
                    self.config.concept_significance,
                )),
                None => {
                    issues.log_with(
                        Field::Concepts,
                        format!("Concept path not resolved: {}", chain.join(" \u{2192} ")),
                        lookup.trace.join(" | "),
                    );
                    resolution.unresolved.extend(chain);
                }
            }
        }
        resolution
    }

    pub fn validate(&self, record: &DocumentRecord, issues: &mut IssueLog) {
        validate_record(record, self.config.max_pages_without_categories, issues);
    }
}

/// Documents spanning more than `max_pages_without_categories` pages need
/// subject categories and keywords.
pub fn validate_record(
    record: &DocumentRecord,
    max_pages_without_categories: i64,
    issues: &mut IssueLog,
) {
    let Some(span) = record.page_span() else {
        tracing::debug!(document = %record.id, "no page range, skipping validation");
        return;
    };
    if span <= max_pages_without_categories {
        return;
    }

    if record.categories.is_empty() || record.keywords.is_empty() {
        issues.log(
            Field::Categories,
            format!(
                "Categories and keywords required for articles > {max_pages_without_categories} pages; optional for shorter articles"
            ),
        );
    }
}
