//! procmeta extraction: section segmentation, field extractors, references,
//! authors, concept taxonomy resolution.

pub mod authors;
pub mod categories;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod references;
pub mod sections;
pub mod taxonomy;

pub use authors::AuthorAffiliationResolver;
pub use categories::CategoryTable;
pub use error::{ExtractError, Result};
pub use pipeline::{ConceptResolution, Extraction, Extractor, validate_record};
pub use references::ReferenceParser;
pub use sections::{Section, SectionPatterns, SectionSegmenter};
pub use taxonomy::{
    ConceptGraph, ConceptLookup, ConceptNode, ConceptTaxonomyResolver, Taxonomy,
};
