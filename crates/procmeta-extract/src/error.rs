use procmeta_core::ProcmetaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document {document}: {authors} authors but {affiliations} affiliations in index")]
    AffiliationCountMismatch {
        document: String,
        authors: usize,
        affiliations: usize,
    },

    #[error("document '{0}' not found in index")]
    DocumentNotIndexed(String),

    #[error("taxonomy error: {0}")]
    Taxonomy(String),

    #[error("invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Core(#[from] ProcmetaError),
}

impl ExtractError {
    /// Errors that invalidate a single document; a batch skips the document and
    /// carries on. Everything else aborts the run.
    pub fn is_document_level(&self) -> bool {
        match self {
            ExtractError::AffiliationCountMismatch { .. } | ExtractError::DocumentNotIndexed(_) => {
                true
            }
            ExtractError::Core(ProcmetaError::TextConversion(_)) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
