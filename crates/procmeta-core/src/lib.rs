pub mod config;
pub mod error;
pub mod issues;
pub mod models;
pub mod storage;
pub mod text;

pub use config::{AppConfig, ExtractionConfig, IndexConfig, PathsConfig, SectionsConfig};
pub use error::{ProcmetaError, Result};
pub use issues::{Field, IssueLog};
pub use models::*;
pub use text::normalize;

pub use storage::index::{Index, IndexEntry, load_index};
pub use storage::records::{list_record_ids, load_record, load_record_with_patch, save_record};
pub use storage::review::{ReviewDirs, write_review};
pub use storage::sources::{CachedTextSource, PdftotextSource, TextSource, document_id, list_inputs};
