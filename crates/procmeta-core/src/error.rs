use thiserror::Error;

/// All errors that can occur in procmeta-core.
#[derive(Debug, Error)]
pub enum ProcmetaError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Index is missing column: {0}")]
    MissingColumn(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Text conversion failed: {0}")]
    TextConversion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ProcmetaError>;
