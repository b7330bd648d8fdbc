use serde::{Deserialize, Serialize};

/// A legacy subject category (e.g. `H.5.2`) with its table descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub descriptor: String,
    /// `S` marks a subject descriptor.
    #[serde(default = "subject_kind")]
    pub kind: String,
}

fn subject_kind() -> String {
    "S".to_string()
}

impl Category {
    pub fn subject(code: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            descriptor: descriptor.into(),
            kind: subject_kind(),
        }
    }
}
