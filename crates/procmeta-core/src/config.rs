use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from `~/.config/procmeta/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub index: IndexConfig,
    pub extraction: ExtractionConfig,
    pub sections: SectionsConfig,
}

/// Input and output locations of a proceedings run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub index: PathBuf,
    pub articles: PathBuf,
    pub raw: PathBuf,
    pub records: PathBuf,
    pub logs: PathBuf,
    pub text: PathBuf,
    pub patches: PathBuf,
    pub taxonomy: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Column holding the document identifier (matches the input file stem).
    pub key: String,
}

/// Thresholds and name tables used by the field extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_reference_len: usize,
    pub max_reference_len: usize,
    pub min_abstract_len: usize,
    pub max_abstract_len: usize,
    pub max_pages_without_categories: i64,
    pub concept_significance: u32,
    pub name_suffixes: Vec<String>,
    pub name_prefixes: Vec<String>,
}

/// Per-field anchor overrides. Empty lists fall back to the built-in anchors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    #[serde(rename = "abstract")]
    pub abstract_text: AnchorConfig,
    pub keywords: AnchorConfig,
    pub categories: AnchorConfig,
    pub general_terms: AnchorConfig,
    pub concepts: AnchorConfig,
    pub references: AnchorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub start: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            index: PathBuf::from("index/articles.csv"),
            articles: PathBuf::from("articles"),
            raw: PathBuf::from("raw"),
            records: PathBuf::from("output/metadata"),
            logs: PathBuf::from("output/logs"),
            text: PathBuf::from("output/txt"),
            patches: PathBuf::from("patches"),
            taxonomy: PathBuf::from("taxonomy/ccs2012.xml"),
            categories: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            key: "file_id".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_reference_len: 5,
            max_reference_len: 600,
            min_abstract_len: 200,
            max_abstract_len: 2000,
            max_pages_without_categories: 2,
            concept_significance: 500,
            name_suffixes: ["Jr.", "Sr.", "jr.", "sr.", "II", "III"]
                .into_iter()
                .map(String::from)
                .collect(),
            name_prefixes: ["Al", "Dr.", "van", "von", "de"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/procmeta/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PROCMETA_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("procmeta")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Create every output directory of a run.
    pub fn ensure_output_dirs(&self) -> Result<()> {
        for dir in [&self.paths.records, &self.paths.logs, &self.paths.text] {
            if !dir.is_dir() {
                tracing::info!(dir = %dir.display(), "creating output directory");
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}
