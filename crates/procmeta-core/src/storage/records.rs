use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ProcmetaError, Result};
use crate::models::DocumentRecord;

/// Save a record as `{records_dir}/{id}.json`.
pub fn save_record(records_dir: &Path, record: &DocumentRecord) -> Result<PathBuf> {
    fs::create_dir_all(records_dir)?;
    let path = records_dir.join(format!("{}.json", record.id));
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Load a stored record by id.
pub fn load_record(records_dir: &Path, id: &str) -> Result<DocumentRecord> {
    let path = records_dir.join(format!("{id}.json"));
    if !path.exists() {
        return Err(ProcmetaError::RecordNotFound(id.to_string()));
    }
    let contents = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Load a stored record and overlay `{patches_dir}/{id}.json` if present.
///
/// Top-level patch keys replace the extracted values; other fields are kept.
pub fn load_record_with_patch(
    records_dir: &Path,
    patches_dir: &Path,
    id: &str,
) -> Result<DocumentRecord> {
    let record = load_record(records_dir, id)?;
    let patch_path = patches_dir.join(format!("{id}.json"));
    if !patch_path.exists() {
        return Ok(record);
    }

    tracing::info!(%id, patch = %patch_path.display(), "applying patch");
    let patch: Value = serde_json::from_str(&fs::read_to_string(&patch_path)?)?;
    apply_patch(record, patch)
}

/// Overlay a JSON object onto a record.
pub fn apply_patch(record: DocumentRecord, patch: Value) -> Result<DocumentRecord> {
    let Value::Object(patch) = patch else {
        return Err(ProcmetaError::Config(
            "patch must be a JSON object".to_string(),
        ));
    };

    let text = record.text.clone();
    let mut merged = serde_json::to_value(record)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            fields.insert(key, value);
        }
    }

    let mut patched: DocumentRecord = serde_json::from_value(merged)?;
    patched.text = text;
    Ok(patched)
}

/// Ids of every stored record, sorted.
pub fn list_record_ids(records_dir: &Path) -> Result<Vec<String>> {
    if !records_dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in fs::read_dir(records_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem() {
                ids.push(stem.to_string_lossy().into_owned());
            }
        }
    }
    ids.sort();
    Ok(ids)
}
