//! Raw-text sources: primary document-to-text conversion or cached plain text.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProcmetaError, Result};

/// Produces the raw text of one input document.
pub trait TextSource: Send + Sync {
    /// File extension (without dot) of the inputs this source reads.
    fn extension(&self) -> &'static str;

    fn read_text(&self, path: &Path) -> Result<String>;
}

/// Reads previously cached `.txt` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedTextSource;

impl TextSource for CachedTextSource {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Converts PDF files with the external `pdftotext` tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdftotextSource;

impl TextSource for PdftotextSource {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let output = Command::new("pdftotext")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProcmetaError::TextConversion("pdftotext is not installed".to_string())
                } else {
                    ProcmetaError::TextConversion(format!("failed to run pdftotext: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                "pdftotext failed without stderr output".to_string()
            } else {
                format!("pdftotext failed: {stderr}")
            };
            return Err(ProcmetaError::TextConversion(message));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            ProcmetaError::TextConversion(format!("pdftotext returned non-UTF8 output: {e}"))
        })
    }
}

/// Document identifier of an input file: its file stem.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Input files with the given extension, sorted by path.
pub fn list_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(ProcmetaError::Config(format!(
            "input directory does not exist: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
