use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use procmeta_core::{
    AppConfig, CachedTextSource, Field, Index, IssueLog, PdftotextSource, ReviewDirs, TextSource,
    document_id, list_inputs, list_record_ids, load_index, load_record_with_patch, save_record,
    write_review,
};
use procmeta_extract::{ExtractError, Extractor, Taxonomy, validate_record};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "procmeta",
    about = "Proceedings metadata extraction and concept resolution",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file. Defaults to $PROCMETA_CONFIG, then ~/.config/procmeta/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format. Also enabled by setting PROCMETA_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metadata from PDF articles (converted with pdftotext).
    Extract {
        /// Only these document ids (default: every article).
        ids: Vec<String>,
        /// Check page-span classification requirements before saving.
        #[arg(long)]
        validate: bool,
    },

    /// Re-extract metadata from cached raw text, including reviewer edits.
    Update {
        ids: Vec<String>,
        #[arg(long)]
        validate: bool,
    },

    /// Validate stored records (patches applied).
    Validate { ids: Vec<String> },

    /// Print a stored record with its patch applied.
    Show { id: String },

    /// Resolve a concept chain, broadest phrase first.
    Lookup {
        #[arg(required = true)]
        phrases: Vec<String>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Show the effective config.
    Show,
}

// ─── Run Reports ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DocumentReport {
    id: String,
    issues: usize,
    flagged: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aborted: Option<String>,
}

impl DocumentReport {
    fn aborted(id: String, reason: String) -> Self {
        Self {
            id,
            issues: 0,
            flagged: Vec::new(),
            aborted: Some(reason),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    started: DateTime<Utc>,
    finished: DateTime<Utc>,
    processed: usize,
    flagged: usize,
    total_issues: usize,
    aborted: usize,
    documents: Vec<DocumentReport>,
}

impl RunSummary {
    fn new(started: DateTime<Utc>, documents: Vec<DocumentReport>) -> Self {
        let done = documents.iter().filter(|d| d.aborted.is_none());
        Self {
            started,
            finished: Utc::now(),
            processed: done.clone().count(),
            flagged: done.clone().filter(|d| d.issues > 0).count(),
            total_issues: done.map(|d| d.issues).sum(),
            aborted: documents.iter().filter(|d| d.aborted.is_some()).count(),
            documents,
        }
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("PROCMETA_JSON").as_deref() == Ok("1");
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    match cli.command {
        // ── Extraction runs ────────────────────────────────────────────────
        Commands::Extract { ids, validate } => {
            let summary = run_batch(&config, &PdftotextSource, &config.paths.articles, &ids, validate)?;
            report_summary(&summary, json_output, start)?;
        }

        Commands::Update { ids, validate } => {
            let summary = run_batch(&config, &CachedTextSource, &config.paths.raw, &ids, validate)?;
            report_summary(&summary, json_output, start)?;
        }

        // ── Stored records ─────────────────────────────────────────────────
        Commands::Validate { ids } => {
            let ids = if ids.is_empty() {
                list_record_ids(&config.paths.records)?
            } else {
                ids
            };

            let mut results = Vec::new();
            for id in &ids {
                let record = load_record_with_patch(&config.paths.records, &config.paths.patches, id)?;
                let mut issues = IssueLog::new();
                validate_record(&record, config.extraction.max_pages_without_categories, &mut issues);
                results.push((id.clone(), issues));
            }

            let failing = results.iter().filter(|(_, issues)| !issues.is_clean()).count();
            if json_output {
                let items: Vec<serde_json::Value> = results
                    .iter()
                    .map(|(id, issues)| serde_json::json!({"id": id, "issues": issues}))
                    .collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": items, "checked": results.len(), "failing": failing },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                for (id, issues) in &results {
                    for field in issues.flagged_fields() {
                        for message in issues.get(field) {
                            println!("{id}  {field:<14}  {message}");
                        }
                    }
                }
                println!("Checked {} records, {failing} need attention.", results.len());
            }
        }

        Commands::Show { id } => {
            let record = load_record_with_patch(&config.paths.records, &config.paths.patches, &id)?;
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": record,
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }

        // ── Concepts ───────────────────────────────────────────────────────
        Commands::Lookup { phrases } => {
            let taxonomy = Taxonomy::load(&config.paths.taxonomy, None)?;
            let lookup = taxonomy.resolver().lookup(&phrases);

            if json_output {
                print_json(&serde_json::json!({
                    "status": if lookup.is_resolved() { "ok" } else { "not_found" },
                    "data": {
                        "id": lookup.path.as_ref().map(|p| p.dotted_id()),
                        "description": lookup.path.as_ref().map(|p| p.label_chain()),
                        "trace": lookup.trace,
                    },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                match &lookup.path {
                    Some(path) => {
                        println!("{}", path.dotted_id());
                        println!("{}", path.label_chain());
                    }
                    None => {
                        eprintln!("No concept path for: {}", phrases.join(" \u{2192} "));
                        for step in &lookup.trace {
                            eprintln!("  {step}");
                        }
                    }
                }
            }
            if !lookup.is_resolved() {
                std::process::exit(1);
            }
        }

        // ── Config ─────────────────────────────────────────────────────────
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "config already exists at {}; use --force to overwrite",
                        config_path.display()
                    );
                }
                AppConfig::default().save_to(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
            }
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": config,
                        "meta": { "path": config_path, "exists": config_path.exists() }
                    }))?;
                } else {
                    println!("# {}", config_path.display());
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
        },
    }

    Ok(())
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// Extract every input document in parallel. Documents failing with a
/// structural error are skipped and reported; any other error ends the run.
fn run_batch(
    config: &AppConfig,
    source: &dyn TextSource,
    input_dir: &Path,
    only: &[String],
    validate: bool,
) -> Result<RunSummary> {
    let started = Utc::now();
    let index = load_index(&config.paths.index, &config.index.key)
        .with_context(|| format!("loading index {}", config.paths.index.display()))?;
    let taxonomy = Taxonomy::load(&config.paths.taxonomy, config.paths.categories.as_deref())?;
    let extractor = Extractor::new(config, Arc::new(taxonomy))?;
    config.ensure_output_dirs()?;

    let inputs = list_inputs(input_dir, source.extension())?
        .into_iter()
        .filter(|path| only.is_empty() || only.contains(&document_id(path)))
        .collect::<Vec<_>>();
    tracing::info!(documents = inputs.len(), dir = %input_dir.display(), "starting extraction run");

    let dirs = ReviewDirs {
        logs: config.paths.logs.clone(),
        text: config.paths.text.clone(),
    };
    let documents = inputs
        .par_iter()
        .map(|path| process_document(&extractor, &index, source, &dirs, config, path, validate))
        .collect::<std::result::Result<Vec<_>, ExtractError>>()?;

    Ok(RunSummary::new(started, documents))
}

fn process_document(
    extractor: &Extractor,
    index: &Index,
    source: &dyn TextSource,
    dirs: &ReviewDirs,
    config: &AppConfig,
    path: &Path,
    validate: bool,
) -> std::result::Result<DocumentReport, ExtractError> {
    let id = document_id(path);

    let raw = match source.read_text(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(document = %id, error = %err, "unreadable document, skipping");
            return Ok(DocumentReport::aborted(id, err.to_string()));
        }
    };

    let mut extraction = match extractor.extract_indexed(&id, index, &raw) {
        Ok(extraction) => extraction,
        Err(err) if err.is_document_level() => {
            tracing::warn!(document = %id, error = %err, "skipping document");
            return Ok(DocumentReport::aborted(id, err.to_string()));
        }
        Err(err) => return Err(err),
    };

    if validate {
        extractor.validate(&extraction.record, &mut extraction.issues);
    }
    save_record(&config.paths.records, &extraction.record)?;
    let issues = write_review(dirs, &id, &extraction.issues, &extraction.record.text)?;

    Ok(DocumentReport {
        id,
        issues,
        flagged: extraction.issues.flagged_fields(),
        aborted: None,
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("procmeta=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("procmeta=info,warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_summary(summary: &RunSummary, json_output: bool, start: Instant) -> Result<()> {
    if json_output {
        print_json(&serde_json::json!({
            "status": "ok",
            "data": summary,
            "meta": { "duration_ms": start.elapsed().as_millis() }
        }))?;
        return Ok(());
    }

    for doc in &summary.documents {
        match &doc.aborted {
            Some(reason) => println!("✗ {:<24}  aborted: {reason}", doc.id),
            None if doc.issues == 0 => println!("✓ {:<24}  clean", doc.id),
            None => {
                let fields = doc
                    .flagged
                    .iter()
                    .map(Field::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("○ {:<24}  {} issues ({fields})", doc.id, doc.issues);
            }
        }
    }
    println!();
    println!("Run finished {}", summary.finished.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Processed:    {}", summary.processed);
    println!("  Flagged:      {}", summary.flagged);
    println!("  Total issues: {}", summary.total_issues);
    println!("  Aborted:      {}", summary.aborted);
    Ok(())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
