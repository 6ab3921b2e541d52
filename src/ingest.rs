//! Document ingestion (`rags ingest`).
//!
//! Reads the ingest configuration, adds any undeclared files found in the
//! docs directory, then extracts, cleans, chunks, and stores each document.
//! A document's rows are replaced wholesale on re-ingestion, so chunk
//! indices stay contiguous and duplicate-free without a uniqueness
//! constraint in the schema.
//!
//! Embeddings are never computed here. Rows are written with a NULL
//! embedding and an external process backfills vectors; `rags status`
//! shows the coverage.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::chunk::{chunk_text, clean_text};
use crate::config::{load_ingest_config, DocumentSpec, Env, IngestConfig};
use crate::db;
use crate::extract::{extract_text, DISCOVER_GLOBS};
use crate::models::ChunkRecord;
use crate::store;

pub async fn run_ingest(
    env: &Env,
    config_path: &Path,
    doc_filter: Option<String>,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<()> {
    let config = load_ingest_config(config_path)?;

    let mut specs = config.documents.clone();
    let discovered = discover_documents(&config, &specs)?;
    specs.extend(discovered);

    if let Some(ref wanted) = doc_filter {
        specs.retain(|spec| &spec.doc_id == wanted);
        if specs.is_empty() {
            bail!("No document with doc_id '{}' in {}", wanted, config_path.display());
        }
    }

    if let Some(lim) = limit {
        specs.truncate(lim);
    }

    if specs.is_empty() {
        println!(
            "Nothing to ingest: no documents configured and none found in {}/.",
            config.settings.docs_dir.display()
        );
        return Ok(());
    }

    if dry_run {
        println!("ingest (dry-run)");
        for spec in &specs {
            match prepare_document(&config, spec) {
                Ok(records) => println!("  {}: {} chunks", spec.doc_id, records.len()),
                Err(e) => println!("  {}: error: {:#}", spec.doc_id, e),
            }
        }
        return Ok(());
    }

    let pool = db::connect(&env.database_url).await?;
    let show_progress = atty::is(atty::Stream::Stderr);

    let mut docs_ok = 0u64;
    let mut chunks_written = 0u64;
    let mut failures = 0u64;

    for spec in &specs {
        let result = match prepare_document(&config, spec) {
            Ok(records) => store::replace_document(&pool, &spec.doc_id, &records).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(written) => {
                if show_progress {
                    eprintln!("ingest {}  {} chunks", spec.doc_id, written);
                }
                docs_ok += 1;
                chunks_written += written;
            }
            Err(e) => {
                eprintln!("Warning: skipping {}: {:#}", spec.doc_id, e);
                failures += 1;
            }
        }
    }

    println!("ingest complete");
    println!("  documents processed: {}", docs_ok);
    println!("  chunks written: {}", chunks_written);
    println!("  failures: {}", failures);

    if docs_ok == 0 {
        bail!("no documents were ingested successfully");
    }
    Ok(())
}

/// Extract, clean, and chunk one document into insertable records.
fn prepare_document(config: &IngestConfig, spec: &DocumentSpec) -> Result<Vec<ChunkRecord>> {
    let path = spec.resolve_path(&config.settings);
    let text = clean_text(&extract_text(&path, spec.use_ocr)?);

    let max_chars = spec.effective_max_chars(&config.settings);
    let overlap = spec.effective_overlap(&config.settings);
    let locale = spec.effective_locale(&config.settings);

    let records = chunk_text(&text, max_chars, overlap)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            ChunkRecord::new(
                &spec.doc_type,
                &spec.doc_id,
                spec.title.clone(),
                spec.url.clone(),
                Some(locale.clone()),
                i as i32,
                piece,
            )
        })
        .collect::<Vec<_>>();

    if records.is_empty() {
        bail!("{} produced no text", path.display());
    }
    Ok(records)
}

/// Find ingestible files in the docs directory that no configured
/// descriptor covers, and synthesize descriptors for them with the
/// settings defaults.
fn discover_documents(
    config: &IngestConfig,
    configured: &[DocumentSpec],
) -> Result<Vec<DocumentSpec>> {
    let docs_dir = &config.settings.docs_dir;
    if !docs_dir.exists() {
        return Ok(Vec::new());
    }

    let include = build_globset(DISCOVER_GLOBS)?;

    let known_paths: HashSet<PathBuf> = configured
        .iter()
        .map(|spec| spec.resolve_path(&config.settings))
        .collect();
    let known_names: HashSet<String> = configured
        .iter()
        .filter_map(|spec| {
            Path::new(&spec.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
        .collect();

    let mut discovered = Vec::new();
    for entry in WalkDir::new(docs_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };
        if !include.is_match(&name) {
            continue;
        }
        if known_paths.contains(path) || known_names.contains(&name) {
            continue;
        }

        let is_pdf = name.to_ascii_lowercase().ends_with(".pdf");
        let relative = path.strip_prefix(docs_dir).unwrap_or(path);
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| name.clone());

        discovered.push(DocumentSpec {
            path: relative.to_string_lossy().to_string(),
            doc_type: if is_pdf { "pdf" } else { "document" }.to_string(),
            doc_id: name.clone(),
            title: Some(title),
            locale: None,
            url: Some(format!("file://{}", path.display())),
            use_ocr: false,
            max_chars: None,
            overlap: None,
        });
    }

    // Sort for deterministic ordering across runs.
    discovered.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
    Ok(discovered)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn config_with_docs_dir(dir: &Path) -> IngestConfig {
        IngestConfig {
            documents: Vec::new(),
            settings: Settings {
                docs_dir: dir.to_path_buf(),
                ..Settings::default()
            },
        }
    }

    #[test]
    fn discovery_finds_supported_files_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("guide.md"), "content").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "content").unwrap();
        std::fs::write(tmp.path().join("image.png"), "binary").unwrap();

        let config = config_with_docs_dir(tmp.path());
        let specs = discover_documents(&config, &[]).unwrap();

        let ids: Vec<&str> = specs.iter().map(|s| s.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["guide.md", "notes.txt"]);
        assert!(specs.iter().all(|s| s.doc_type == "document"));
    }

    #[test]
    fn discovery_skips_configured_documents() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("kb.md"), "content").unwrap();
        std::fs::write(tmp.path().join("extra.md"), "content").unwrap();

        let mut config = config_with_docs_dir(tmp.path());
        config.documents.push(DocumentSpec {
            path: "kb.md".to_string(),
            doc_type: "kb".to_string(),
            doc_id: "kb_v1".to_string(),
            title: None,
            locale: None,
            url: None,
            use_ocr: false,
            max_chars: None,
            overlap: None,
        });

        let specs = discover_documents(&config, &config.documents).unwrap();
        let ids: Vec<&str> = specs.iter().map(|s| s.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["extra.md"]);
    }

    #[test]
    fn missing_docs_dir_discovers_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_with_docs_dir(&tmp.path().join("absent"));
        assert!(discover_documents(&config, &[]).unwrap().is_empty());
    }

    #[test]
    fn prepare_document_chunks_and_indexes() {
        let tmp = tempfile::tempdir().unwrap();
        let long_line = "This is a longer line of real document content. ".repeat(40);
        std::fs::write(tmp.path().join("kb.md"), &long_line).unwrap();

        let mut config = config_with_docs_dir(tmp.path());
        config.settings.default_max_chars = 200;
        config.settings.default_overlap = 40;

        let spec = DocumentSpec {
            path: "kb.md".to_string(),
            doc_type: "kb".to_string(),
            doc_id: "kb_v1".to_string(),
            title: Some("KB".to_string()),
            locale: None,
            url: None,
            use_ocr: false,
            max_chars: None,
            overlap: None,
        };

        let records = prepare_document(&config, &spec).unwrap();
        assert!(records.len() > 1);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.chunk_index, i as i32);
            assert_eq!(record.doc_id, "kb_v1");
            assert_eq!(record.locale.as_deref(), Some("es"));
            assert!(record.embedding.is_none());
        }
    }

    #[test]
    fn prepare_document_rejects_empty_text() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("empty.md"), "  \n \n").unwrap();

        let config = config_with_docs_dir(tmp.path());
        let spec = DocumentSpec {
            path: "empty.md".to_string(),
            doc_type: "document".to_string(),
            doc_id: "empty.md".to_string(),
            title: None,
            locale: None,
            url: None,
            use_ocr: false,
            max_chars: None,
            overlap: None,
        };

        assert!(prepare_document(&config, &spec).is_err());
    }
}
