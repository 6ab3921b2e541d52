//! CLI search (`rags search`).
//!
//! Two modes, one per index: `text` runs trigram matching against the
//! chunk text, `vector` runs cosine KNN against the embedding column with
//! a query vector read from a JSON file. Query embedding is not computed
//! here; vectors come from whatever external process produced the stored
//! embeddings.

use anyhow::{bail, Context, Result};
use pgvector::Vector;
use std::path::{Path, PathBuf};

use crate::config::Env;
use crate::db;
use crate::migrate::EMBEDDING_DIMS;
use crate::store;

const DEFAULT_LIMIT: i64 = 5;

pub async fn run_search(
    env: &Env,
    query: &str,
    mode: &str,
    limit: Option<i64>,
    locale: Option<String>,
    vector_file: Option<PathBuf>,
) -> Result<()> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if limit < 1 {
        bail!("--limit must be >= 1");
    }

    match mode {
        "text" => {
            if query.trim().is_empty() {
                println!("No results.");
                return Ok(());
            }
            let pool = db::connect(&env.database_url).await?;
            let matches = store::text_search(&pool, query, limit, locale.as_deref()).await?;
            if matches.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, m) in matches.iter().enumerate() {
                println!(
                    "{}. [{:.3}] {} ({} #{})",
                    i + 1,
                    m.score,
                    m.title.as_deref().unwrap_or("(untitled)"),
                    m.doc_id,
                    m.chunk_index
                );
                if let Some(ref url) = m.url {
                    println!("   url: {}", url);
                }
                println!("   {}", snippet(&m.text));
            }
        }
        "vector" => {
            let path = vector_file
                .ok_or_else(|| anyhow::anyhow!("mode 'vector' requires --vector-file"))?;
            let vector = read_vector_file(&path)?;

            let pool = db::connect(&env.database_url).await?;
            let matches = store::nearest(&pool, &vector, limit, locale.as_deref()).await?;
            if matches.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, m) in matches.iter().enumerate() {
                println!(
                    "{}. [{:.4}] {} ({} #{})",
                    i + 1,
                    m.similarity,
                    m.title.as_deref().unwrap_or("(untitled)"),
                    m.doc_id,
                    m.chunk_index
                );
                if let Some(ref url) = m.url {
                    println!("   url: {}", url);
                }
                println!("   {}", snippet(&m.text));
            }
        }
        _ => bail!("Unknown search mode: '{}'. Use text or vector.", mode),
    }

    Ok(())
}

/// Parse a query vector from a JSON array file and check its dimensions.
fn read_vector_file(path: &Path) -> Result<Vector> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read vector file: {}", path.display()))?;
    let values: Vec<f32> = serde_json::from_str(&content)
        .with_context(|| format!("Vector file is not a JSON array of numbers: {}", path.display()))?;

    if values.len() != EMBEDDING_DIMS {
        bail!(
            "Query vector has {} dimensions, expected {}",
            values.len(),
            EMBEDDING_DIMS
        );
    }
    Ok(Vector::from(values))
}

/// First 160 characters of the chunk text, on a char boundary.
fn snippet(text: &str) -> String {
    let mut s: String = text.chars().take(160).collect();
    if s.chars().count() < text.chars().count() {
        s.push_str("...");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_file_dimension_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vec.json");
        std::fs::write(&path, "[0.1, 0.2, 0.3]").unwrap();

        let err = read_vector_file(&path).unwrap_err();
        assert!(err.to_string().contains("1536"));
    }

    #[test]
    fn vector_file_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vec.json");
        let values: Vec<f32> = (0..EMBEDDING_DIMS).map(|i| i as f32 / 1536.0).collect();
        std::fs::write(&path, serde_json::to_string(&values).unwrap()).unwrap();

        let vector = read_vector_file(&path).unwrap();
        assert_eq!(vector.as_slice().len(), EMBEDDING_DIMS);
    }

    #[test]
    fn snippet_truncates_long_text() {
        let text = "x".repeat(500);
        let s = snippet(&text);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 163);
    }
}
