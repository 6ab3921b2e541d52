use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings sourced from the process environment (`.env` is loaded into it
/// at startup). Only the keys the tool itself consumes appear here; the
/// bootstrap writes a few more (provider and storefront credentials) for
/// the surrounding deployment.
#[derive(Debug, Clone)]
pub struct Env {
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    #[allow(dead_code)]
    pub embed_model: String,
}

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:8000";

/// Read the environment after `dotenv` has populated it.
///
/// `DATABASE_URL` is mandatory for every database-touching command; the
/// rest fall back to local-development defaults.
pub fn load_env() -> Result<Env> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL is not set. Run `rags setup` or export it manually.")?;

    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let port = match std::env::var("PORT") {
        Ok(p) => p
            .parse::<u16>()
            .with_context(|| format!("PORT is not a valid port number: '{}'", p))?,
        Err(_) => DEFAULT_PORT,
    };

    let embed_model =
        std::env::var("EMBED_MODEL").unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string());

    Ok(Env {
        database_url,
        allowed_origins,
        port,
        embed_model,
    })
}

/// Ingestion configuration (`ingest.json`): a list of document descriptors
/// plus shared defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub documents: Vec<DocumentSpec>,
    #[serde(default)]
    pub settings: Settings,
}

/// One document to ingest. Paths are resolved relative to the docs
/// directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub path: String,
    pub doc_type: String,
    pub doc_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Accepted for compatibility with the deployment config; PDF text
    /// extraction is always text-layer, never OCR.
    #[serde(default)]
    pub use_ocr: bool,
    #[serde(default)]
    pub max_chars: Option<usize>,
    #[serde(default)]
    pub overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    #[serde(default = "default_max_chars")]
    pub default_max_chars: usize,
    #[serde(default = "default_overlap")]
    pub default_overlap: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            embed_model: default_embed_model(),
            docs_dir: default_docs_dir(),
            default_locale: default_locale(),
            default_max_chars: default_max_chars(),
            default_overlap: default_overlap(),
        }
    }
}

fn default_batch_size() -> usize {
    80
}
fn default_embed_model() -> String {
    DEFAULT_EMBED_MODEL.to_string()
}
fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_locale() -> String {
    "es".to_string()
}
fn default_max_chars() -> usize {
    1200
}
fn default_overlap() -> usize {
    150
}

impl DocumentSpec {
    pub fn effective_max_chars(&self, settings: &Settings) -> usize {
        self.max_chars.unwrap_or(settings.default_max_chars)
    }

    pub fn effective_overlap(&self, settings: &Settings) -> usize {
        self.overlap.unwrap_or(settings.default_overlap)
    }

    pub fn effective_locale(&self, settings: &Settings) -> String {
        self.locale
            .clone()
            .unwrap_or_else(|| settings.default_locale.clone())
    }

    /// Resolve the document's file path against the docs directory.
    pub fn resolve_path(&self, settings: &Settings) -> PathBuf {
        let p = Path::new(&self.path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            settings.docs_dir.join(p)
        }
    }
}

pub fn load_ingest_config(path: &Path) -> Result<IngestConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingest config: {}", path.display()))?;

    let config: IngestConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse ingest config: {}", path.display()))?;

    if config.settings.batch_size == 0 {
        anyhow::bail!("settings.batch_size must be > 0");
    }
    if config.settings.default_max_chars == 0 {
        anyhow::bail!("settings.default_max_chars must be > 0");
    }
    if config.settings.default_overlap >= config.settings.default_max_chars {
        anyhow::bail!("settings.default_overlap must be smaller than default_max_chars");
    }

    for doc in &config.documents {
        if doc.doc_id.trim().is_empty() {
            anyhow::bail!("document '{}' has an empty doc_id", doc.path);
        }
        if doc.doc_type.trim().is_empty() {
            anyhow::bail!("document '{}' has an empty doc_type", doc.doc_id);
        }
        let max_chars = doc.effective_max_chars(&config.settings);
        if max_chars == 0 {
            anyhow::bail!("document '{}': max_chars must be > 0", doc.doc_id);
        }
        if doc.effective_overlap(&config.settings) >= max_chars {
            anyhow::bail!(
                "document '{}': overlap must be smaller than max_chars",
                doc.doc_id
            );
        }
    }

    Ok(config)
}
