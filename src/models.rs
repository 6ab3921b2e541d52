//! Core data types for the chunk store.
//!
//! These mirror the `rag_chunks` table one-to-one: a chunk is a contiguous
//! slice of a source document's text, addressed by a UUID and positioned by
//! `(doc_id, chunk_index)`, optionally carrying a 1536-dimension embedding.

use chrono::{DateTime, Utc};
use pgvector::Vector;
use uuid::Uuid;

/// One row of `rag_chunks`.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: Uuid,
    /// Document classification (e.g. `kb`, `guide`, `pdf`, `document`).
    pub doc_type: String,
    /// Identifier of the source document this chunk belongs to.
    pub doc_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub locale: Option<String>,
    /// Zero-based position of the chunk within its source document.
    pub chunk_index: i32,
    pub text: String,
    /// Semantic embedding of `text`. NULL until an external process
    /// backfills it; the store never computes embeddings itself.
    pub embedding: Option<Vector>,
    pub updated_at: DateTime<Utc>,
}

impl ChunkRecord {
    /// Build a fresh record for ingestion: new v4 id, no embedding,
    /// `updated_at` stamped now.
    pub fn new(
        doc_type: &str,
        doc_id: &str,
        title: Option<String>,
        url: Option<String>,
        locale: Option<String>,
        chunk_index: i32,
        text: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            doc_type: doc_type.to_string(),
            doc_id: doc_id.to_string(),
            title,
            url,
            locale,
            chunk_index,
            text,
            embedding: None,
            updated_at: Utc::now(),
        }
    }
}

/// A trigram text-search match.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TextMatch {
    pub id: Uuid,
    pub doc_type: String,
    pub doc_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub locale: Option<String>,
    pub chunk_index: i32,
    pub text: String,
    /// Trigram similarity in [0, 1], higher is closer.
    pub score: f32,
}

/// A vector-similarity match.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VectorMatch {
    pub id: Uuid,
    pub doc_type: String,
    pub doc_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub locale: Option<String>,
    pub chunk_index: i32,
    pub text: String,
    /// Cosine similarity, `1 - (embedding <=> query)`.
    pub similarity: f64,
}
