//! Persistence operations over the `rag_chunks` table.
//!
//! Writers come in two flavors: an id-level upsert, and
//! `replace_document`, which swaps out all rows of a document atomically.
//! The schema carries no uniqueness on `(doc_id, chunk_index)`, so
//! re-ingestion goes through `replace_document` to keep chunk indices from
//! accumulating duplicates.
//!
//! Readers cover the two retrieval paths the indexes exist for: cosine KNN
//! over the embedding column and trigram matching over the text column.

use anyhow::Result;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{ChunkRecord, TextMatch, VectorMatch};

/// Insert records, updating content fields in place when an id already
/// exists.
pub async fn upsert_chunks(pool: &PgPool, chunks: &[ChunkRecord]) -> Result<u64> {
    let mut written = 0u64;
    for chunk in chunks {
        sqlx::query(
            r#"
            INSERT INTO rag_chunks
                (id, doc_type, doc_id, title, url, locale, chunk_index, text, embedding, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            ON CONFLICT (id) DO UPDATE
              SET text = EXCLUDED.text,
                  embedding = EXCLUDED.embedding,
                  title = EXCLUDED.title,
                  url = EXCLUDED.url,
                  locale = EXCLUDED.locale,
                  updated_at = now()
            "#,
        )
        .bind(chunk.id)
        .bind(&chunk.doc_type)
        .bind(&chunk.doc_id)
        .bind(&chunk.title)
        .bind(&chunk.url)
        .bind(&chunk.locale)
        .bind(chunk.chunk_index)
        .bind(&chunk.text)
        .bind(&chunk.embedding)
        .execute(pool)
        .await?;
        written += 1;
    }
    Ok(written)
}

/// Replace all rows of `doc_id` with `chunks`, in one transaction.
pub async fn replace_document(pool: &PgPool, doc_id: &str, chunks: &[ChunkRecord]) -> Result<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM rag_chunks WHERE doc_id = $1")
        .bind(doc_id)
        .execute(&mut *tx)
        .await?;

    let mut written = 0u64;
    for chunk in chunks {
        sqlx::query(
            r#"
            INSERT INTO rag_chunks
                (id, doc_type, doc_id, title, url, locale, chunk_index, text, embedding, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            "#,
        )
        .bind(chunk.id)
        .bind(&chunk.doc_type)
        .bind(&chunk.doc_id)
        .bind(&chunk.title)
        .bind(&chunk.url)
        .bind(&chunk.locale)
        .bind(chunk.chunk_index)
        .bind(&chunk.text)
        .bind(&chunk.embedding)
        .execute(&mut *tx)
        .await?;
        written += 1;
    }

    tx.commit().await?;
    Ok(written)
}

/// Fetch a single chunk by primary key.
pub async fn get_chunk(pool: &PgPool, id: Uuid) -> Result<Option<ChunkRecord>> {
    let row = sqlx::query(
        "SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text, embedding, updated_at
         FROM rag_chunks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| chunk_from_row(&r)).transpose()
}

/// All chunks of a document, in position order.
pub async fn document_chunks(pool: &PgPool, doc_id: &str) -> Result<Vec<ChunkRecord>> {
    let rows = sqlx::query(
        "SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text, embedding, updated_at
         FROM rag_chunks WHERE doc_id = $1 ORDER BY chunk_index ASC",
    )
    .bind(doc_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(chunk_from_row).collect()
}

pub async fn count_chunks(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_embedded(pool: &PgPool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks WHERE embedding IS NOT NULL")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Per-document rollup for `rags status`.
#[derive(Debug, Clone)]
pub struct DocStats {
    pub doc_id: String,
    pub doc_type: String,
    pub chunk_count: i64,
    pub embedded_count: i64,
    pub last_updated: DateTime<Utc>,
}

pub async fn document_stats(pool: &PgPool) -> Result<Vec<DocStats>> {
    let rows = sqlx::query(
        r#"
        SELECT
            doc_id,
            doc_type,
            COUNT(*) AS chunk_count,
            COUNT(embedding) AS embedded_count,
            MAX(updated_at) AS last_updated
        FROM rag_chunks
        GROUP BY doc_id, doc_type
        ORDER BY doc_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| DocStats {
            doc_id: row.get("doc_id"),
            doc_type: row.get("doc_type"),
            chunk_count: row.get("chunk_count"),
            embedded_count: row.get("embedded_count"),
            last_updated: row.get("last_updated"),
        })
        .collect())
}

/// Cosine KNN over the embedding column: `1 - (embedding <=> query)` as
/// similarity, closest first. Rows without an embedding never match. A
/// locale filter also admits rows with no locale.
pub async fn nearest(
    pool: &PgPool,
    query: &Vector,
    limit: i64,
    locale: Option<&str>,
) -> Result<Vec<VectorMatch>> {
    let rows = match locale {
        Some(locale) => {
            sqlx::query(
                r#"
                SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text,
                       1 - (embedding <=> $1) AS similarity
                FROM rag_chunks
                WHERE embedding IS NOT NULL
                  AND (locale = $3 OR locale IS NULL)
                ORDER BY embedding <=> $1
                LIMIT $2
                "#,
            )
            .bind(query)
            .bind(limit)
            .bind(locale)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text,
                       1 - (embedding <=> $1) AS similarity
                FROM rag_chunks
                WHERE embedding IS NOT NULL
                ORDER BY embedding <=> $1
                LIMIT $2
                "#,
            )
            .bind(query)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows
        .iter()
        .map(|row| VectorMatch {
            id: row.get("id"),
            doc_type: row.get("doc_type"),
            doc_id: row.get("doc_id"),
            title: row.get("title"),
            url: row.get("url"),
            locale: row.get("locale"),
            chunk_index: row.get("chunk_index"),
            text: row.get("text"),
            similarity: row.get("similarity"),
        })
        .collect())
}

/// Trigram text search. Scores with `word_similarity`, so a short query
/// matching a phrase inside a long chunk still ranks high; the `<%`
/// predicate keeps the GIN trigram index in play.
pub async fn text_search(
    pool: &PgPool,
    query: &str,
    limit: i64,
    locale: Option<&str>,
) -> Result<Vec<TextMatch>> {
    let rows = match locale {
        Some(locale) => {
            sqlx::query(
                r#"
                SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text,
                       word_similarity($1, text) AS score
                FROM rag_chunks
                WHERE $1 <% text
                  AND (locale = $3 OR locale IS NULL)
                ORDER BY score DESC
                LIMIT $2
                "#,
            )
            .bind(query)
            .bind(limit)
            .bind(locale)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, doc_type, doc_id, title, url, locale, chunk_index, text,
                       word_similarity($1, text) AS score
                FROM rag_chunks
                WHERE $1 <% text
                ORDER BY score DESC
                LIMIT $2
                "#,
            )
            .bind(query)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows
        .iter()
        .map(|row| TextMatch {
            id: row.get("id"),
            doc_type: row.get("doc_type"),
            doc_id: row.get("doc_id"),
            title: row.get("title"),
            url: row.get("url"),
            locale: row.get("locale"),
            chunk_index: row.get("chunk_index"),
            text: row.get("text"),
            score: row.get("score"),
        })
        .collect())
}

fn chunk_from_row(row: &PgRow) -> Result<ChunkRecord> {
    Ok(ChunkRecord {
        id: row.get("id"),
        doc_type: row.get("doc_type"),
        doc_id: row.get("doc_id"),
        title: row.get("title"),
        url: row.get("url"),
        locale: row.get("locale"),
        chunk_index: row.get("chunk_index"),
        text: row.get("text"),
        embedding: row.try_get("embedding")?,
        updated_at: row.get("updated_at"),
    })
}
