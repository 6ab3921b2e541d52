use anyhow::{Context, Result};
use sqlx::PgPool;

/// Dimensionality of the embedding column. Matches the
/// `text-embedding-3-small` output size the deployment assumes.
pub const EMBEDDING_DIMS: usize = 1536;

/// Apply the schema. Every statement is guarded, so running this any
/// number of times leaves exactly one table and two indexes.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    // Extensions first: the table depends on the vector type, the text
    // index on trigram operators.
    sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(pool)
        .await
        .context("Could not enable the vector extension. Is pgvector installed on the server?")?;

    sqlx::query("CREATE EXTENSION IF NOT EXISTS pg_trgm")
        .execute(pool)
        .await
        .context("Could not enable the pg_trgm extension")?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS rag_chunks (
            id          UUID PRIMARY KEY,
            doc_type    TEXT NOT NULL,
            doc_id      TEXT NOT NULL,
            title       TEXT,
            url         TEXT,
            locale      TEXT,
            chunk_index INTEGER NOT NULL,
            text        TEXT NOT NULL,
            embedding   vector({EMBEDDING_DIMS}),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
    ))
    .execute(pool)
    .await?;

    // Approximate-nearest-neighbor index over embeddings, cosine distance.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS rag_chunks_embedding_idx
        ON rag_chunks USING ivfflat (embedding vector_cosine_ops)
        WITH (lists = 100)
        "#,
    )
    .execute(pool)
    .await?;

    // Trigram index for fuzzy/substring text search.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS rag_chunks_text_trgm_idx
        ON rag_chunks USING gin (text gin_trgm_ops)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
