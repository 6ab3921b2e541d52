//! Chunk and document retrieval (`rags get`).
//!
//! A UUID argument fetches one chunk by primary key; anything else is
//! treated as a `doc_id` and prints the document's chunks in position
//! order.

use anyhow::Result;
use uuid::Uuid;

use crate::config::Env;
use crate::db;
use crate::models::ChunkRecord;
use crate::store;

pub async fn run_get(env: &Env, id: &str) -> Result<()> {
    let pool = db::connect(&env.database_url).await?;

    if let Ok(uuid) = Uuid::parse_str(id) {
        match store::get_chunk(&pool, uuid).await? {
            Some(chunk) => print_chunk(&chunk),
            None => {
                eprintln!("Error: chunk not found: {}", id);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let chunks = store::document_chunks(&pool, id).await?;
    if chunks.is_empty() {
        eprintln!("Error: no chunks for doc_id: {}", id);
        std::process::exit(1);
    }

    let first = &chunks[0];
    println!("--- Document ---");
    println!("doc_id:      {}", first.doc_id);
    println!("doc_type:    {}", first.doc_type);
    println!(
        "title:       {}",
        first.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(ref url) = first.url {
        println!("url:         {}", url);
    }
    if let Some(ref locale) = first.locale {
        println!("locale:      {}", locale);
    }
    println!();

    println!("--- Chunks ({}) ---", chunks.len());
    for chunk in &chunks {
        println!("[chunk {}]  {}", chunk.chunk_index, chunk.id);
        println!("{}", chunk.text);
        println!();
    }

    Ok(())
}

fn print_chunk(chunk: &ChunkRecord) {
    println!("--- Chunk ---");
    println!("id:          {}", chunk.id);
    println!("doc_id:      {}", chunk.doc_id);
    println!("doc_type:    {}", chunk.doc_type);
    println!(
        "title:       {}",
        chunk.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(ref url) = chunk.url {
        println!("url:         {}", url);
    }
    if let Some(ref locale) = chunk.locale {
        println!("locale:      {}", locale);
    }
    println!("chunk_index: {}", chunk.chunk_index);
    println!(
        "embedding:   {}",
        match &chunk.embedding {
            Some(v) => format!("{} dims", v.as_slice().len()),
            None => "none".to_string(),
        }
    );
    println!(
        "updated_at:  {}",
        chunk.updated_at.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!();
    println!("--- Text ---");
    println!("{}", chunk.text);
}
