//! # ragstack CLI (`rags`)
//!
//! Provisions and operates a pgvector-backed document chunk store.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rags setup` | Bootstrap the local environment (.env, docs/, ingest.json) |
//! | `rags init` | Apply the database schema (extensions, table, indexes) |
//! | `rags status` | Verify the schema and summarize stored chunks |
//! | `rags ingest` | Load documents from the docs directory into chunks |
//! | `rags search "<query>"` | Search stored chunks |
//! | `rags get <id>` | Print a chunk by UUID or a document by doc_id |
//! | `rags serve` | Start the HTTP health/search server |
//!
//! Database-touching commands read `DATABASE_URL` from the environment;
//! `.env` in the working directory is loaded first.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ragstack::{config, db, get, ingest, migrate, search, server, setup, status};

/// ragstack — provisioning and search tooling for a pgvector-backed
/// document chunk store.
#[derive(Parser)]
#[command(
    name = "rags",
    about = "Provision, fill, and search a pgvector-backed document chunk store",
    version
)]
struct Cli {
    /// Path to the ingest configuration file (JSON).
    ///
    /// Written by `rags setup`, read by `rags ingest`.
    #[arg(long, global = true, default_value = "ingest.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the local environment.
    ///
    /// Checks that Docker and Docker Compose are available, writes `.env`
    /// with placeholder credentials (asking first), and creates the docs
    /// directory and a default ingest configuration. Never overwrites an
    /// existing file; running it again is safe.
    Setup,

    /// Apply the database schema.
    ///
    /// Enables the `vector` and `pg_trgm` extensions and creates the
    /// `rag_chunks` table with its ANN and trigram indexes. Idempotent.
    Init,

    /// Verify the schema and summarize the store.
    ///
    /// Reports extension, table, and index presence, chunk counts,
    /// embedding coverage, and a per-document breakdown.
    Status,

    /// Ingest documents into the chunk store.
    ///
    /// Processes the documents listed in the ingest configuration plus
    /// any PDF/Markdown/text files discovered in the docs directory.
    /// Re-ingesting a document replaces its chunks.
    Ingest {
        /// Only ingest the document with this doc_id.
        #[arg(long)]
        doc: Option<String>,

        /// Show per-document chunk counts without writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of documents to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search stored chunks.
    ///
    /// `text` mode (default) uses trigram matching. `vector` mode ranks
    /// by cosine similarity against a query vector read with
    /// `--vector-file` (a JSON array of 1536 numbers).
    Search {
        /// The search query string.
        query: String,

        /// Search mode: `text` (trigram) or `vector` (cosine KNN).
        #[arg(long, default_value = "text")]
        mode: String,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<i64>,

        /// Restrict results to this locale (rows without a locale always match).
        #[arg(long)]
        locale: Option<String>,

        /// JSON file holding the query vector (vector mode only).
        #[arg(long)]
        vector_file: Option<PathBuf>,
    },

    /// Print a chunk by UUID, or all chunks of a doc_id.
    Get {
        /// Chunk UUID or document identifier.
        id: String,
    },

    /// Start the HTTP server (health check and text search).
    ///
    /// Binds 0.0.0.0 on `PORT` (default 8000) with CORS restricted to
    /// `ALLOWED_ORIGINS`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup runs before any environment exists; everything else needs it.
    if let Commands::Setup = cli.command {
        return setup::run_setup(&cli.config);
    }

    dotenv::dotenv().ok();
    let env = config::load_env()?;

    match cli.command {
        Commands::Setup => {
            // Handled above (before environment loading)
            unreachable!()
        }
        Commands::Init => {
            let pool = db::connect(&env.database_url).await?;
            migrate::run_migrations(&pool).await?;
            println!("Database initialized successfully.");
        }
        Commands::Status => {
            status::run_status(&env).await?;
        }
        Commands::Ingest {
            doc,
            dry_run,
            limit,
        } => {
            ingest::run_ingest(&env, &cli.config, doc, dry_run, limit).await?;
        }
        Commands::Search {
            query,
            mode,
            limit,
            locale,
            vector_file,
        } => {
            search::run_search(&env, &query, &mode, limit, locale, vector_file).await?;
        }
        Commands::Get { id } => {
            get::run_get(&env, &id).await?;
        }
        Commands::Serve => {
            server::run_server(&env).await?;
        }
    }

    Ok(())
}
