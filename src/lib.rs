//! # ragstack
//!
//! Provisioning, ingestion, and search tooling for a pgvector-backed
//! document chunk store.
//!
//! The store is a single Postgres table, `rag_chunks`, holding document
//! chunks with an optional 1536-dimension embedding, indexed for both
//! approximate-nearest-neighbor search (ivfflat, cosine) and trigram text
//! search (pg_trgm). The `rags` CLI provisions the local environment and
//! the schema, loads documents into chunks, and exposes the two retrieval
//! paths. Embedding vectors are supplied by external processes; this crate
//! stores and queries them but never computes them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌─────────────────┐
//! │  docs/   │──▶│ extract+chunk │──▶│    Postgres      │
//! │ pdf/md/  │   │   (ingest)    │   │ rag_chunks       │
//! │   txt    │   └───────────────┘   │ ivfflat + trgm   │
//! └──────────┘                       └────────┬────────┘
//!                                             │
//!                          ┌──────────────────┤
//!                          ▼                  ▼
//!                     ┌─────────┐       ┌──────────┐
//!                     │   CLI   │       │   HTTP   │
//!                     │ (rags)  │       │ (serve)  │
//!                     └─────────┘       └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Environment settings and the JSON ingest configuration |
//! | [`setup`] | Local environment bootstrap |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migration |
//! | [`models`] | Core data types |
//! | [`store`] | Chunk persistence and retrieval queries |
//! | [`chunk`] | Character-window text chunking |
//! | [`extract`] | PDF/Markdown/text extraction |
//! | [`ingest`] | Document ingestion pipeline |
//! | [`status`] | Schema verification and store summary |
//! | [`search`] | CLI search over both indexes |
//! | [`get`] | Chunk and document retrieval |
//! | [`server`] | HTTP health and search endpoints |

pub mod chunk;
pub mod config;
pub mod db;
pub mod extract;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod setup;
pub mod status;
pub mod store;
