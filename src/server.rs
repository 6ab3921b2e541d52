//! HTTP surface (`rags serve`).
//!
//! The container entry point. Serves a health probe and trigram text
//! search over the chunk store:
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/healthz` | Liveness plus the current chunk count |
//! | `GET` | `/api/search` | Trigram search (`q`, `limit`, `locale`) |
//!
//! Errors follow one shape:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "q must not be empty" } }
//! ```
//!
//! Cross-origin access is restricted to the origins listed in
//! `ALLOWED_ORIGINS`. There is no chat or embedding endpoint; retrieval
//! consumers talk to the store, generation lives elsewhere.

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Env;
use crate::db;
use crate::store;

const SEARCH_DEFAULT_LIMIT: i64 = 5;
const SEARCH_MAX_LIMIT: i64 = 50;

#[derive(Clone)]
struct AppState {
    pool: PgPool,
}

pub async fn run_server(env: &Env) -> Result<()> {
    let pool = db::connect(&env.database_url).await?;

    let mut origins = Vec::new();
    for origin in &env.allowed_origins {
        let value: HeaderValue = origin
            .parse()
            .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: '{}'", origin))?;
        origins.push(value);
    }
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET]);

    let app = Router::new()
        .route("/healthz", get(handle_health))
        .route("/api/search", get(handle_search))
        .layer(cors)
        .with_state(AppState { pool });

    let bind = format!("0.0.0.0:{}", env.port);
    println!("HTTP server listening on http://{}", bind);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    chunks: i64,
}

async fn handle_health(State(state): State<AppState>) -> Result<Json<HealthBody>, AppError> {
    let chunks = store::count_chunks(&state.pool)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(HealthBody {
        status: "ok",
        chunks,
    }))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<i64>,
    locale: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::bad_request("q must not be empty"));
    }

    let limit = params
        .limit
        .unwrap_or(SEARCH_DEFAULT_LIMIT)
        .clamp(1, SEARCH_MAX_LIMIT);

    let matches = store::text_search(&state.pool, &query, limit, params.locale.as_deref())
        .await
        .map_err(AppError::internal)?;

    Ok(Json(matches).into_response())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.to_string(),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: format!("{:#}", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
