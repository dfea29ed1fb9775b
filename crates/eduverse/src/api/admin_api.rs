//! Health and storage statistics
use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::shared_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub chat_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct DbStatsResponse {
    pub tables: Vec<TableCount>,
    pub total_rows: i64,
    pub database_size_bytes: i64,
}

#[derive(Debug, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

/// GET /healthz
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        chat_configured: state.llm.is_configured(),
    })
}

/// GET /admin/stats
pub async fn db_stats(State(state): State<AppState>) -> Result<Json<DbStatsResponse>> {
    let stats = state.db.stats()?;
    let tables: Vec<TableCount> = stats
        .tables
        .into_iter()
        .map(|(table, rows)| TableCount { table, rows })
        .collect();
    Ok(Json(DbStatsResponse {
        total_rows: tables.iter().map(|t| t.rows).sum(),
        tables,
        database_size_bytes: stats.database_size_bytes,
    }))
}
