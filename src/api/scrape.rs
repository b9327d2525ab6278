use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::AppState;
use crate::error::{ApiError, ApiResult};

const DEFAULT_JOB_LIMIT: i64 = 20;
const MAX_JOB_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct JobParams {
    pub limit: Option<i64>,
}

/// POST /api/scrape/run
pub async fn run(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if !state.runner.start_in_background() {
        return Err(ApiError::Conflict("A scrape is already running".to_string()));
    }

    info!("Manual scrape started");
    Ok(Json(json!({
        "success": true,
        "message": "Scraping job started in background",
    })))
}

/// GET /api/scrape/jobs?limit=
pub async fn jobs(
    State(state): State<AppState>,
    params: Result<Query<JobParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_JOB_LIMIT).clamp(1, MAX_JOB_LIMIT);
    let jobs = state.db.recent_scrape_jobs(limit).await?;

    Ok(Json(json!({
        "success": true,
        "running": state.runner.is_running(),
        "jobs": jobs,
    })))
}
