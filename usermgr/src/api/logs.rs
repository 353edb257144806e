//! 操作ログ閲覧API
//!
//! `GET /api/logs` を提供する。

use super::error::AppError;
use crate::common::types::LogEntry;
use crate::AppState;
use axum::{extract::State, Json};

/// 一度に返すログ件数
pub const RECENT_LOG_LIMIT: i64 = 100;

/// GET /api/logs - 最新100件のログを新しい順に返す
pub async fn get_logs(State(state): State<AppState>) -> Result<Json<Vec<LogEntry>>, AppError> {
    let logs = state
        .logs
        .recent_logs(RECENT_LOG_LIMIT)
        .await
        .map_err(|e| AppError::new("Failed to fetch logs", e))?;
    Ok(Json(logs))
}
