//! 操作ログストレージ
//!
//! ログは追記専用。ユーザー操作のトランザクション内で書き込まれるほか、
//! 失敗時にはエンドポイント層からトランザクション外で`ERROR`が記録される。

use crate::common::error::{UserMgrError, UserMgrResult};
use crate::common::types::{LogAction, LogEntry};
use sqlx::{Executor, Sqlite, SqlitePool};

/// ログを1行追加する
///
/// プールでもトランザクション内の接続でも受け付ける。
pub(crate) async fn insert<'e, E>(
    executor: E,
    action: LogAction,
    details: &str,
    user_id: Option<i64>,
) -> UserMgrResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO logs (action, details, user_id) VALUES (?, ?, ?)")
        .bind(action.as_str())
        .bind(details)
        .bind(user_id)
        .execute(executor)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to write log", e))?;
    Ok(())
}

/// 操作ログストレージ
#[derive(Debug, Clone)]
pub struct LogStorage {
    pool: SqlitePool,
}

impl LogStorage {
    /// 新しいLogStorageを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 新しい順にログを取得
    ///
    /// # Arguments
    /// * `limit` - 取得件数の上限
    pub async fn recent(&self, limit: i64) -> UserMgrResult<Vec<LogEntry>> {
        sqlx::query_as::<_, LogEntry>(
            "SELECT id, action, details, user_id, created_at FROM logs
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to fetch logs", e))
    }

    /// 失敗をトランザクション外で記録する
    pub async fn record_failure(&self, details: &str) -> UserMgrResult<()> {
        insert(&self.pool, LogAction::Error, details, None).await
    }
}
