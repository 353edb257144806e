//! Repository traitパターン定義
//!
//! エンドポイント層はこのtrait越しにストレージへアクセスする。
//! 起動時に構築したストレージを`AppState`へ注入し、テストでは差し替える。

use async_trait::async_trait;

use crate::common::error::UserMgrResult;
use crate::common::types::{
    ListUsersOptions, LogEntry, NewUser, UserChanges, UserListItem, UserWithProfile,
};

use super::logs::LogStorage;
use super::users::UserStorage;

// ---------------------------------------------------------------------------
// UserAggregateRepository
// ---------------------------------------------------------------------------

/// ユーザー集約のライフサイクル操作
#[async_trait]
pub trait UserAggregateRepository: Send + Sync {
    /// ユーザーとプロフィールを作成
    async fn create_user(&self, input: &NewUser) -> UserMgrResult<UserWithProfile>;
    /// ユーザー一覧を取得
    async fn list_users(&self, options: &ListUsersOptions) -> UserMgrResult<Vec<UserListItem>>;
    /// ユーザーを更新
    async fn update_user(&self, id: i64, changes: &UserChanges) -> UserMgrResult<UserWithProfile>;
    /// ユーザーを削除
    async fn delete_user(&self, id: i64) -> UserMgrResult<UserWithProfile>;
}

#[async_trait]
impl UserAggregateRepository for UserStorage {
    async fn create_user(&self, input: &NewUser) -> UserMgrResult<UserWithProfile> {
        self.create(input).await
    }

    async fn list_users(&self, options: &ListUsersOptions) -> UserMgrResult<Vec<UserListItem>> {
        self.list(options).await
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> UserMgrResult<UserWithProfile> {
        self.update(id, changes).await
    }

    async fn delete_user(&self, id: i64) -> UserMgrResult<UserWithProfile> {
        self.delete(id).await
    }
}

// ---------------------------------------------------------------------------
// AuditLogRepository
// ---------------------------------------------------------------------------

/// 操作ログの参照と失敗記録
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// 新しい順にログを取得
    async fn recent_logs(&self, limit: i64) -> UserMgrResult<Vec<LogEntry>>;
    /// 失敗をトランザクション外で記録
    async fn record_failure(&self, details: &str) -> UserMgrResult<()>;
}

#[async_trait]
impl AuditLogRepository for LogStorage {
    async fn recent_logs(&self, limit: i64) -> UserMgrResult<Vec<LogEntry>> {
        self.recent(limit).await
    }

    async fn record_failure(&self, details: &str) -> UserMgrResult<()> {
        LogStorage::record_failure(self, details).await
    }
}
