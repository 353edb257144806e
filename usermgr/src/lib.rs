//! usermgr Server
//!
//! ユーザーとプロフィールのCRUD、および操作ログ閲覧を提供するJSON APIサーバー

#![warn(missing_docs)]

use std::sync::Arc;

/// 共通型定義
pub mod common;

/// REST APIハンドラー
pub mod api;

/// データベースアクセス
pub mod db;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// axumサーバー起動
pub mod server;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// ユーザー集約リポジトリ
    pub users: Arc<dyn db::traits::UserAggregateRepository>,
    /// 操作ログリポジトリ
    pub logs: Arc<dyn db::traits::AuditLogRepository>,
}

impl AppState {
    /// 接続プールからSQLite実装のストレージを構築する
    pub fn new(db_pool: sqlx::SqlitePool) -> Self {
        Self {
            users: Arc::new(db::users::UserStorage::new(db_pool.clone())),
            logs: Arc::new(db::logs::LogStorage::new(db_pool.clone())),
            db_pool,
        }
    }
}
