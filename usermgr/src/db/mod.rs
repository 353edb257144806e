//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// ユーザー集約のトランザクション管理
pub mod users;

/// 操作ログ
pub mod logs;

/// データベースマイグレーション
pub mod migrations;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;
