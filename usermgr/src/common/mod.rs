//! 共通モジュール

/// エラー型
pub mod error;

/// ドメイン型
pub mod types;
