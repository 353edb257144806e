//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング。ステータスコードは
//! `UserMgrError::status_code()`の対応表だけで決まる。

use crate::common::error::UserMgrError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError {
    context: Option<&'static str>,
    error: UserMgrError,
}

impl AppError {
    /// 操作名（例: "Failed to create user"）付きのエラーを作る
    pub fn new(context: &'static str, error: UserMgrError) -> Self {
        Self {
            context: Some(context),
            error,
        }
    }

    /// 元のエラー
    pub fn error(&self) -> &UserMgrError {
        &self.error
    }

    /// HTTPステータス
    pub fn status(&self) -> StatusCode {
        self.error.status_code()
    }

    /// クライアントに返すメッセージ
    pub fn message(&self) -> String {
        self.with_context(self.error.external_message())
    }

    /// サーバー側のログに残す詳細
    pub fn detail(&self) -> String {
        self.with_context(self.error.to_string())
    }

    fn with_context(&self, message: String) -> String {
        match self.context {
            Some(context) => format!("{}: {}", context, message),
            None => message,
        }
    }
}

impl From<UserMgrError> for AppError {
    fn from(error: UserMgrError) -> Self {
        Self {
            context: None,
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self.detail());
        } else {
            tracing::warn!("{}", self.detail());
        }

        let payload = json!({
            "error": self.message()
        });

        (status, Json(payload)).into_response()
    }
}
