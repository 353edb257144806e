//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! HTTPステータスへの変換は`UserMgrError::status_code()`に一本化している。
//! クエリパラメーター不備（トランザクション開始前に検出）のみ400、
//! それ以外はすべて500として扱う。

use axum::http::StatusCode;
use thiserror::Error;

/// usermgr error type
#[derive(Debug, Error)]
pub enum UserMgrError {
    /// Required field missing or invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness / foreign key violation reported by the store
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Unexpected store failure
    #[error("Database error: {0}")]
    Store(String),

    /// Required query parameter missing
    #[error("{0} is required")]
    MissingParameter(&'static str),

    /// Query parameter present but malformed
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UserMgrError {
    /// `sqlx::Error`を文脈付きで変換する
    ///
    /// 一意制約・外部キー制約違反は`Constraint`、それ以外は`Store`になる。
    pub fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return Self::Constraint(format!("{}: {}", context, db_err.message()));
            }
        }
        Self::Store(format!("{}: {}", context, err))
    }

    /// Returns a message that is safe to show to API clients.
    ///
    /// Store and internal failures are reduced to a generic text; the full
    /// error is only written to the server log.
    pub fn external_message(&self) -> String {
        match self {
            Self::Store(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
            Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Constraint(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias
pub type UserMgrResult<T> = Result<T, UserMgrError>;
