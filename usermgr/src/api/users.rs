//! ユーザー管理API
//!
//! `/api/users` の GET / POST / PUT / DELETE。
//! 操作が失敗した場合は、トランザクションとは別に`ERROR`ログを書き込む
//! （この書き込み自体の失敗は警告ログのみ）。

use crate::common::error::UserMgrError;
use crate::common::types::{
    ListUsersOptions, NewUser, UserChanges, UserListItem, UserProjection, UserWithProfile,
};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// GET /api/users のクエリパラメーター
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// カンマ区切りの返却項目
    pub fields: Option<String>,
    /// プロフィールを結合するか
    #[serde(default)]
    pub with_profile: bool,
    /// 最近のログを結合するか
    #[serde(default)]
    pub with_logs: bool,
}

impl ListUsersQuery {
    fn into_options(self) -> Result<ListUsersOptions, UserMgrError> {
        Ok(ListUsersOptions {
            projection: UserProjection::parse(self.fields.as_deref())?,
            with_profile: self.with_profile,
            with_logs: self.with_logs,
        })
    }
}

/// `?id=` クエリパラメーター
#[derive(Debug, Default, Deserialize)]
pub struct UserIdQuery {
    /// ユーザーID（文字列のまま受け取り、ハンドラーで検証）
    pub id: Option<String>,
}

impl UserIdQuery {
    /// IDを検証して整数に変換する
    pub fn parse(&self) -> Result<i64, UserMgrError> {
        let raw = match self.id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(UserMgrError::MissingParameter("User ID")),
        };
        raw.parse::<i64>()
            .map_err(|e| UserMgrError::InvalidParameter {
                name: "id",
                reason: format!("'{}' is not an integer ({})", raw, e),
            })
    }
}

/// 一覧取得失敗時のレスポンス
#[derive(Debug, Serialize)]
pub struct ListUsersFailure {
    /// 操作名
    pub error: String,
    /// 詳細メッセージ
    pub message: String,
    /// 常に空配列
    pub users: Vec<UserListItem>,
}

/// 失敗を`ERROR`ログとして記録する（ベストエフォート）
async fn record_failure(state: &AppState, error: &AppError) {
    if let Err(log_err) = state.logs.record_failure(&error.detail()).await {
        tracing::warn!("Failed to record error log: {}", log_err);
    }
}

async fn fail(state: &AppState, context: &'static str, error: UserMgrError) -> AppError {
    let error = AppError::new(context, error);
    record_failure(state, &error).await;
    error
}

/// GET /api/users - ユーザー一覧取得
///
/// # Returns
/// * `200 OK` - ユーザー一覧（形はクエリに依存）
/// * `500 Internal Server Error` - `{error, message, users: []}`
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Response {
    const CONTEXT: &str = "Failed to fetch users";

    let result = match query {
        Ok(Query(query)) => match query.into_options() {
            Ok(options) => state.users.list_users(&options).await,
            Err(err) => Err(err),
        },
        Err(rejection) => Err(UserMgrError::Validation(rejection.body_text())),
    };

    match result {
        Ok(users) => Json(users).into_response(),
        Err(err) => {
            let error = fail(&state, CONTEXT, err).await;
            tracing::error!("{}", error.detail());
            let body = ListUsersFailure {
                error: CONTEXT.to_string(),
                message: error.error().external_message(),
                users: Vec::new(),
            };
            (error.status(), Json(body)).into_response()
        }
    }
}

/// POST /api/users - ユーザー作成
///
/// # Returns
/// * `200 OK` - 作成されたユーザーとプロフィール
/// * `500 Internal Server Error` - 入力不備・email重複・DBエラー
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<Json<UserWithProfile>, AppError> {
    const CONTEXT: &str = "Failed to create user";

    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            let err = UserMgrError::Validation(rejection.body_text());
            return Err(fail(&state, CONTEXT, err).await);
        }
    };

    match state.users.create_user(&input).await {
        Ok(created) => Ok(Json(created)),
        Err(err) => Err(fail(&state, CONTEXT, err).await),
    }
}

/// PUT /api/users?id= - ユーザー更新
///
/// # Returns
/// * `200 OK` - 更新されたユーザーとプロフィール
/// * `400 Bad Request` - idが未指定または整数でない
/// * `500 Internal Server Error` - ユーザー不在・入力不備・DBエラー
pub async fn update_user(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> Result<Json<UserWithProfile>, AppError> {
    const CONTEXT: &str = "Failed to update user";

    let id = query.parse()?;
    let changes = match payload {
        Ok(Json(changes)) => changes,
        Err(rejection) => {
            let err = UserMgrError::Validation(rejection.body_text());
            return Err(fail(&state, CONTEXT, err).await);
        }
    };

    match state.users.update_user(id, &changes).await {
        Ok(updated) => Ok(Json(updated)),
        Err(err) => Err(fail(&state, CONTEXT, err).await),
    }
}

/// DELETE /api/users?id= - ユーザー削除
///
/// # Returns
/// * `200 OK` - 削除されたユーザー
/// * `400 Bad Request` - idが未指定または整数でない
/// * `500 Internal Server Error` - ユーザー不在・DBエラー
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<UserWithProfile>, AppError> {
    const CONTEXT: &str = "Failed to delete user";

    let id = query.parse()?;
    match state.users.delete_user(id).await {
        Ok(deleted) => Ok(Json(deleted)),
        Err(err) => Err(fail(&state, CONTEXT, err).await),
    }
}
