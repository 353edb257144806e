//! REST APIハンドラー
//!
//! ユーザーCRUDと操作ログ閲覧

/// APIエラーレスポンス
pub mod error;
/// 操作ログ閲覧
pub mod logs;
/// ユーザー管理
pub mod users;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/logs", get(logs::get_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
