//! ユーザー管理API Contract Tests
//!
//! GET /api/users, POST /api/users, PUT /api/users?id=, DELETE /api/users?id=

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::support::app::{count_logs, create_test_app, send};

async fn create_ann(app: &axum::Router) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({"email": "ann@x.com", "name": "Ann"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

// ---------------------------------------------------------------------------
// POST /api/users
// ---------------------------------------------------------------------------

/// bio未指定なら既定のbioでプロフィールが作られる
#[tokio::test]
async fn test_create_user_with_default_bio() {
    let (app, db_pool) = create_test_app().await;

    let body = create_ann(&app).await;
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["email"], "ann@x.com");
    assert_eq!(body["name"], "Ann");
    assert!(body["createdAt"].is_string());
    assert_eq!(body["profile"]["bio"], "안녕하세요!");
    assert_eq!(body["profile"]["userId"], body["id"]);

    assert_eq!(count_logs(&db_pool, "CREATE_USER").await, 1);
}

/// bio指定時はそのまま保存される
#[tokio::test]
async fn test_create_user_with_bio() {
    let (app, _db_pool) = create_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({"email": "bo@x.com", "name": "Bo", "bio": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["bio"], "hello");
}

/// email重複は500で、ユーザーは1件のまま・ERRORログが1件残る
#[tokio::test]
async fn test_create_user_duplicate_email() {
    let (app, db_pool) = create_test_app().await;
    create_ann(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({"email": "ann@x.com", "name": "Another"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to create user"));

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&db_pool)
        .await
        .unwrap();
    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&db_pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
    assert_eq!(profiles, 1);
    assert_eq!(count_logs(&db_pool, "CREATE_USER").await, 1);
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
}

/// nameが欠けていれば500、何も作られない
#[tokio::test]
async fn test_create_user_missing_name() {
    let (app, db_pool) = create_test_app().await;

    let (status, body) = send(&app, "POST", "/api/users", Some(json!({"email": "a@x.com"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("name is required"));
    assert_eq!(count_logs(&db_pool, "CREATE_USER").await, 0);
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
}

/// 壊れたJSONも500 + ERRORログ
#[tokio::test]
async fn test_create_user_malformed_json() {
    let (app, db_pool) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
}

// ---------------------------------------------------------------------------
// GET /api/users
// ---------------------------------------------------------------------------

/// クエリなしなら全項目、結合なし
#[tokio::test]
async fn test_list_users_default_shape() {
    let (app, db_pool) = create_test_app().await;
    create_ann(&app).await;

    let (status, body) = send(&app, "GET", "/api/users", None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "ann@x.com");
    assert_eq!(users[0]["name"], "Ann");
    assert!(users[0]["createdAt"].is_string());
    assert!(users[0].get("profile").is_none());
    assert!(users[0].get("logs").is_none());

    assert_eq!(count_logs(&db_pool, "GET_USERS").await, 1);
}

/// fields・withProfile・withLogsの組み合わせ
#[tokio::test]
async fn test_list_users_with_projection_and_joins() {
    let (app, _db_pool) = create_test_app().await;
    create_ann(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/users?fields=id,name,bio&withProfile=true&withLogs=true",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let user = &body.as_array().unwrap()[0];
    assert!(user["id"].is_i64());
    assert_eq!(user["name"], "Ann");
    assert!(user.get("email").is_none());
    assert!(user.get("createdAt").is_none());
    assert_eq!(user["profile"]["bio"], "안녕하세요!");

    let logs = user["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "CREATE_USER");
    assert_eq!(logs[0]["details"], "Created user Ann (ann@x.com) with profile");
}

/// 未知のfieldsは500で`users: []`を返す
#[tokio::test]
async fn test_list_users_unknown_field() {
    let (app, db_pool) = create_test_app().await;

    let (status, body) = send(&app, "GET", "/api/users?fields=password", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch users");
    assert!(body["message"].as_str().unwrap().contains("password"));
    assert_eq!(body["users"], json!([]));
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
    assert_eq!(count_logs(&db_pool, "GET_USERS").await, 0);
}

// ---------------------------------------------------------------------------
// PUT /api/users
// ---------------------------------------------------------------------------

/// idなしは400、ログは書かれない
#[tokio::test]
async fn test_update_user_requires_id() {
    let (app, db_pool) = create_test_app().await;

    let (status, body) = send(&app, "PUT", "/api/users", Some(json!({"name": "X"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID is required");
    assert_eq!(count_logs(&db_pool, "ERROR").await, 0);
}

/// 数値でないidは400
#[tokio::test]
async fn test_update_user_non_integer_id() {
    let (app, _db_pool) = create_test_app().await;

    let (status, _body) = send(&app, "PUT", "/api/users?id=abc", Some(json!({"name": "X"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// bioの更新が一覧に反映される
#[tokio::test]
async fn test_update_user_bio_round_trip() {
    let (app, db_pool) = create_test_app().await;
    let created = create_ann(&app).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users?id={}", id),
        Some(json!({"bio": "updated"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ann");
    assert_eq!(body["profile"]["bio"], "updated");

    let (_, list) = send(&app, "GET", "/api/users?fields=id,bio", None).await;
    assert_eq!(list[0]["profile"]["bio"], "updated");
    assert_eq!(count_logs(&db_pool, "UPDATE_USER").await, 1);
}

/// 存在しないユーザーの更新は500
#[tokio::test]
async fn test_update_missing_user() {
    let (app, db_pool) = create_test_app().await;

    let (status, body) = send(&app, "PUT", "/api/users?id=42", Some(json!({"name": "X"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to update user"));
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
}

// ---------------------------------------------------------------------------
// DELETE /api/users
// ---------------------------------------------------------------------------

/// idなしは400
#[tokio::test]
async fn test_delete_user_requires_id() {
    let (app, db_pool) = create_test_app().await;

    let (status, body) = send(&app, "DELETE", "/api/users", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID is required");
    assert_eq!(count_logs(&db_pool, "ERROR").await, 0);
}

/// 削除するとプロフィールも消え、ログは残る
#[tokio::test]
async fn test_delete_user_removes_profile() {
    let (app, db_pool) = create_test_app().await;
    let created = create_ann(&app).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/api/users?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["email"], "ann@x.com");

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(&db_pool)
        .await
        .unwrap();
    assert_eq!(profiles, 0);

    let (_, list) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(list, json!([]));

    let user_logs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE user_id = ?")
        .bind(id)
        .fetch_one(&db_pool)
        .await
        .unwrap();
    assert_eq!(user_logs, 2);
}

/// 存在しないユーザーの削除は500で、ERRORログが1件だけ増える
#[tokio::test]
async fn test_delete_missing_user() {
    let (app, db_pool) = create_test_app().await;

    let (status, _body) = send(&app, "DELETE", "/api/users?id=999", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(count_logs(&db_pool, "ERROR").await, 1);
    assert_eq!(count_logs(&db_pool, "DELETE_USER").await, 0);
}
