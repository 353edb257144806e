//! 共通型定義
//!
//! User / Profile / Log の各レコードと、一覧取得時の射影（projection）型

use crate::common::error::{UserMgrError, UserMgrResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// プロフィール作成時にbioが省略された場合の既定値
pub const DEFAULT_BIO: &str = "안녕하세요!";

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// メールアドレス（一意）
    pub email: String,
    /// 表示名
    pub name: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// プロフィール（ユーザーと1対1）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// プロフィールID
    pub id: i64,
    /// 自己紹介文
    pub bio: String,
    /// 所有ユーザーID
    pub user_id: i64,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// ユーザーとそのプロフィール
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWithProfile {
    /// ユーザー本体
    #[serde(flatten)]
    pub user: User,
    /// プロフィール（存在しない場合はnull）
    pub profile: Option<Profile>,
}

/// 操作ログ（追記専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// ログID
    pub id: i64,
    /// アクション種別（CREATE_USER, ERROR 等）
    pub action: String,
    /// 詳細
    pub details: String,
    /// 関連ユーザーID（システムイベントはNone）
    pub user_id: Option<i64>,
    /// 記録日時
    pub created_at: DateTime<Utc>,
}

/// ログに記録するアクション種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    /// ユーザー作成
    CreateUser,
    /// ユーザー一覧取得
    GetUsers,
    /// ユーザー更新
    UpdateUser,
    /// ユーザー削除
    DeleteUser,
    /// 操作失敗
    Error,
}

impl LogAction {
    /// DBに保存する文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUser => "CREATE_USER",
            Self::GetUsers => "GET_USERS",
            Self::UpdateUser => "UPDATE_USER",
            Self::DeleteUser => "DELETE_USER",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ユーザー作成入力
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    /// メールアドレス
    pub email: Option<String>,
    /// 表示名
    pub name: Option<String>,
    /// 自己紹介文（空の場合は既定値）
    pub bio: Option<String>,
}

/// 検証済みのユーザー作成入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNewUser {
    /// メールアドレス
    pub email: String,
    /// 表示名
    pub name: String,
    /// 自己紹介文
    pub bio: String,
}

impl NewUser {
    /// 必須項目を検証し、bioの既定値を補完する
    pub fn validate(&self) -> UserMgrResult<ValidNewUser> {
        let email = required("email", self.email.as_deref())?;
        validate_email(&email)?;
        let name = required("name", self.name.as_deref())?;
        let bio = self.bio.as_deref().map_or_else(|| DEFAULT_BIO.to_string(), bio_or_default);
        Ok(ValidNewUser { email, name, bio })
    }
}

/// ユーザー更新入力（Noneの項目は変更しない）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    /// 新しい表示名
    pub name: Option<String>,
    /// 新しいメールアドレス
    pub email: Option<String>,
    /// 新しい自己紹介文
    pub bio: Option<String>,
}

impl UserChanges {
    /// 指定された項目のみ検証する
    pub fn validate(&self) -> UserMgrResult<UserChanges> {
        let name = self
            .name
            .as_deref()
            .map(|name| required("name", Some(name)))
            .transpose()?;
        let email = self
            .email
            .as_deref()
            .map(|email| {
                let email = required("email", Some(email))?;
                validate_email(&email)?;
                Ok::<_, UserMgrError>(email)
            })
            .transpose()?;
        Ok(UserChanges {
            name,
            email,
            bio: self.bio.as_deref().map(bio_or_default),
        })
    }
}

/// 空白のみのbioは既定値に置き換える
fn bio_or_default(bio: &str) -> String {
    match bio.trim() {
        "" => DEFAULT_BIO.to_string(),
        bio => bio.to_string(),
    }
}

fn required(field: &str, value: Option<&str>) -> UserMgrResult<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(UserMgrError::Validation(format!("{} is required", field))),
    }
}

fn validate_email(email: &str) -> UserMgrResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(UserMgrError::Validation(format!(
            "'{}' is not a valid email address",
            email
        ))),
    }
}

/// 一覧取得で選択可能なユーザー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    /// id（常に含まれる）
    Id,
    /// email
    Email,
    /// name
    Name,
    /// createdAt
    CreatedAt,
}

impl UserField {
    /// すべての項目
    pub const ALL: [UserField; 4] = [
        UserField::Id,
        UserField::Email,
        UserField::Name,
        UserField::CreatedAt,
    ];

    /// JSON上のフィールド名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::Name => "name",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl FromStr for UserField {
    type Err = UserMgrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "email" => Ok(Self::Email),
            "name" => Ok(Self::Name),
            "createdAt" => Ok(Self::CreatedAt),
            other => Err(UserMgrError::Validation(format!(
                "Unknown user field '{}'",
                other
            ))),
        }
    }
}

/// `fields`クエリから構築したユーザー項目の射影
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProjection {
    fields: BTreeSet<UserField>,
    include_bio: bool,
}

impl Default for UserProjection {
    fn default() -> Self {
        Self {
            fields: UserField::ALL.into_iter().collect(),
            include_bio: false,
        }
    }
}

impl UserProjection {
    /// カンマ区切りの項目名から射影を作る
    ///
    /// 未指定・空の場合は全項目。`bio`はプロフィール結合の指定として扱う。
    pub fn parse(csv: Option<&str>) -> UserMgrResult<Self> {
        let csv = match csv.map(str::trim) {
            Some(csv) if !csv.is_empty() => csv,
            _ => return Ok(Self::default()),
        };

        let mut fields = BTreeSet::from([UserField::Id]);
        let mut include_bio = false;
        for token in csv.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token == "bio" {
                include_bio = true;
            } else {
                fields.insert(token.parse()?);
            }
        }
        Ok(Self {
            fields,
            include_bio,
        })
    }

    /// 指定項目が含まれるか
    pub fn contains(&self, field: UserField) -> bool {
        self.fields.contains(&field)
    }

    /// `bio`が要求されたか
    pub fn includes_bio(&self) -> bool {
        self.include_bio
    }
}

/// 一覧取得オプション
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersOptions {
    /// 返却するユーザー項目
    pub projection: UserProjection,
    /// プロフィールを結合するか
    pub with_profile: bool,
    /// 最近のログを結合するか
    pub with_logs: bool,
}

impl ListUsersOptions {
    /// プロフィール結合が必要か（`bio`指定を含む）
    pub fn joins_profile(&self) -> bool {
        self.with_profile || self.projection.includes_bio()
    }
}

/// 一覧用のプロフィール要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    /// 自己紹介文
    pub bio: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// 一覧用のログ要約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    /// アクション種別
    pub action: String,
    /// 詳細
    pub details: String,
    /// 記録日時
    pub created_at: DateTime<Utc>,
}

/// 一覧の1要素（射影に応じて項目が変わる）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    /// ユーザーID
    pub id: i64,
    /// メールアドレス
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 表示名
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 作成日時
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// プロフィール（結合時のみ。未作成ならnull）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Option<ProfileSummary>>,
    /// 最近のログ（結合時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogSummary>>,
}

impl UserListItem {
    /// 射影に従ってユーザー項目を詰める
    pub fn project(user: User, projection: &UserProjection) -> Self {
        Self {
            id: user.id,
            email: projection
                .contains(UserField::Email)
                .then_some(user.email),
            name: projection.contains(UserField::Name).then_some(user.name),
            created_at: projection
                .contains(UserField::CreatedAt)
                .then_some(user.created_at),
            profile: None,
            logs: None,
        }
    }
}
