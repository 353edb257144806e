//! ユーザー集約（User + Profile + Log）のトランザクション管理
//!
//! 作成・一覧・更新・削除の各操作は、それぞれ1つのトランザクションとして
//! users / profiles / logs の3テーブルにまたがって実行される。
//! 途中で失敗した場合はすべてロールバックされ、プロフィールのないユーザーや
//! ログのない変更が残ることはない。

use crate::common::error::{UserMgrError, UserMgrResult};
use crate::common::types::{
    ListUsersOptions, LogAction, LogSummary, NewUser, Profile, ProfileSummary, User,
    UserChanges, UserListItem, UserWithProfile, DEFAULT_BIO,
};
use crate::db::logs;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// 一覧でユーザーごとに結合する最新ログ件数
pub const RECENT_USER_LOGS: i64 = 5;

/// ユーザー集約ストレージ
#[derive(Debug, Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    /// 新しいUserStorageを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 書き込みトランザクションを開始する
    ///
    /// 読み取り後に書き込むため`BEGIN IMMEDIATE`で先に書き込みロックを取る。
    /// 競合する側はbusy timeoutまで待ち、コミット済みの状態を読み直す。
    async fn begin(&self) -> UserMgrResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| UserMgrError::from_sqlx("Failed to begin transaction", e))
    }

    /// ユーザーを作成
    ///
    /// User → Profile → Log の順に書き込む。
    ///
    /// # Returns
    /// * `Ok(UserWithProfile)` - 作成されたユーザーとプロフィール
    /// * `Err(UserMgrError::Validation)` - email/nameの不備
    /// * `Err(UserMgrError::Constraint)` - emailの重複
    pub async fn create(&self, input: &NewUser) -> UserMgrResult<UserWithProfile> {
        let input = input.validate()?;
        let mut tx = self.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, name) VALUES (?, ?)
             RETURNING id, email, name, created_at",
        )
        .bind(&input.email)
        .bind(&input.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_email(&input.email, "Failed to create user", e))?;

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (bio, user_id) VALUES (?, ?)
             RETURNING id, bio, user_id, created_at",
        )
        .bind(&input.bio)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to create profile", e))?;

        logs::insert(
            &mut *tx,
            LogAction::CreateUser,
            &format!("Created user {} ({}) with profile", user.name, user.email),
            Some(user.id),
        )
        .await?;

        commit(tx).await?;
        tracing::info!(user_id = user.id, email = %user.email, "Created user");

        Ok(UserWithProfile {
            user,
            profile: Some(profile),
        })
    }

    /// ユーザー一覧を取得
    ///
    /// 取得件数を`GET_USERS`ログとして同じトランザクション内で記録する。
    pub async fn list(&self, options: &ListUsersOptions) -> UserMgrResult<Vec<UserListItem>> {
        let mut tx = self.begin().await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, name, created_at FROM users ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to list users", e))?;

        let mut items = Vec::with_capacity(users.len());
        for user in users {
            let user_id = user.id;
            let mut item = UserListItem::project(user, &options.projection);

            if options.joins_profile() {
                let profile = sqlx::query_as::<_, ProfileSummary>(
                    "SELECT bio, created_at FROM profiles WHERE user_id = ?",
                )
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| UserMgrError::from_sqlx("Failed to load profile", e))?;
                item.profile = Some(profile);
            }

            if options.with_logs {
                let recent = sqlx::query_as::<_, LogSummary>(
                    "SELECT action, details, created_at FROM logs WHERE user_id = ?
                     ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .bind(user_id)
                .bind(RECENT_USER_LOGS)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| UserMgrError::from_sqlx("Failed to load user logs", e))?;
                item.logs = Some(recent);
            }

            items.push(item);
        }

        logs::insert(
            &mut *tx,
            LogAction::GetUsers,
            &format!("Retrieved {} users", items.len()),
            None,
        )
        .await?;

        commit(tx).await?;
        tracing::debug!(count = items.len(), "Listed users");

        Ok(items)
    }

    /// ユーザーを更新
    ///
    /// 指定された項目のみ更新し、プロフィールはUPSERTする
    /// （存在しなければbioまたは既定値で作成）。
    ///
    /// # Returns
    /// * `Ok(UserWithProfile)` - 更新後のユーザーとプロフィール
    /// * `Err(UserMgrError::NotFound)` - ユーザーが存在しない
    pub async fn update(&self, id: i64, changes: &UserChanges) -> UserMgrResult<UserWithProfile> {
        let mut tx = self.begin().await?;

        if find_user(&mut tx, id).await?.is_none() {
            return Err(user_not_found(id));
        }
        let changes = changes.validate()?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email)
             WHERE id = ?
             RETURNING id, email, name, created_at",
        )
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            duplicate_email(
                changes.email.as_deref().unwrap_or_default(),
                "Failed to update user",
                e,
            )
        })?;

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (bio, user_id) VALUES (?, ?)
             ON CONFLICT(user_id) DO UPDATE SET bio = COALESCE(?, bio)
             RETURNING id, bio, user_id, created_at",
        )
        .bind(changes.bio.as_deref().unwrap_or(DEFAULT_BIO))
        .bind(id)
        .bind(changes.bio.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to upsert profile", e))?;

        logs::insert(
            &mut *tx,
            LogAction::UpdateUser,
            &format!("Updated user {} ({})", user.name, user.email),
            Some(id),
        )
        .await?;

        commit(tx).await?;
        tracing::info!(user_id = id, "Updated user");

        Ok(UserWithProfile {
            user,
            profile: Some(profile),
        })
    }

    /// ユーザーを削除
    ///
    /// 削除ログを先に書き込み、プロフィール → ユーザーの順に削除する。
    ///
    /// # Returns
    /// * `Ok(UserWithProfile)` - 削除されたユーザーとプロフィール
    /// * `Err(UserMgrError::NotFound)` - ユーザーが存在しない
    pub async fn delete(&self, id: i64) -> UserMgrResult<UserWithProfile> {
        let mut tx = self.begin().await?;

        let user = find_user(&mut tx, id)
            .await?
            .ok_or_else(|| user_not_found(id))?;
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, bio, user_id, created_at FROM profiles WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to load profile", e))?;

        logs::insert(
            &mut *tx,
            LogAction::DeleteUser,
            &format!("Deleted user {} ({})", user.name, user.email),
            Some(id),
        )
        .await?;

        if profile.is_some() {
            sqlx::query("DELETE FROM profiles WHERE user_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| UserMgrError::from_sqlx("Failed to delete profile", e))?;
        }

        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| UserMgrError::from_sqlx("Failed to delete user", e))?;
        if deleted.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        commit(tx).await?;
        tracing::info!(user_id = id, "Deleted user");

        Ok(UserWithProfile { user, profile })
    }
}

async fn find_user(tx: &mut Transaction<'_, Sqlite>, id: i64) -> UserMgrResult<Option<User>> {
    sqlx::query_as::<_, User>("SELECT id, email, name, created_at FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to find user", e))
}

async fn commit(tx: Transaction<'_, Sqlite>) -> UserMgrResult<()> {
    tx.commit()
        .await
        .map_err(|e| UserMgrError::from_sqlx("Failed to commit transaction", e))
}

fn user_not_found(id: i64) -> UserMgrError {
    UserMgrError::NotFound(format!("User {} does not exist", id))
}

fn duplicate_email(email: &str, context: &str, err: sqlx::Error) -> UserMgrError {
    match UserMgrError::from_sqlx(context, err) {
        UserMgrError::Constraint(_) => {
            UserMgrError::Constraint(format!("Email '{}' already exists", email))
        }
        other => other,
    }
}
