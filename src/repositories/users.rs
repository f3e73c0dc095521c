use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::services::visibility::CategoryScope;

const COLUMNS: &str = "\
    id, username, name, surname, hashed_password, role, profile_image_path, \
    is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) username: &'a str,
    pub(crate) name: &'a str,
    pub(crate) surname: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            username, name, surname, hashed_password, role, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}",
    ))
    .bind(params.username)
    .bind(params.name)
    .bind(params.surname)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateUser {
    pub(crate) username: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) surname: Option<String>,
    pub(crate) hashed_password: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) is_active: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateUser,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET
            username = COALESCE($1, username),
            name = COALESCE($2, name),
            surname = COALESCE($3, surname),
            hashed_password = COALESCE($4, hashed_password),
            role = COALESCE($5, role),
            is_active = COALESCE($6, is_active),
            updated_at = $7
         WHERE id = $8
         RETURNING {COLUMNS}",
    ))
    .bind(params.username)
    .bind(params.name)
    .bind(params.surname)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.is_active)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn update_profile_image(
    pool: &PgPool,
    id: i64,
    profile_image_path: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET profile_image_path = $1, updated_at = $2 WHERE id = $3")
        .bind(profile_image_path)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_staff(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE role = $1 OR role = $2 ORDER BY username"
    ))
    .bind(UserRole::Manager)
    .bind(UserRole::Teacher)
    .fetch_all(pool)
    .await
}

/// Students visible to the caller: everyone for an unrestricted scope,
/// otherwise students sharing at least one assigned category, de-duplicated.
pub(crate) async fn list_students(
    pool: &PgPool,
    scope: &CategoryScope,
) -> Result<Vec<User>, sqlx::Error> {
    match scope.assigned_ids() {
        None => {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY username"
            ))
            .bind(UserRole::Student)
            .fetch_all(pool)
            .await
        }
        Some(category_ids) => {
            sqlx::query_as::<_, User>(
                "SELECT DISTINCT u.id, u.username, u.name, u.surname, u.hashed_password,
                        u.role, u.profile_image_path, u.is_active, u.created_at, u.updated_at
                 FROM users u
                 JOIN category_assignments ca ON ca.user_id = u.id
                 WHERE u.role = $1 AND ca.category_id = ANY($2)
                 ORDER BY u.username",
            )
            .bind(UserRole::Student)
            .bind(category_ids)
            .fetch_all(pool)
            .await
        }
    }
}
