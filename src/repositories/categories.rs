use sqlx::PgPool;

use crate::db::models::Category;
use crate::services::visibility::CategoryScope;

const COLUMNS: &str = "id, name, description";

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_in_scope(
    pool: &PgPool,
    scope: &CategoryScope,
) -> Result<Vec<Category>, sqlx::Error> {
    match scope.assigned_ids() {
        None => {
            sqlx::query_as::<_, Category>(&format!(
                "SELECT {COLUMNS} FROM categories ORDER BY name"
            ))
            .fetch_all(pool)
            .await
        }
        Some(ids) => {
            sqlx::query_as::<_, Category>(&format!(
                "SELECT {COLUMNS} FROM categories WHERE id = ANY($1) ORDER BY name"
            ))
            .bind(ids)
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn create(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET
            name = COALESCE($1, name),
            description = COALESCE($2, description)
         WHERE id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(name)
    .bind(description)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
