use sqlx::PgPool;
use time::PrimitiveDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AssignmentView {
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) assigned_at: PrimitiveDateTime,
}

pub(crate) async fn list_category_ids_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT category_id FROM category_assignments WHERE user_id = $1 ORDER BY category_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<AssignmentView>, sqlx::Error> {
    sqlx::query_as::<_, AssignmentView>(
        "SELECT ca.category_id, c.name AS category_name, ca.assigned_at
         FROM category_assignments ca
         JOIN categories c ON c.id = ca.category_id
         WHERE ca.user_id = $1
         ORDER BY c.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Replace the user's assignment set with exactly `category_ids`: absent rows
/// are inserted, rows no longer listed are removed. Ids that do not match an
/// existing category are dropped silently. The unique key on
/// (user_id, category_id) keeps concurrent syncs from duplicating rows.
pub(crate) async fn sync_for_user(
    pool: &PgPool,
    user_id: i64,
    category_ids: &[i64],
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM category_assignments WHERE user_id = $1 AND category_id <> ALL($2)")
        .bind(user_id)
        .bind(category_ids)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO category_assignments (user_id, category_id, assigned_at)
         SELECT $1, c.id, $3 FROM categories c WHERE c.id = ANY($2)
         ON CONFLICT (user_id, category_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(category_ids)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
