use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Exam;
use crate::services::visibility::CategoryScope;

const COLUMNS: &str =
    "id, category_id, title, start_time, end_time, duration_minutes, created_at";

/// An exam as shown in listings, with its category name and question count
/// joined in so the caller does not have to walk relations.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamListRow {
    pub(crate) id: i64,
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) title: String,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) question_count: i64,
}

const LIST_COLUMNS: &str = "\
    e.id, e.category_id, c.name AS category_name, e.title, e.start_time, e.end_time, \
    e.duration_minutes, e.created_at, \
    (SELECT COUNT(*) FROM questions q WHERE q.exam_id = e.id) AS question_count";

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_list_row(
    pool: &PgPool,
    id: i64,
) -> Result<Option<ExamListRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamListRow>(&format!(
        "SELECT {LIST_COLUMNS}
         FROM exams e
         JOIN categories c ON c.id = e.category_id
         WHERE e.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_in_scope(
    pool: &PgPool,
    scope: &CategoryScope,
) -> Result<Vec<ExamListRow>, sqlx::Error> {
    match scope.assigned_ids() {
        None => {
            sqlx::query_as::<_, ExamListRow>(&format!(
                "SELECT {LIST_COLUMNS}
                 FROM exams e
                 JOIN categories c ON c.id = e.category_id
                 ORDER BY e.start_time, e.id"
            ))
            .fetch_all(pool)
            .await
        }
        Some(category_ids) => {
            sqlx::query_as::<_, ExamListRow>(&format!(
                "SELECT {LIST_COLUMNS}
                 FROM exams e
                 JOIN categories c ON c.id = e.category_id
                 WHERE e.category_id = ANY($1)
                 ORDER BY e.start_time, e.id"
            ))
            .bind(category_ids)
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) struct CreateExam<'a> {
    pub(crate) category_id: i64,
    pub(crate) title: &'a str,
    pub(crate) start_time: PrimitiveDateTime,
    pub(crate) end_time: PrimitiveDateTime,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            category_id, title, start_time, end_time, duration_minutes, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6)
        RETURNING {COLUMNS}",
    ))
    .bind(params.category_id)
    .bind(params.title)
    .bind(params.start_time)
    .bind(params.end_time)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam {
    pub(crate) category_id: Option<i64>,
    pub(crate) title: Option<String>,
    pub(crate) start_time: Option<PrimitiveDateTime>,
    pub(crate) end_time: Option<PrimitiveDateTime>,
    pub(crate) duration_minutes: Option<i32>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateExam,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            category_id = COALESCE($1, category_id),
            title = COALESCE($2, title),
            start_time = COALESCE($3, start_time),
            end_time = COALESCE($4, end_time),
            duration_minutes = COALESCE($5, duration_minutes)
         WHERE id = $6
         RETURNING {COLUMNS}",
    ))
    .bind(params.category_id)
    .bind(params.title)
    .bind(params.start_time)
    .bind(params.end_time)
    .bind(params.duration_minutes)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
