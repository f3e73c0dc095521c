use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::ExamResult;

const COLUMNS: &str = "id, student_id, exam_id, score, correct_count, wrong_count, taken_at";

pub(crate) async fn find_by_student_and_exam(
    pool: &PgPool,
    student_id: i64,
    exam_id: i64,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {COLUMNS} FROM exam_results WHERE student_id = $1 AND exam_id = $2"
    ))
    .bind(student_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct InsertResult {
    pub(crate) student_id: i64,
    pub(crate) exam_id: i64,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: PrimitiveDateTime,
}

/// Record a result, relying on the unique (student_id, exam_id) key to settle
/// races: returns the inserted row, or `None` when a concurrent submission got
/// there first. Results are never updated afterwards.
pub(crate) async fn insert(
    pool: &PgPool,
    params: InsertResult,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "INSERT INTO exam_results (
            student_id, exam_id, score, correct_count, wrong_count, taken_at
        ) VALUES ($1,$2,$3,$4,$5,$6)
        ON CONFLICT (student_id, exam_id) DO NOTHING
        RETURNING {COLUMNS}",
    ))
    .bind(params.student_id)
    .bind(params.exam_id)
    .bind(params.score)
    .bind(params.correct_count)
    .bind(params.wrong_count)
    .bind(params.taken_at)
    .fetch_optional(pool)
    .await
}

/// A student's own result with the exam it belongs to.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudentResultRow {
    pub(crate) id: i64,
    pub(crate) exam_id: i64,
    pub(crate) exam_title: String,
    pub(crate) category_name: String,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: PrimitiveDateTime,
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: i64,
) -> Result<Vec<StudentResultRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentResultRow>(
        "SELECT r.id, r.exam_id, e.title AS exam_title, c.name AS category_name,
                r.score, r.correct_count, r.wrong_count, r.taken_at
         FROM exam_results r
         JOIN exams e ON e.id = r.exam_id
         JOIN categories c ON c.id = e.category_id
         WHERE r.student_id = $1
         ORDER BY r.taken_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// One exam's results with the students who took it, for staff review.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamResultRow {
    pub(crate) id: i64,
    pub(crate) student_id: i64,
    pub(crate) student_username: String,
    pub(crate) student_name: String,
    pub(crate) student_surname: String,
    pub(crate) score: i32,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) taken_at: PrimitiveDateTime,
}

pub(crate) async fn list_by_exam(
    pool: &PgPool,
    exam_id: i64,
) -> Result<Vec<ExamResultRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamResultRow>(
        "SELECT r.id, r.student_id, u.username AS student_username,
                u.name AS student_name, u.surname AS student_surname,
                r.score, r.correct_count, r.wrong_count, r.taken_at
         FROM exam_results r
         JOIN users u ON u.id = r.student_id
         WHERE r.exam_id = $1
         ORDER BY r.score DESC, r.taken_at",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}
