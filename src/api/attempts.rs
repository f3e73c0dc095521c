use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::exams::load_exam_for_staff;
use crate::api::guards::{CurrentStaff, CurrentStudent};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories;
use crate::schemas::attempt::{
    AttemptExamView, AttemptSubmission, ExamResultEntry, JoinExamResponse, ResultResponse,
    StudentResultResponse, SubmitExamResponse,
};
use crate::schemas::question::AttemptQuestionResponse;
use crate::services::eligibility::{self, Admission};
use crate::services::scoring;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me", get(my_results))
}


/// Entry point of an attempt: run the gate and either hand out the answer
/// sheet or show the stored result.
pub(in crate::api) async fn join_exam(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<JoinExamResponse>, ApiError> {
    match run_gate(&state, student.id, exam_id).await? {
        Admission::Admit(exam) => {
            let questions = repositories::questions::list_by_exam(state.db(), exam.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

            Ok(Json(JoinExamResponse::Admitted {
                exam: AttemptExamView::from_db(&exam),
                questions: questions.into_iter().map(AttemptQuestionResponse::from_db).collect(),
            }))
        }
        Admission::AlreadyTaken(result) => {
            Ok(Json(JoinExamResponse::AlreadyTaken { result: ResultResponse::from_db(result) }))
        }
        Admission::NotFound => Err(ApiError::NotFound("Exam not found".to_string())),
        Admission::NotYetOpen { opens_at } => Err(ApiError::BadRequest(format!(
            "Exam has not started yet; it opens at {}",
            format_primitive(opens_at)
        ))),
        Admission::Closed { closed_at } => Err(ApiError::BadRequest(format!(
            "Exam has ended; it closed at {}",
            format_primitive(closed_at)
        ))),
    }
}

/// Grade a submission and record the one-and-only result for this
/// (student, exam) pair. The gate runs again with a fresh clock; admission at
/// join time is never cached.
pub(in crate::api) async fn submit_exam(
    Path(exam_id): Path<i64>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AttemptSubmission>,
) -> Result<Json<SubmitExamResponse>, ApiError> {
    match run_gate(&state, student.id, exam_id).await? {
        Admission::Admit(exam) => {
            let questions = repositories::questions::list_by_exam(state.db(), exam.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

            let tally = scoring::grade(&questions, &payload.answers);

            let inserted = repositories::results::insert(
                state.db(),
                repositories::results::InsertResult {
                    student_id: student.id,
                    exam_id: exam.id,
                    score: tally.score,
                    correct_count: tally.correct,
                    wrong_count: tally.wrong,
                    taken_at: primitive_now_utc(),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to record result"))?;

            match inserted {
                Some(result) => {
                    tracing::info!(
                        student_id = student.id,
                        exam_id = exam.id,
                        score = result.score,
                        "exam result recorded"
                    );
                    Ok(Json(SubmitExamResponse::Recorded {
                        result: ResultResponse::from_db(result),
                    }))
                }
                // Lost the unique-key race to a concurrent submission.
                None => {
                    let existing = repositories::results::find_by_student_and_exam(
                        state.db(),
                        student.id,
                        exam.id,
                    )
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to fetch result"))?
                    .ok_or_else(|| {
                        ApiError::Internal("Result insert conflicted but no row exists".to_string())
                    })?;

                    Ok(Json(SubmitExamResponse::AlreadyTaken {
                        result: ResultResponse::from_db(existing),
                    }))
                }
            }
        }
        Admission::AlreadyTaken(result) => {
            Ok(Json(SubmitExamResponse::AlreadyTaken { result: ResultResponse::from_db(result) }))
        }
        Admission::NotFound => Err(ApiError::NotFound("Exam not found".to_string())),
        Admission::NotYetOpen { opens_at } => Err(ApiError::BadRequest(format!(
            "Exam has not started yet; it opens at {}",
            format_primitive(opens_at)
        ))),
        Admission::Closed { closed_at } => Err(ApiError::BadRequest(format!(
            "Exam has ended; it closed at {}",
            format_primitive(closed_at)
        ))),
    }
}

pub(in crate::api) async fn list_exam_results(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResultEntry>>, ApiError> {
    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    let rows = repositories::results::list_by_exam(state.db(), exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list results"))?;

    Ok(Json(rows.into_iter().map(ExamResultEntry::from_row).collect()))
}

async fn my_results(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResultResponse>>, ApiError> {
    let rows = repositories::results::list_by_student(state.db(), student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list results"))?;

    Ok(Json(rows.into_iter().map(StudentResultResponse::from_row).collect()))
}

/// One read each for the prior result and the exam, then the pure decision.
async fn run_gate(state: &AppState, student_id: i64, exam_id: i64) -> Result<Admission, ApiError> {
    let prior = repositories::results::find_by_student_and_exam(state.db(), student_id, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch prior result"))?;

    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;

    Ok(eligibility::check(prior, exam, primitive_now_utc()))
}
