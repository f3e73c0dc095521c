use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::patch,
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::exams::load_exam_for_staff;
use crate::api::guards::CurrentStaff;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse, QuestionUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:question_id", patch(update_question).delete(delete_question))
}

pub(in crate::api) async fn list_for_exam(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    let questions = repositories::questions::list_by_exam(state.db(), exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from_db).collect()))
}

pub(in crate::api) async fn create_question(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            exam_id: exam.id,
            question_text: &payload.question_text,
            option_a: &payload.option_a,
            option_b: &payload.option_b,
            option_c: &payload.option_c,
            option_d: &payload.option_d,
            correct_answer: &payload.correct_answer,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn update_question(
    Path(question_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question = fetch_question(&state, question_id).await?;
    load_exam_for_staff(&state, &staff, question.exam_id).await?;

    let updated = repositories::questions::update(
        state.db(),
        question.id,
        repositories::questions::UpdateQuestion {
            question_text: payload.question_text,
            option_a: payload.option_a,
            option_b: payload.option_b,
            option_c: payload.option_c,
            option_d: payload.option_d,
            correct_answer: payload.correct_answer,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?
    .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    Ok(Json(QuestionResponse::from_db(updated)))
}

async fn delete_question(
    Path(question_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let question = fetch_question(&state, question_id).await?;
    load_exam_for_staff(&state, &staff, question.exam_id).await?;

    let deleted = repositories::questions::delete_by_id(state.db(), question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    if !deleted {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_question(
    state: &AppState,
    question_id: i64,
) -> Result<crate::db::models::Question, ApiError> {
    repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}
