use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStaff, CurrentUser};
use crate::api::{attempts, questions};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::{Exam, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::attempt::ResultResponse;
use crate::schemas::exam::{format_primitive, ExamCreate, ExamResponse, ExamUpdate};
use crate::services::visibility::CategoryScope;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/:exam_id", get(get_exam).patch(update_exam).delete(delete_exam))
        .route(
            "/:exam_id/questions",
            get(questions::list_for_exam).post(questions::create_question),
        )
        .route("/:exam_id/join", post(attempts::join_exam))
        .route("/:exam_id/submit", post(attempts::submit_exam))
        .route("/:exam_id/results", get(attempts::list_exam_results))
}

#[cfg(test)]
mod tests;

/// Fetch an exam and verify the staff caller's category scope covers it.
pub(in crate::api) async fn load_exam_for_staff(
    state: &AppState,
    staff: &User,
    exam_id: i64,
) -> Result<Exam, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;

    let Some(exam) = exam else {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    };

    let scope = CategoryScope::for_user(state.db(), staff)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;

    if !scope.allows(exam.category_id) {
        return Err(ApiError::Forbidden("Exam is outside your assigned categories"));
    }

    Ok(exam)
}

async fn list_exams(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let scope = CategoryScope::for_user(state.db(), &user)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;

    let rows = repositories::exams::list_in_scope(state.db(), &scope)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    // Students get their recorded result attached so the client can offer
    // "view result" instead of "enter". The gate stays the sole enforcer.
    let mut results_by_exam: HashMap<i64, ResultResponse> = HashMap::new();
    if user.role == UserRole::Student {
        let results = repositories::results::list_by_student(state.db(), user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list results"))?;
        for row in &results {
            results_by_exam.insert(row.exam_id, ResultResponse::from_student_row(row));
        }
    }

    let exams = rows
        .into_iter()
        .map(|row| {
            let result = results_by_exam.remove(&row.id);
            ExamResponse::from_row(row, result)
        })
        .collect();

    Ok(Json(exams))
}

async fn get_exam(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    let row = repositories::exams::find_list_row(state.db(), exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(ExamResponse::from_row(row, None)))
}

async fn create_exam(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let start_time = to_primitive_utc(payload.start_time);
    let end_time = to_primitive_utc(payload.end_time);
    if start_time > end_time {
        return Err(ApiError::BadRequest("start_time must not be after end_time".to_string()));
    }

    let category = repositories::categories::find_by_id(state.db(), payload.category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::BadRequest("Category does not exist".to_string()))?;

    let scope = CategoryScope::for_user(state.db(), &staff)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;
    if !scope.allows(category.id) {
        return Err(ApiError::Forbidden("You can only create exams in your assigned categories"));
    }

    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            category_id: category.id,
            title: &payload.title,
            start_time,
            end_time,
            duration_minutes: payload.duration_minutes,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    let response = ExamResponse {
        id: exam.id,
        category_id: exam.category_id,
        category_name: category.name,
        title: exam.title,
        start_time: format_primitive(exam.start_time),
        end_time: format_primitive(exam.end_time),
        duration_minutes: exam.duration_minutes,
        created_at: format_primitive(exam.created_at),
        question_count: 0,
        result: None,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_exam(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    if let Some(category_id) = payload.category_id {
        repositories::categories::find_by_id(state.db(), category_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
            .ok_or_else(|| ApiError::BadRequest("Category does not exist".to_string()))?;

        let scope = CategoryScope::for_user(state.db(), &staff)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;
        if !scope.allows(category_id) {
            return Err(ApiError::Forbidden(
                "You can only move exams into your assigned categories",
            ));
        }
    }

    // Validate the window the exam would end up with, not just the patch.
    let start_time = payload.start_time.map(to_primitive_utc).unwrap_or(exam.start_time);
    let end_time = payload.end_time.map(to_primitive_utc).unwrap_or(exam.end_time);
    if start_time > end_time {
        return Err(ApiError::BadRequest("start_time must not be after end_time".to_string()));
    }

    let updated = repositories::exams::update(
        state.db(),
        exam.id,
        repositories::exams::UpdateExam {
            category_id: payload.category_id,
            title: payload.title,
            start_time: payload.start_time.map(to_primitive_utc),
            end_time: payload.end_time.map(to_primitive_utc),
            duration_minutes: payload.duration_minutes,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?
    .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let row = repositories::exams::find_list_row(state.db(), updated.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(ExamResponse::from_row(row, None)))
}

async fn delete_exam(
    Path(exam_id): Path<i64>,
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let exam = load_exam_for_staff(&state, &staff, exam_id).await?;

    let deleted = repositories::exams::delete_by_id(state.db(), exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
