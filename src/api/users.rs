use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentManager, CurrentStaff, CurrentUser};
use crate::api::validation;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{
    AssignmentResponse, AssignmentSync, ProfileUpdate, UserCreate, UserResponse, UserUpdate,
};
use crate::services::visibility::CategoryScope;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/me/avatar", post(upload_avatar))
        .route("/staff", get(list_staff))
        .route("/students", get(list_students))
        .route("/", post(create_user))
        .route("/:user_id", patch(update_user).delete(delete_user))
        .route("/:user_id/assignments", get(list_assignments).put(sync_assignments))
}

#[cfg(test)]
mod tests;

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn list_staff(
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repositories::users::list_staff(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list staff"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

/// Managers see every student; teachers only students sharing at least one
/// of their assigned categories.
async fn list_students(
    CurrentStaff(staff): CurrentStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let scope = CategoryScope::for_user(state.db(), &staff)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to resolve category scope"))?;

    let users = repositories::users::list_students(state.db(), &scope)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

/// Teachers may enroll students; staff and manager accounts are created by
/// managers only.
async fn create_user(
    CurrentStaff(actor): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validation::validate_username(&payload.username)?;
    validation::validate_password_len(&payload.password)?;

    if payload.role != UserRole::Student && actor.role != UserRole::Manager {
        return Err(ApiError::Forbidden("Only managers can create staff accounts"));
    }

    let existing = repositories::users::exists_by_username(state.db(), &payload.username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Username is already taken".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();
    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            username: &payload.username,
            name: &payload.name,
            surname: &payload.surname,
            hashed_password,
            role: payload.role,
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create user"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn update_user(
    Path(user_id): Path<i64>,
    CurrentStaff(actor): CurrentStaff,
    State(state): State<AppState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let target = fetch_user(&state, user_id).await?;
    require_account_authority(&actor, &target)?;
    if payload.role.map_or(false, |role| role != UserRole::Student)
        && actor.role != UserRole::Manager
    {
        return Err(ApiError::Forbidden("Only managers can manage staff accounts"));
    }

    if let Some(username) = payload.username.as_deref() {
        validation::validate_username(username)?;
        let existing = repositories::users::exists_by_username(state.db(), username)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
        if existing.is_some_and(|id| id != target.id) {
            return Err(ApiError::Conflict("Username is already taken".to_string()));
        }
    }

    let hashed_password = match payload.password.as_deref() {
        Some(password) => {
            validation::validate_password_len(password)?;
            Some(
                security::hash_password(password)
                    .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
            )
        }
        None => None,
    };

    let updated = repositories::users::update(
        state.db(),
        target.id,
        repositories::users::UpdateUser {
            username: payload.username,
            name: payload.name,
            surname: payload.surname,
            hashed_password,
            role: payload.role,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update user"))?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(updated)))
}

async fn delete_user(
    Path(user_id): Path<i64>,
    CurrentStaff(actor): CurrentStaff,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let target = fetch_user(&state, user_id).await?;
    require_account_authority(&actor, &target)?;

    let deleted = repositories::users::delete_by_id(state.db(), target.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn update_me(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(username) = payload.username.as_deref() {
        validation::validate_username(username)?;
        let existing = repositories::users::exists_by_username(state.db(), username)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
        if existing.is_some_and(|id| id != user.id) {
            return Err(ApiError::Conflict("Username is already taken".to_string()));
        }
    }

    let hashed_password = match payload.password.as_deref() {
        Some(password) => {
            validation::validate_password_len(password)?;
            Some(
                security::hash_password(password)
                    .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
            )
        }
        None => None,
    };

    let updated = repositories::users::update(
        state.db(),
        user.id,
        repositories::users::UpdateUser {
            username: payload.username,
            name: payload.name,
            surname: payload.surname,
            hashed_password,
            role: None,
            is_active: None,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update profile"))?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(updated)))
}

/// Accepts a single multipart field named `file` and stores it under the
/// media root; only the relative path ends up in the database.
async fn upload_avatar(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let mut stored_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?
            .to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        validation::validate_image_upload(
            &filename,
            &content_type,
            &state.settings().media().allowed_image_extensions,
        )?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        let max_bytes = state.settings().media().max_upload_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(ApiError::BadRequest(format!(
                "File exceeds the {} MB upload limit",
                state.settings().media().max_upload_size_mb
            )));
        }

        let relative = state
            .media()
            .save_avatar(&filename, &bytes)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store avatar"))?;

        repositories::users::update_profile_image(
            state.db(),
            user.id,
            &relative,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update profile image"))?;

        stored_path = Some(relative);
        break;
    }

    let Some(relative) = stored_path else {
        return Err(ApiError::BadRequest("Multipart field 'file' is required".to_string()));
    };

    let mut user = user;
    user.profile_image_path = Some(relative);
    Ok(Json(UserResponse::from_db(user)))
}

async fn list_assignments(
    Path(user_id): Path<i64>,
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let target = fetch_user(&state, user_id).await?;

    let rows = repositories::assignments::list_for_user(state.db(), target.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(rows.into_iter().map(AssignmentResponse::from_row).collect()))
}

/// Replace the user's category assignments with the posted set, the way the
/// assignment form works: checked ids are added, unchecked ones removed.
async fn sync_assignments(
    Path(user_id): Path<i64>,
    CurrentManager(_manager): CurrentManager,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentSync>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let target = fetch_user(&state, user_id).await?;

    repositories::assignments::sync_for_user(
        state.db(),
        target.id,
        &payload.category_ids,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to sync assignments"))?;

    let rows = repositories::assignments::list_for_user(state.db(), target.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(rows.into_iter().map(AssignmentResponse::from_row).collect()))
}

async fn fetch_user(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    repositories::users::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Teachers administer student accounts only; manager and teacher accounts
/// are a manager concern.
fn require_account_authority(actor: &User, target: &User) -> Result<(), ApiError> {
    if target.role == UserRole::Student || actor.role == UserRole::Manager {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only managers can manage staff accounts"))
    }
}
