use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories::assignments::AssignmentView;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub(crate) surname: String,
    pub(crate) password: String,
    pub(crate) role: UserRole,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub(crate) username: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub(crate) surname: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<UserRole>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

/// Self-service profile edit; role and activation are deliberately absent.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProfileUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub(crate) username: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "surname must not be empty"))]
    pub(crate) surname: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) role: UserRole,
    pub(crate) profile_image_path: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            surname: user.surname,
            role: user.role,
            profile_image_path: user.profile_image_path,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentSync {
    #[serde(alias = "categoryIds")]
    pub(crate) category_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) assigned_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_row(row: AssignmentView) -> Self {
        Self {
            category_id: row.category_id,
            category_name: row.category_name,
            assigned_at: format_primitive(row.assigned_at),
        }
    }
}

fn default_true() -> bool {
    true
}
