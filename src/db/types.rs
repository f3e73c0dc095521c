use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Manager,
    Teacher,
    Student,
}

impl UserRole {
    /// Managers and teachers administer categories, exams, and questions.
    pub(crate) fn is_staff(self) -> bool {
        matches!(self, UserRole::Manager | UserRole::Teacher)
    }
}
