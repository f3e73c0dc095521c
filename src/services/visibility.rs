use sqlx::PgPool;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

/// Which categories a request may see, resolved once from the caller's role.
///
/// Listing handlers hand the scope to repository queries; it is a read-only
/// projection and never stands in for write authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CategoryScope {
    /// Managers see everything.
    All,
    /// Teachers and students see only the categories assigned to them.
    Assigned(Vec<i64>),
}

impl CategoryScope {
    pub(crate) async fn for_user(pool: &PgPool, user: &User) -> Result<Self, sqlx::Error> {
        match user.role {
            UserRole::Manager => Ok(CategoryScope::All),
            UserRole::Teacher | UserRole::Student => {
                let ids =
                    repositories::assignments::list_category_ids_for_user(pool, user.id).await?;
                Ok(CategoryScope::Assigned(ids))
            }
        }
    }

    pub(crate) fn allows(&self, category_id: i64) -> bool {
        match self {
            CategoryScope::All => true,
            CategoryScope::Assigned(ids) => ids.contains(&category_id),
        }
    }

    /// `None` means unrestricted; `Some` is the exact allowed id set.
    pub(crate) fn assigned_ids(&self) -> Option<&[i64]> {
        match self {
            CategoryScope::All => None,
            CategoryScope::Assigned(ids) => Some(ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_allows_any_category() {
        assert!(CategoryScope::All.allows(1));
        assert!(CategoryScope::All.allows(999));
        assert_eq!(CategoryScope::All.assigned_ids(), None);
    }

    #[test]
    fn assigned_allows_only_listed_categories() {
        let scope = CategoryScope::Assigned(vec![1, 3]);
        assert!(scope.allows(1));
        assert!(scope.allows(3));
        assert!(!scope.allows(2));
        assert_eq!(scope.assigned_ids(), Some(&[1, 3][..]));
    }

    #[test]
    fn empty_assignment_set_sees_nothing() {
        let scope = CategoryScope::Assigned(Vec::new());
        assert!(!scope.allows(1));
        assert_eq!(scope.assigned_ids(), Some(&[][..]));
    }
}
