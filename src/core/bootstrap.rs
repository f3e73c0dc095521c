use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Ensure the configured first manager account exists and can log in.
/// Without at least one manager nobody can create categories or staff.
pub(crate) async fn ensure_first_manager(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_manager_password.is_empty() {
        tracing::warn!("FIRST_MANAGER_PASSWORD not configured; skipping manager bootstrap");
        return Ok(());
    }

    let username = &admin.first_manager_username;
    let user = repositories::users::find_by_username(state.db(), username).await?;
    let now = primitive_now_utc();

    if let Some(user) = user {
        let mut needs_update = false;

        let verified =
            security::verify_password(&admin.first_manager_password, &user.hashed_password)
                .unwrap_or(false);
        let hashed_password = if verified {
            user.hashed_password.clone()
        } else {
            needs_update = true;
            security::hash_password(&admin.first_manager_password)?
        };

        let role = if user.role != UserRole::Manager {
            needs_update = true;
            UserRole::Manager
        } else {
            user.role
        };

        let is_active = if !user.is_active {
            needs_update = true;
            true
        } else {
            user.is_active
        };

        if needs_update {
            sqlx::query(
                "UPDATE users
                 SET hashed_password = $1, role = $2, is_active = $3, updated_at = $4
                 WHERE id = $5",
            )
            .bind(hashed_password)
            .bind(role)
            .bind(is_active)
            .bind(now)
            .bind(user.id)
            .execute(state.db())
            .await?;

            tracing::info!("Updated first manager account {username}");
        } else {
            tracing::info!("First manager account already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_manager_password)?;

    sqlx::query(
        "INSERT INTO users (
            username, name, surname, hashed_password, role, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(username)
    .bind("Portal")
    .bind("Manager")
    .bind(hashed_password)
    .bind(UserRole::Manager)
    .bind(true)
    .bind(now)
    .bind(now)
    .execute(state.db())
    .await?;

    tracing::info!("Created first manager account {username}");
    Ok(())
}
