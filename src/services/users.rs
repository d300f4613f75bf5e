use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::pagination::Page;
use crate::rbac::Actor;

pub async fn list_users(pool: &PgPool, tenant_id: Uuid, page: Page) -> Result<Vec<User>, AppError> {
    let users = db::users::list_by_tenant(pool, tenant_id, page.limit, page.offset()).await?;
    Ok(users)
}

pub async fn get_user(pool: &PgPool, tenant_id: Uuid, user_id: Uuid) -> Result<User, AppError> {
    db::users::find_in_tenant(pool, tenant_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Move a user onto another role of the same tenant.
pub async fn update_role(
    pool: &PgPool,
    actor: &Actor,
    user_id: Uuid,
    role_name: &str,
) -> Result<User, AppError> {
    let tenant_id = actor.require_tenant()?;
    if actor.user_id == user_id {
        return Err(AppError::Forbidden("You cannot change your own role".to_string()));
    }

    let user = get_user(pool, tenant_id, user_id).await?;

    let role = db::roles::find_by_name(pool, Some(tenant_id), role_name)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Role '{role_name}' does not exist")))?;

    assign_role(pool, user, role).await
}

/// Point `user` at `role`. A role deleted since it was looked up is a validation error.
pub async fn assign_role(pool: &PgPool, user: User, role: Role) -> Result<User, AppError> {
    let tenant_id = user
        .tenant_id
        .ok_or_else(|| AppError::Forbidden("User does not belong to a tenant".to_string()))?;

    let updated = db::users::update_role(pool, tenant_id, user.id, &role)
        .await
        .map_err(|e| {
            AppError::invalid_on_foreign_key(e, &format!("Role '{}' no longer exists", role.name))
        })?;
    if updated == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(User {
        role_id: role.id,
        role: role.name,
        ..user
    })
}

pub async fn delete_user(pool: &PgPool, actor: &Actor, user_id: Uuid) -> Result<(), AppError> {
    let tenant_id = actor.require_tenant()?;
    if actor.user_id == user_id {
        return Err(AppError::Forbidden("You cannot delete yourself".to_string()));
    }

    let user = get_user(pool, tenant_id, user_id).await?;
    if user.is_owner {
        return Err(AppError::Forbidden("The tenant owner cannot be deleted".to_string()));
    }

    db::users::delete(pool, tenant_id, user.id).await?;
    Ok(())
}
