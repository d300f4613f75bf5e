//! Tenant administration for the superadmin.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::{Tenant, User};
use crate::pagination::Page;
use crate::rbac::{bootstrap, Actor};
use crate::services::parse_email;

pub async fn list_tenants(pool: &PgPool, actor: &Actor, page: Page) -> Result<Vec<Tenant>, AppError> {
    actor.require_superadmin()?;
    let tenants = db::tenants::list(pool, page.limit, page.offset()).await?;
    Ok(tenants)
}

pub async fn get_tenant(pool: &PgPool, actor: &Actor, tenant_id: Uuid) -> Result<Tenant, AppError> {
    actor.require_superadmin()?;
    db::tenants::find_by_id(pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
}

/// Provision a tenant and its owner on someone else's behalf.
pub async fn create_tenant(
    pool: &PgPool,
    actor: &Actor,
    name: &str,
    owner_email: &str,
    owner_password: &str,
) -> Result<(Tenant, User), AppError> {
    actor.require_superadmin()?;

    let owner_email = parse_email(owner_email)?;
    password::validate_strength(owner_password).map_err(AppError::Validation)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Tenant name is required".to_string()));
    }

    let pw_hash = password::hash(owner_password).map_err(AppError::Internal)?;
    let created = bootstrap::provision(pool, name, &owner_email, &pw_hash).await?;
    Ok((created.tenant, created.owner))
}

pub async fn delete_tenant(pool: &PgPool, actor: &Actor, tenant_id: Uuid) -> Result<(), AppError> {
    actor.require_superadmin()?;
    if db::tenants::delete(pool, tenant_id).await? == 0 {
        return Err(AppError::NotFound("Tenant not found".to_string()));
    }
    tracing::info!(%tenant_id, "Tenant deleted");
    Ok(())
}
