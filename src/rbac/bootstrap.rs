//! First-user tenant provisioning.

use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::{Role, Tenant, User};
use crate::rbac::catalog;

#[derive(Debug)]
pub struct Bootstrapped {
    pub tenant: Tenant,
    pub owner: User,
    pub roles: Vec<Role>,
}

/// Create a tenant, its catalog copy and its owner in one transaction.
///
/// The tenant's contact email is the owner's email. Nothing is left behind
/// unless every step succeeds.
pub async fn provision(
    pool: &PgPool,
    tenant_name: &str,
    owner_email: &str,
    password_hash: &str,
) -> Result<Bootstrapped, AppError> {
    let mut tx = pool.begin().await?;

    let tenant = db::tenants::create(&mut *tx, tenant_name, owner_email)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "A tenant with this email already exists"))?;

    let cloned = catalog::clone_for_tenant(&mut tx, tenant.id).await?;

    let default_role = cloned
        .roles
        .iter()
        .find(|r| r.is_default)
        .cloned()
        .ok_or_else(|| {
            AppError::Internal("tenant bootstrap invariant violated: no default role".to_string())
        })?;

    let owner = db::users::create(
        &mut *tx,
        Some(tenant.id),
        owner_email,
        password_hash,
        &default_role,
        true,
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "A user with this email already exists"))?;

    tx.commit().await?;

    tracing::info!(tenant_id = %tenant.id, owner_id = %owner.id, role = %default_role.name, "Tenant provisioned");

    Ok(Bootstrapped {
        tenant,
        owner,
        roles: cloned.roles,
    })
}
