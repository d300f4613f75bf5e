//! Per-tenant role management. Template rows are never touched here.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Role, RoleWithPermissions};
use crate::pagination::Page;
use crate::rbac::catalog::{is_superadmin_role, PermissionCode};

pub async fn list_roles(
    pool: &PgPool,
    tenant_id: Uuid,
    page: Page,
) -> Result<Vec<RoleWithPermissions>, AppError> {
    let roles = db::roles::list_by_tenant(pool, tenant_id, page.limit, page.offset()).await?;
    let ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();

    let mut codes: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (role_id, code) in db::roles::permission_codes(pool, &ids).await? {
        codes.entry(role_id).or_default().push(code);
    }

    Ok(roles
        .into_iter()
        .map(|role| RoleWithPermissions {
            permissions: codes.remove(&role.id).unwrap_or_default(),
            role,
        })
        .collect())
}

/// Add a non-default role with the given permission codes.
pub async fn add_role(
    pool: &PgPool,
    tenant_id: Uuid,
    name: &str,
    permissions: &[PermissionCode],
) -> Result<RoleWithPermissions, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Role name is required".to_string()));
    }
    if is_superadmin_role(name) {
        return Err(AppError::Validation(format!("Role name '{name}' is reserved")));
    }

    let mut tx = pool.begin().await?;

    let role = db::roles::create(&mut *tx, Some(tenant_id), name, false)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "A role with this name already exists"))?;

    let mut ids = Vec::with_capacity(permissions.len());
    for code in permissions {
        let permission = db::permissions::find_by_code(&mut *tx, Some(tenant_id), *code)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown permission '{code}'")))?;
        ids.push(permission.id);
    }
    db::roles::attach_permissions(&mut *tx, role.id, &ids).await?;

    tx.commit().await?;

    let mut granted: Vec<String> = permissions.iter().map(|c| c.to_string()).collect();
    granted.sort();
    granted.dedup();

    Ok(RoleWithPermissions {
        role,
        permissions: granted,
    })
}

pub async fn delete_role(pool: &PgPool, tenant_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
    let role = find_role(pool, tenant_id, role_id).await?;
    if role.is_default {
        return Err(AppError::Validation("The default role cannot be deleted".to_string()));
    }

    db::roles::delete(pool, tenant_id, role.id)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict("Role is still assigned to users".to_string())
            }
            _ => AppError::Database(e),
        })?;
    Ok(())
}

pub async fn grant_permission(
    pool: &PgPool,
    tenant_id: Uuid,
    role_id: Uuid,
    code: PermissionCode,
) -> Result<(), AppError> {
    let role = find_role(pool, tenant_id, role_id).await?;
    let permission = db::permissions::find_by_code(pool, Some(tenant_id), code)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown permission '{code}'")))?;

    db::roles::attach_permissions(pool, role.id, &[permission.id]).await?;
    Ok(())
}

pub async fn revoke_permission(
    pool: &PgPool,
    tenant_id: Uuid,
    role_id: Uuid,
    code: PermissionCode,
) -> Result<(), AppError> {
    let role = find_role(pool, tenant_id, role_id).await?;
    let permission = db::permissions::find_by_code(pool, Some(tenant_id), code)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown permission '{code}'")))?;

    if db::roles::detach_permission(pool, role.id, permission.id).await? == 0 {
        return Err(AppError::NotFound(format!("Role does not grant '{code}'")));
    }
    Ok(())
}

async fn find_role(pool: &PgPool, tenant_id: Uuid, role_id: Uuid) -> Result<Role, AppError> {
    db::roles::find_in_tenant(pool, tenant_id, role_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role not found".to_string()))
}
