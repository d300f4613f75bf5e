//! Startup seeding of the template catalog and the superadmin account.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::auth::password;
use crate::config::SuperadminConfig;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::rbac::catalog::{self, PermissionCode, SUPERADMIN_ROLE};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub roles_created: usize,
}

/// Insert any missing template permissions and roles. Safe to run repeatedly.
///
/// Grants are only attached to roles created by this call, so edits made to
/// existing template roles survive a restart.
pub async fn seed_catalog(pool: &PgPool) -> Result<SeedReport, AppError> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    for code in PermissionCode::all() {
        if db::permissions::create_template(&mut *tx, code).await?.is_some() {
            report.permissions_created += 1;
        }
    }

    let permission_ids: HashMap<PermissionCode, uuid::Uuid> =
        catalog::list_template_permissions(&mut tx)
            .await?
            .into_iter()
            .filter_map(|p| p.permission_code().map(|code| (code, p.id)))
            .collect();

    for template in catalog::template_roles() {
        let Some(role) =
            db::roles::create_template(&mut *tx, template.name, template.is_default).await?
        else {
            continue;
        };
        report.roles_created += 1;

        let mut ids = Vec::with_capacity(template.grants.len());
        for code in &template.grants {
            let id = permission_ids.get(code).ok_or_else(|| {
                AppError::Internal(format!("Template permission {code} missing after seeding"))
            })?;
            ids.push(*id);
        }
        db::roles::attach_permissions(&mut *tx, role.id, &ids).await?;
    }

    tx.commit().await?;

    tracing::info!(
        permissions = report.permissions_created,
        roles = report.roles_created,
        "Template catalog seeded"
    );

    Ok(report)
}

/// Create the process-wide superadmin if no account holds its email yet.
pub async fn seed_superadmin(
    pool: &PgPool,
    config: &SuperadminConfig,
) -> Result<Option<User>, AppError> {
    let email = config.email.trim().to_lowercase();
    if db::users::find_by_email(pool, &email).await?.is_some() {
        tracing::debug!("Superadmin already present");
        return Ok(None);
    }

    let role = db::roles::find_by_name(pool, None, SUPERADMIN_ROLE)
        .await?
        .ok_or_else(|| AppError::Internal("Superadmin template role missing".to_string()))?;

    let pw_hash = password::hash(&config.password).map_err(AppError::Internal)?;

    let user = db::users::create(pool, None, &email, &pw_hash, &role, false)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Superadmin already exists"))?;

    tracing::info!(user_id = %user.id, "Superadmin created");
    Ok(Some(user))
}
