use uuid::Uuid;

use crate::models::Permission;
use crate::rbac::catalog::PermissionCode;

pub async fn list_templates<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        "SELECT * FROM permissions WHERE tenant_id IS NULL ORDER BY code",
    )
    .fetch_all(executor)
    .await
}

/// Seed one template permission. Returns `None` when it already exists.
pub async fn create_template<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    code: PermissionCode,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        "INSERT INTO permissions (tenant_id, resource, action, code)
         VALUES (NULL, $1, $2, $3)
         ON CONFLICT ON CONSTRAINT permissions_tenant_code_key DO NOTHING
         RETURNING *",
    )
    .bind(code.resource.as_str())
    .bind(code.action.as_str())
    .bind(code.to_string())
    .fetch_optional(executor)
    .await
}

/// Copy every template permission into `tenant_id`, returning the new rows.
pub async fn copy_templates_into<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        "INSERT INTO permissions (tenant_id, resource, action, code)
         SELECT $1, resource, action, code FROM permissions WHERE tenant_id IS NULL
         RETURNING *",
    )
    .bind(tenant_id)
    .fetch_all(executor)
    .await
}

pub async fn find_by_code<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Option<Uuid>,
    code: PermissionCode,
) -> Result<Option<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        "SELECT * FROM permissions WHERE tenant_id IS NOT DISTINCT FROM $1 AND code = $2",
    )
    .bind(tenant_id)
    .bind(code.to_string())
    .fetch_optional(executor)
    .await
}

pub async fn list_for_role<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    role_id: Uuid,
) -> Result<Vec<Permission>, sqlx::Error> {
    sqlx::query_as::<_, Permission>(
        "SELECT p.* FROM permissions p
         JOIN role_permissions rp ON rp.permission_id = p.id
         WHERE rp.role_id = $1
         ORDER BY p.code",
    )
    .bind(role_id)
    .fetch_all(executor)
    .await
}
