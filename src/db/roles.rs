use uuid::Uuid;

use crate::models::Role;

/// Template roles, minus the one named `excluded` (compared case-insensitively).
pub async fn list_templates<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    excluded: &str,
) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE tenant_id IS NULL AND lower(name) <> lower($1) ORDER BY name",
    )
    .bind(excluded)
    .fetch_all(executor)
    .await
}

/// (role_id, permission_id) pairs for every template role.
pub async fn template_links<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<(Uuid, Uuid)>, sqlx::Error> {
    sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT rp.role_id, rp.permission_id FROM role_permissions rp
         JOIN roles r ON r.id = rp.role_id
         WHERE r.tenant_id IS NULL",
    )
    .fetch_all(executor)
    .await
}

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Option<Uuid>,
    name: &str,
    is_default: bool,
) -> Result<Role, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "INSERT INTO roles (tenant_id, name, is_default) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(tenant_id)
    .bind(name)
    .bind(is_default)
    .fetch_one(executor)
    .await
}

/// Seed one template role. Returns `None` when it already exists.
pub async fn create_template<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    name: &str,
    is_default: bool,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "INSERT INTO roles (tenant_id, name, is_default) VALUES (NULL, $1, $2)
         ON CONFLICT ON CONSTRAINT roles_tenant_name_key DO NOTHING
         RETURNING *",
    )
    .bind(name)
    .bind(is_default)
    .fetch_optional(executor)
    .await
}

pub async fn attach_permissions<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    role_id: Uuid,
    permission_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT $1, unnest($2::uuid[])
         ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn detach_permission<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    role_id: Uuid,
    permission_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2",
    )
    .bind(role_id)
    .bind(permission_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_name<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Option<Uuid>,
    name: &str,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE tenant_id IS NOT DISTINCT FROM $1 AND name = $2",
    )
    .bind(tenant_id)
    .bind(name)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_in_tenant<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list_by_tenant<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE tenant_id = $1 ORDER BY name LIMIT $2 OFFSET $3",
    )
    .bind(tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

/// (role_id, code) pairs for the given roles.
pub async fn permission_codes<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    role_ids: &[Uuid],
) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
    sqlx::query_as::<_, (Uuid, String)>(
        "SELECT rp.role_id, p.code FROM role_permissions rp
         JOIN permissions p ON p.id = rp.permission_id
         WHERE rp.role_id = ANY($1)
         ORDER BY p.code",
    )
    .bind(role_ids)
    .fetch_all(executor)
    .await
}

pub async fn count_defaults<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM roles WHERE tenant_id = $1 AND is_default")
            .bind(tenant_id)
            .fetch_one(executor)
            .await?;
    Ok(row.0)
}

pub async fn count_by_tenant<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM roles WHERE tenant_id = $1")
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM roles WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
