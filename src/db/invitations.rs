use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Invitation, InviteSummary};

const SUMMARY_SELECT: &str = "SELECT i.id, i.tenant_id, i.email, i.role, i.expires_at, i.accepted,
                i.created_by, u.email AS creator_email, i.created_at
         FROM invitations i
         JOIN users u ON u.id = i.created_by";

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    email: &str,
    role: &str,
    token_hash: &str,
    expires_at: DateTime<Utc>,
    created_by: Uuid,
) -> Result<Invitation, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        "INSERT INTO invitations (tenant_id, email, role, token_hash, expires_at, created_by)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(tenant_id)
    .bind(email)
    .bind(role)
    .bind(token_hash)
    .bind(expires_at)
    .bind(created_by)
    .fetch_one(executor)
    .await
}

/// Drop lapsed, never-accepted invites so a fresh one can take their slot.
pub async fn purge_expired<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    email: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM invitations
         WHERE tenant_id = $1 AND email = $2 AND NOT accepted AND expires_at <= now()",
    )
    .bind(tenant_id)
    .bind(email)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// The unaccepted, unexpired invite for (tenant, email), if any.
pub async fn find_active<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    email: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        "SELECT * FROM invitations
         WHERE tenant_id = $1 AND email = $2 AND NOT accepted AND expires_at > now()",
    )
    .bind(tenant_id)
    .bind(email)
    .fetch_optional(executor)
    .await
}

/// The newest unexpired invite for (tenant, email), accepted or not.
pub async fn find_current<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    email: &str,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>(
        "SELECT * FROM invitations
         WHERE tenant_id = $1 AND email = $2 AND expires_at > now()
         ORDER BY accepted, created_at DESC
         LIMIT 1",
    )
    .bind(tenant_id)
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<Option<Invitation>, sqlx::Error> {
    sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn summary<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<Option<InviteSummary>, sqlx::Error> {
    sqlx::query_as::<_, InviteSummary>(&format!(
        "{SUMMARY_SELECT} WHERE i.tenant_id = $1 AND i.id = $2"
    ))
    .bind(tenant_id)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_active<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<InviteSummary>, sqlx::Error> {
    sqlx::query_as::<_, InviteSummary>(&format!(
        "{SUMMARY_SELECT}
         WHERE i.tenant_id = $1 AND NOT i.accepted AND i.expires_at > now()
         ORDER BY i.created_at DESC, i.id DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

/// Flip `accepted`. Zero rows means someone else consumed it first.
pub async fn mark_accepted<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE invitations SET accepted = true WHERE id = $1 AND NOT accepted")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    tenant_id: Uuid,
    id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invitations WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
