use sqlx::PgPool;
use uuid::Uuid;

/// Append a row to the audit trail once a tenant, invite, role or user
/// mutation has committed.
///
/// `tenant_id` is `None` for superadmin actions outside any tenant. Actions are
/// dotted `resource.verb` names such as `invite.created` or `tenant.deleted`.
/// A failed write is logged and swallowed so the caller's response stands.
pub async fn log_event(
    pool: &PgPool,
    tenant_id: Option<Uuid>,
    actor_id: Option<Uuid>,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
    details: Option<serde_json::Value>,
) {
    let recorded = crate::db::audit::log_event(
        pool,
        tenant_id,
        actor_id,
        action,
        resource_type,
        resource_id,
        details,
    )
    .await;

    match recorded {
        Ok(()) => tracing::debug!(action, ?tenant_id, ?resource_id, "Audit event recorded"),
        Err(e) => tracing::error!(action, ?tenant_id, error = %e, "Failed to record audit event"),
    }
}
