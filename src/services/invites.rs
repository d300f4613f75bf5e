//! Invitation lifecycle: create, list, remove, accept, resend.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{password, token};
use crate::db;
use crate::error::AppError;
use crate::models::{Invitation, InviteSummary, User};
use crate::pagination::Page;
use crate::services::{normalize_email, parse_email};

pub const INVITE_TTL_DAYS: i64 = 7;

/// A freshly stored invite and the raw token that was hashed into it.
#[derive(Debug)]
pub struct IssuedInvite {
    pub invite: Invitation,
    pub raw_token: String,
}

#[derive(Debug, Clone)]
pub struct AcceptInvite {
    pub email: String,
    pub password: String,
    pub token: String,
    pub tenant_id: Uuid,
}

pub async fn create_invite(
    pool: &PgPool,
    inviter: Uuid,
    email: &str,
    role_name: &str,
    tenant_id: Uuid,
) -> Result<IssuedInvite, AppError> {
    let email = parse_email(email)?;

    db::invitations::purge_expired(pool, tenant_id, &email).await?;

    if db::invitations::find_active(pool, tenant_id, &email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "An active invitation already exists for this email".to_string(),
        ));
    }

    let role = db::roles::find_by_name(pool, Some(tenant_id), role_name)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Role '{role_name}' does not exist")))?;

    let issued = token::generate().map_err(AppError::Internal)?;
    let expires_at = Utc::now() + Duration::days(INVITE_TTL_DAYS);

    let invite = db::invitations::create(
        pool,
        tenant_id,
        &email,
        &role.name,
        &issued.hash,
        expires_at,
        inviter,
    )
    .await
    .map_err(|e| {
        AppError::conflict_on_unique(e, "An active invitation already exists for this email")
    })?;

    tracing::info!(%tenant_id, invite_id = %invite.id, role = %role.name, "Invitation created");

    Ok(IssuedInvite {
        invite,
        raw_token: issued.raw,
    })
}

/// Open invitations for a tenant, newest first.
pub async fn get_invites(
    pool: &PgPool,
    tenant_id: Uuid,
    page: Page,
) -> Result<Vec<InviteSummary>, AppError> {
    let invites =
        db::invitations::list_active(pool, tenant_id, page.limit, page.offset()).await?;
    Ok(invites)
}

pub async fn remove_invite(pool: &PgPool, tenant_id: Uuid, invite_id: Uuid) -> Result<(), AppError> {
    let deleted = db::invitations::delete(pool, tenant_id, invite_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Invitation not found".to_string()));
    }
    Ok(())
}

/// Turn an open invitation into a user of the inviting tenant.
pub async fn accept_invite(pool: &PgPool, req: AcceptInvite) -> Result<User, AppError> {
    let email = normalize_email(&req.email);

    let invite = db::invitations::find_current(pool, req.tenant_id, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found or expired".to_string()))?;

    if invite.accepted {
        return Err(AppError::Validation("Invitation already accepted".to_string()));
    }

    if !token::verify(&req.token, &invite.token_hash) {
        return Err(AppError::Validation("incorrect token".to_string()));
    }

    if db::users::find_by_email(pool, &email).await?.is_some() {
        return Err(AppError::Conflict("A user with this email already exists".to_string()));
    }

    let role = db::roles::find_by_name(pool, Some(invite.tenant_id), &invite.role)
        .await?
        .ok_or_else(|| {
            AppError::Validation(format!("Role '{}' no longer exists", invite.role))
        })?;

    password::validate_strength(&req.password).map_err(AppError::Validation)?;
    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    let mut tx = pool.begin().await?;

    let user = db::users::create(
        &mut *tx,
        Some(invite.tenant_id),
        &email,
        &pw_hash,
        &role,
        false,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::Validation(format!("Role '{}' no longer exists", invite.role))
        }
        _ => AppError::conflict_on_unique(e, "A user with this email already exists"),
    })?;

    if db::invitations::mark_accepted(&mut *tx, invite.id).await? == 0 {
        return Err(AppError::Conflict("Invitation was already accepted".to_string()));
    }

    tx.commit().await?;

    tracing::info!(tenant_id = %invite.tenant_id, user_id = %user.id, "Invitation accepted");
    Ok(user)
}

/// Look up an open invitation for re-delivery. The stored token is left as is.
pub async fn resend_invite(
    pool: &PgPool,
    tenant_id: Uuid,
    invite_id: Uuid,
) -> Result<InviteSummary, AppError> {
    let invite = db::invitations::find_by_id(pool, tenant_id, invite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    if invite.accepted {
        return Err(AppError::Validation("Invitation already accepted".to_string()));
    }
    if invite.is_expired(Utc::now()) {
        return Err(AppError::NotFound("Invitation has expired".to_string()));
    }

    db::invitations::summary(pool, tenant_id, invite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))
}
