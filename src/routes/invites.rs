use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Invitation, InviteSummary, User};
use crate::pagination::{Page, PageQuery};
use crate::rbac::Actor;
use crate::services::invites::{self, AcceptInvite};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateInviteRequest {
    pub email: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct RemoveInviteRequest {
    pub id: Uuid,
}

#[derive(Deserialize)]
pub struct AcceptInviteRequest {
    pub email: String,
    pub password: String,
    pub token: String,
    pub tenant_id: Uuid,
}

pub async fn list(
    actor: Actor,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<InviteSummary>>, AppError> {
    let tenant_id = actor.require_tenant()?;
    let invites = invites::get_invites(&state.pool, tenant_id, Page::from(query)).await?;
    Ok(Json(invites))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<Invitation>), AppError> {
    let tenant_id = actor.require_tenant()?;
    let issued =
        invites::create_invite(&state.pool, actor.user_id, &req.email, &req.role, tenant_id)
            .await?;
    let invite = issued.invite;

    let tenant = db::tenants::find_by_id(&state.pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let accept_url = format!(
        "{}/invites/accept?tenant={tenant_id}&token={}",
        state.config.base_url, issued.raw_token
    );
    if let Some(mailer) = state.mailer.clone() {
        let to = invite.email.clone();
        let role = invite.role.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_invite(&to, &tenant.name, &role, &accept_url).await {
                tracing::error!("Failed to send invitation email: {e}");
            }
        });
    } else {
        tracing::warn!(
            "System SMTP not configured. Invitation link for {}: {accept_url}",
            invite.email
        );
    }

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "invite.created",
        "invite",
        Some(invite.id),
        Some(serde_json::json!({ "email": invite.email, "role": invite.role })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(invite)))
}

/// `DELETE /api/invites/` with the id in the body.
pub async fn remove(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<RemoveInviteRequest>,
) -> Result<StatusCode, AppError> {
    remove_invite(&actor, &state, req.id).await
}

pub async fn remove_by_id(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    remove_invite(&actor, &state, id).await
}

async fn remove_invite(actor: &Actor, state: &SharedState, id: Uuid) -> Result<StatusCode, AppError> {
    let tenant_id = actor.require_tenant()?;
    invites::remove_invite(&state.pool, tenant_id, id).await?;

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "invite.removed",
        "invite",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn resend(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InviteSummary>, AppError> {
    let tenant_id = actor.require_tenant()?;
    let summary = invites::resend_invite(&state.pool, tenant_id, id).await?;

    let tenant = db::tenants::find_by_id(&state.pool, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    if let Some(mailer) = state.mailer.clone() {
        let to = summary.email.clone();
        let role = summary.role.clone();
        let expires_at = summary.expires_at;
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_invite_reminder(&to, &tenant.name, &role, expires_at)
                .await
            {
                tracing::error!("Failed to send invitation reminder: {e}");
            }
        });
    } else {
        tracing::warn!("System SMTP not configured. Skipping reminder for {}", summary.email);
    }

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "invite.resent",
        "invite",
        Some(id),
        None,
    )
    .await;

    Ok(Json(summary))
}

pub async fn accept(
    State(state): State<SharedState>,
    Json(req): Json<AcceptInviteRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = invites::accept_invite(
        &state.pool,
        AcceptInvite {
            email: req.email,
            password: req.password,
            token: req.token,
            tenant_id: req.tenant_id,
        },
    )
    .await?;

    audit::log_event(
        &state.pool,
        user.tenant_id,
        Some(user.id),
        "invite.accepted",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(user)))
}
