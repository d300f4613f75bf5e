use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::audit;
use crate::models::RoleWithPermissions;
use crate::pagination::{Page, PageQuery};
use crate::rbac::{Actor, PermissionCode};
use crate::services::roles;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionCode>,
}

#[derive(Deserialize)]
pub struct PermissionRequest {
    pub code: PermissionCode,
}

pub async fn list(
    actor: Actor,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<RoleWithPermissions>>, AppError> {
    let tenant_id = actor.require_tenant()?;
    let roles = roles::list_roles(&state.pool, tenant_id, Page::from(query)).await?;
    Ok(Json(roles))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleWithPermissions>), AppError> {
    let tenant_id = actor.require_tenant()?;
    let role = roles::add_role(&state.pool, tenant_id, &req.name, &req.permissions).await?;

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "role.created",
        "role",
        Some(role.role.id),
        Some(serde_json::json!({ "name": role.role.name, "permissions": role.permissions })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let tenant_id = actor.require_tenant()?;
    roles::delete_role(&state.pool, tenant_id, id).await?;

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "role.deleted",
        "role",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn grant(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PermissionRequest>,
) -> Result<StatusCode, AppError> {
    let tenant_id = actor.require_tenant()?;
    roles::grant_permission(&state.pool, tenant_id, id, req.code).await?;

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "role.permission_granted",
        "role",
        Some(id),
        Some(serde_json::json!({ "code": req.code })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PermissionRequest>,
) -> Result<StatusCode, AppError> {
    let tenant_id = actor.require_tenant()?;
    roles::revoke_permission(&state.pool, tenant_id, id, req.code).await?;

    audit::log_event(
        &state.pool,
        Some(tenant_id),
        Some(actor.user_id),
        "role.permission_revoked",
        "role",
        Some(id),
        Some(serde_json::json!({ "code": req.code })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
