use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::audit;
use crate::models::User;
use crate::pagination::{Page, PageQuery};
use crate::rbac::Actor;
use crate::services::users;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub async fn list(
    actor: Actor,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let tenant_id = actor.require_tenant()?;
    let users = users::list_users(&state.pool, tenant_id, Page::from(query)).await?;
    Ok(Json(users))
}

pub async fn get(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let tenant_id = actor.require_tenant()?;
    let user = users::get_user(&state.pool, tenant_id, id).await?;
    Ok(Json(user))
}

pub async fn update_role(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<User>, AppError> {
    let user = users::update_role(&state.pool, &actor, id, &req.role).await?;

    audit::log_event(
        &state.pool,
        actor.tenant_id,
        Some(actor.user_id),
        "user.role_updated",
        "user",
        Some(id),
        Some(serde_json::json!({ "new_role": user.role })),
    )
    .await;

    Ok(Json(user))
}

pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    users::delete_user(&state.pool, &actor, id).await?;

    audit::log_event(
        &state.pool,
        actor.tenant_id,
        Some(actor.user_id),
        "user.deleted",
        "user",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
