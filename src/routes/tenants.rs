use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Tenant, User};
use crate::pagination::{Page, PageQuery};
use crate::rbac::Actor;
use crate::services::tenants;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub owner_email: String,
    pub owner_password: String,
}

#[derive(Serialize)]
pub struct CreatedTenant {
    pub tenant: Tenant,
    pub owner: User,
}

#[derive(Serialize)]
pub struct TenantDetail {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub user_count: i64,
    pub role_count: i64,
}

pub async fn list(
    actor: Actor,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Tenant>>, AppError> {
    let tenants = tenants::list_tenants(&state.pool, &actor, Page::from(query)).await?;
    Ok(Json(tenants))
}

pub async fn create(
    actor: Actor,
    State(state): State<SharedState>,
    Json(req): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<CreatedTenant>), AppError> {
    let (tenant, owner) = tenants::create_tenant(
        &state.pool,
        &actor,
        &req.name,
        &req.owner_email,
        &req.owner_password,
    )
    .await?;

    audit::log_event(
        &state.pool,
        Some(tenant.id),
        Some(actor.user_id),
        "tenant.created",
        "tenant",
        Some(tenant.id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(CreatedTenant { tenant, owner })))
}

pub async fn get(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TenantDetail>, AppError> {
    let tenant = tenants::get_tenant(&state.pool, &actor, id).await?;
    let user_count = db::users::count_by_tenant(&state.pool, id).await?;
    let role_count = db::roles::count_by_tenant(&state.pool, id).await?;

    Ok(Json(TenantDetail {
        tenant,
        user_count,
        role_count,
    }))
}

pub async fn delete(
    actor: Actor,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tenants::delete_tenant(&state.pool, &actor, id).await?;

    // The tenant's own audit rows are gone with it
    audit::log_event(
        &state.pool,
        None,
        Some(actor.user_id),
        "tenant.deleted",
        "tenant",
        Some(id),
        None,
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
