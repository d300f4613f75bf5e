//! Request-time access decisions.
//!
//! The blanket check derives `(action, resource)` from the HTTP method and
//! path, then asks whether the actor's role grants that permission code.

use std::collections::HashSet;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Role;
use crate::rbac::catalog::{is_superadmin_role, Action, PermissionCode, Resource};
use crate::state::SharedState;

/// Path prefixes stripped before the resource segment, longest first.
const API_PREFIXES: [&str; 2] = ["/api/sa", "/api"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// The authenticated principal with its role resolved from storage.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: Role,
    permissions: Option<HashSet<PermissionCode>>,
}

impl Actor {
    pub fn new(user_id: Uuid, tenant_id: Option<Uuid>, role: Role) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
            permissions: None,
        }
    }

    pub fn with_permissions(mut self, codes: impl IntoIterator<Item = PermissionCode>) -> Self {
        self.permissions = Some(codes.into_iter().collect());
        self
    }

    /// Resolve the actor behind a session. The user's current role wins over the token's.
    pub async fn load(pool: &PgPool, auth: &AuthUser) -> Result<Self, AppError> {
        let user = db::users::find_by_id(pool, auth.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

        if user.tenant_id != auth.tenant_id {
            return Err(AppError::Unauthorized("Session does not match account".to_string()));
        }

        let role = db::roles::find_by_id(pool, user.role_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} has no role", user.id)))?;

        Ok(Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            role,
            permissions: None,
        })
    }

    pub fn is_superadmin(&self) -> bool {
        is_superadmin_role(&self.role.name)
    }

    pub fn permissions(&self) -> Option<&HashSet<PermissionCode>> {
        self.permissions.as_ref()
    }

    /// Load the role's permission codes on first use.
    pub async fn ensure_permissions(
        &mut self,
        pool: &PgPool,
    ) -> Result<&HashSet<PermissionCode>, AppError> {
        if self.permissions.is_none() {
            let codes = db::permissions::list_for_role(pool, self.role.id)
                .await?
                .iter()
                .filter_map(|p| p.permission_code())
                .collect();
            self.permissions = Some(codes);
        }
        Ok(self.permissions.get_or_insert_with(HashSet::new))
    }

    /// The actor's tenant. Superadmins have none and get `Forbidden` here.
    pub fn require_tenant(&self) -> Result<Uuid, AppError> {
        self.tenant_id
            .ok_or_else(|| AppError::Forbidden("This operation requires a tenant account".to_string()))
    }

    pub fn require_superadmin(&self) -> Result<(), AppError> {
        if self.is_superadmin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Superadmin access required".to_string()))
        }
    }
}

/// Set by the enforcement layer; unavailable on public routes.
impl FromRequestParts<SharedState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
    }
}

/// Decide on an actor whose permissions are already loaded.
pub fn decide(actor: &Actor, action: Action, resource: Resource) -> Decision {
    if actor.is_superadmin() {
        return Decision::allow("superadmin");
    }

    let code = PermissionCode::new(resource, action);
    match actor.permissions() {
        Some(codes) if codes.contains(&code) => {
            Decision::allow(format!("role '{}' grants {code}", actor.role.name))
        }
        Some(_) => Decision::deny(format!("role '{}' lacks {code}", actor.role.name)),
        None => Decision::deny(format!("permissions for role '{}' not loaded", actor.role.name)),
    }
}

pub async fn authorize(
    pool: &PgPool,
    actor: &mut Actor,
    action: Action,
    resource: Resource,
) -> Result<Decision, AppError> {
    if actor.is_superadmin() {
        return Ok(Decision::allow("superadmin"));
    }
    actor.ensure_permissions(pool).await?;
    Ok(decide(actor, action, resource))
}

/// Blanket check for a request: method and path must both map into the catalog.
pub async fn authorize_request(
    pool: &PgPool,
    actor: &mut Actor,
    method: &Method,
    path: &str,
) -> Result<Decision, AppError> {
    let Some(action) = action_for_method(method) else {
        return Ok(Decision::deny(format!("method {method} maps to no action")));
    };
    let Some(resource) = resource_for_path(path) else {
        return Ok(Decision::deny(format!("path {path} maps to no resource")));
    };
    authorize(pool, actor, action, resource).await
}

pub fn action_for_method(method: &Method) -> Option<Action> {
    match *method {
        Method::GET => Some(Action::Read),
        Method::POST => Some(Action::Create),
        Method::PUT | Method::PATCH => Some(Action::Update),
        Method::DELETE => Some(Action::Delete),
        _ => None,
    }
}

pub fn resource_for_path(path: &str) -> Option<Resource> {
    let rest = API_PREFIXES
        .iter()
        .find_map(|prefix| strip_segment_prefix(path, prefix))?;

    let segment = rest.split('/').find(|s| !s.is_empty())?;
    singularize(segment).parse().ok()
}

fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// English plural to singular, enough for collection names.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}y")
    } else if let Some(stem) = word.strip_suffix("sses") {
        format!("{stem}ss")
    } else if let Some(stem) = word.strip_suffix("ses") {
        format!("{stem}s")
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_must_end_on_segment_boundary() {
        assert_eq!(resource_for_path("/api/sample"), None);
        assert_eq!(resource_for_path("/apiusers"), None);
        assert_eq!(resource_for_path("/api/users"), Some(Resource::User));
    }

    #[test]
    fn singularize_handles_common_plurals() {
        assert_eq!(singularize("companies"), "company");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("roles"), "role");
        assert_eq!(singularize("workspaces"), "workspace");
        assert_eq!(singularize("file"), "file");
    }
}
