//! Resource/action vocabulary, the template catalog, and per-tenant cloning.
//!
//! Permission codes are always rendered `resource:action`. Seeding, cloning
//! and request-time checks all go through [`PermissionCode`], so the string
//! form only exists at the storage boundary.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Permission, Role};

/// Reserved, process-global role. Never cloned into tenants.
pub const SUPERADMIN_ROLE: &str = "superadmin";

pub fn is_superadmin_role(name: &str) -> bool {
    name.eq_ignore_ascii_case(SUPERADMIN_ROLE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    User,
    File,
    Workspace,
    Invite,
    Role,
    Tenant,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::User,
        Resource::File,
        Resource::Workspace,
        Resource::Invite,
        Resource::Role,
        Resource::Tenant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::File => "file",
            Resource::Workspace => "workspace",
            Resource::Invite => "invite",
            Resource::Role => "role",
            Resource::Tenant => "tenant",
        }
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("Unknown resource '{s}'"))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Unknown action '{s}'"))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionCode {
    pub resource: Resource,
    pub action: Action,
}

impl PermissionCode {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    pub fn parse_parts(resource: &str, action: &str) -> Option<Self> {
        Some(Self {
            resource: resource.parse().ok()?,
            action: action.parse().ok()?,
        })
    }

    /// Every code the catalog knows about.
    pub fn all() -> impl Iterator<Item = PermissionCode> {
        Resource::ALL
            .into_iter()
            .flat_map(|r| Action::ALL.into_iter().map(move |a| PermissionCode::new(r, a)))
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for PermissionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once(':')
            .ok_or_else(|| format!("Permission code '{s}' must be 'resource:action'"))?;
        Ok(PermissionCode {
            resource: resource.parse()?,
            action: action.parse()?,
        })
    }
}

impl Serialize for PermissionCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PermissionCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A template role as seeded into the global catalog.
pub struct TemplateRole {
    pub name: &'static str,
    pub is_default: bool,
    pub grants: Vec<PermissionCode>,
}

fn grants(table: &[(Resource, &[Action])]) -> Vec<PermissionCode> {
    table.iter()
        .flat_map(|(resource, actions)| {
            actions.iter().map(move |action| PermissionCode::new(*resource, *action))
        })
        .collect()
}

/// The template roles. Exactly one is the default.
pub fn template_roles() -> Vec<TemplateRole> {
    use Action as A;
    use Resource as R;

    const CRUD: &[Action] = &[A::Read, A::Create, A::Update, A::Delete];
    const EDIT: &[Action] = &[A::Read, A::Create, A::Update];

    vec![
        TemplateRole {
            name: "admin",
            is_default: true,
            grants: grants(&[
                (R::File, CRUD),
                (R::Workspace, CRUD),
                (R::User, CRUD),
                (R::Invite, CRUD),
                (R::Role, CRUD),
            ]),
        },
        TemplateRole {
            name: "member",
            is_default: false,
            grants: grants(&[
                (R::File, EDIT),
                (R::Workspace, EDIT),
                (R::User, &[A::Read]),
                (R::Invite, &[A::Read, A::Update]),
                (R::Role, &[A::Read]),
            ]),
        },
        TemplateRole {
            name: "guest",
            is_default: false,
            grants: grants(&[
                (R::File, EDIT),
                (R::Workspace, EDIT),
                (R::User, &[A::Read]),
                (R::Invite, &[A::Read, A::Update]),
            ]),
        },
        TemplateRole {
            name: SUPERADMIN_ROLE,
            is_default: false,
            grants: Vec::new(),
        },
    ]
}

pub async fn list_template_permissions(conn: &mut PgConnection) -> Result<Vec<Permission>, sqlx::Error> {
    db::permissions::list_templates(conn).await
}

/// Template roles that get cloned into tenants (the superadmin role is excluded).
pub async fn list_template_roles(conn: &mut PgConnection) -> Result<Vec<Role>, sqlx::Error> {
    db::roles::list_templates(conn, SUPERADMIN_ROLE).await
}

#[derive(Debug)]
pub struct ClonedCatalog {
    /// Template permission id -> the tenant's copy.
    pub permission_ids: HashMap<Uuid, Uuid>,
    pub roles: Vec<Role>,
}

/// Copy the template catalog into `tenant_id`.
///
/// Must run on a transaction connection; the caller rolls back on error.
pub async fn clone_for_tenant(
    conn: &mut PgConnection,
    tenant_id: Uuid,
) -> Result<ClonedCatalog, AppError> {
    let templates = list_template_permissions(&mut *conn).await?;
    let copies = db::permissions::copy_templates_into(&mut *conn, tenant_id).await?;

    let copy_by_code: HashMap<&str, Uuid> =
        copies.iter().map(|p| (p.code.as_str(), p.id)).collect();

    let mut permission_ids = HashMap::with_capacity(templates.len());
    for template in &templates {
        let copy = copy_by_code.get(template.code.as_str()).ok_or_else(|| {
            AppError::Internal(format!(
                "Permission {} was not cloned into tenant {tenant_id}",
                template.code
            ))
        })?;
        permission_ids.insert(template.id, *copy);
    }

    let template_roles = list_template_roles(&mut *conn).await?;
    let links = db::roles::template_links(&mut *conn).await?;

    let mut roles = Vec::with_capacity(template_roles.len());
    for template in template_roles {
        let role =
            db::roles::create(&mut *conn, Some(tenant_id), &template.name, template.is_default)
                .await?;

        let mut cloned_permissions = Vec::new();
        for (_, old_permission) in links.iter().filter(|(role_id, _)| *role_id == template.id) {
            let new_permission = permission_ids.get(old_permission).ok_or_else(|| {
                AppError::Internal(format!(
                    "Role {} references permission {old_permission} outside the template catalog",
                    template.name
                ))
            })?;
            cloned_permissions.push(*new_permission);
        }

        db::roles::attach_permissions(&mut *conn, role.id, &cloned_permissions).await?;
        roles.push(role);
    }

    tracing::debug!(
        %tenant_id,
        permissions = permission_ids.len(),
        roles = roles.len(),
        "Cloned template catalog"
    );

    Ok(ClonedCatalog {
        permission_ids,
        roles,
    })
}
