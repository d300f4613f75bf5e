use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rbac::catalog::PermissionCode;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub resource: String,
    pub action: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl Permission {
    pub fn permission_code(&self) -> Option<PermissionCode> {
        PermissionCode::parse_parts(&self.resource, &self.action)
    }
}
