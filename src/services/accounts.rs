//! Signup, login and password reset.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::SessionKeys;
use crate::auth::{password, token};
use crate::db;
use crate::error::AppError;
use crate::rate_limit::LoginRateLimiter;
use crate::rbac::bootstrap;
use crate::services::{normalize_email, parse_email};

pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct SignupAck {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: String,
}

/// Create a tenant together with its owning user.
pub async fn signup(
    pool: &PgPool,
    email: &str,
    password: &str,
    tenant_name: &str,
) -> Result<SignupAck, AppError> {
    let email = parse_email(email)?;
    password::validate_strength(password).map_err(AppError::Validation)?;

    let tenant_name = tenant_name.trim();
    if tenant_name.is_empty() {
        return Err(AppError::Validation("Tenant name is required".to_string()));
    }

    let pw_hash = password::hash(password).map_err(AppError::Internal)?;
    let created = bootstrap::provision(pool, tenant_name, &email, &pw_hash).await?;

    Ok(SignupAck {
        user_id: created.owner.id,
        tenant_id: created.tenant.id,
    })
}

pub async fn login(
    pool: &PgPool,
    keys: &SessionKeys,
    limiter: &LoginRateLimiter,
    email: &str,
    password: &str,
) -> Result<Session, AppError> {
    let email = normalize_email(email);

    if let Err(retry_after) = limiter.check(&email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let Some(user) = db::users::find_by_email(pool, &email).await? else {
        limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    if !password::verify(password, &user.password_hash) {
        limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    limiter.clear(&email);

    let access_token = keys
        .issue(user.id, user.tenant_id, &user.role)
        .map_err(AppError::Internal)?;

    Ok(Session {
        access_token,
        token_type: "Bearer",
        user_id: user.id,
        tenant_id: user.tenant_id,
        role: user.role,
    })
}

/// Store a fresh reset token for the account. Unknown emails yield `None`.
///
/// The raw token is returned for out-of-band delivery and never persisted.
pub async fn init_password_reset(pool: &PgPool, email: &str) -> Result<Option<String>, AppError> {
    let email = normalize_email(email);
    let Some(user) = db::users::find_by_email(pool, &email).await? else {
        return Ok(None);
    };

    let issued = token::generate().map_err(AppError::Internal)?;
    let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
    db::users::set_reset_token(pool, user.id, &issued.hash, expires_at).await?;

    tracing::info!(user_id = %user.id, "Password reset requested");
    Ok(Some(issued.raw))
}

pub async fn reset_password(
    pool: &PgPool,
    email: &str,
    raw_token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    password::validate_strength(new_password).map_err(AppError::Validation)?;

    let invalid = || AppError::Validation("Invalid or expired reset token".to_string());

    let email = normalize_email(email);
    let user = db::users::find_by_email(pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let (Some(stored), Some(expires_at)) = (&user.reset_token_hash, user.reset_token_expires_at)
    else {
        return Err(invalid());
    };
    if expires_at <= Utc::now() || !token::verify(raw_token, stored) {
        return Err(invalid());
    }

    let pw_hash = password::hash(new_password).map_err(AppError::Internal)?;
    let updated = db::users::complete_password_reset(pool, user.id, stored, &pw_hash).await?;
    if updated == 0 {
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, "Password reset completed");
    Ok(())
}
