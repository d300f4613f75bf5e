use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::audit;
use crate::services::accounts::{self, Session, SignupAck};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub tenant_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupAck>), AppError> {
    let ack = accounts::signup(&state.pool, &req.email, &req.password, &req.tenant_name).await?;

    audit::log_event(
        &state.pool,
        Some(ack.tenant_id),
        Some(ack.user_id),
        "tenant.signed_up",
        "tenant",
        Some(ack.tenant_id),
        None,
    )
    .await;

    Ok((StatusCode::CREATED, Json(ack)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = accounts::login(
        &state.pool,
        &state.keys,
        &state.login_limiter,
        &req.email,
        &req.password,
    )
    .await?;

    audit::log_event(
        &state.pool,
        session.tenant_id,
        Some(session.user_id),
        "user.login",
        "user",
        Some(session.user_id),
        None,
    )
    .await;

    Ok(Json(session))
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Same answer whether or not the email is registered
    let response = Json(MessageResponse {
        message: "If that email is registered, a reset link has been sent.".to_string(),
    });

    let pool = state.pool.clone();
    let mailer = state.mailer.clone();
    let base_url = state.config.base_url.clone();

    tokio::spawn(async move {
        let email = crate::services::normalize_email(&req.email);
        let token = match accounts::init_password_reset(&pool, &email).await {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Failed to start password reset: {e}");
                return;
            }
        };

        if let Some(mailer) = mailer {
            let reset_url = format!("{base_url}/auth/reset-password?token={token}");
            if let Err(e) = mailer.send_password_reset(&email, &reset_url).await {
                tracing::error!("Failed to send password reset email: {e}");
            }
        } else {
            tracing::warn!("System SMTP not configured. Password reset token for {email}: {token}");
        }
    });

    Ok(response)
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    accounts::reset_password(&state.pool, &req.email, &req.token, &req.password).await?;

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}
