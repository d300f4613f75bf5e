use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::rbac::authorize::{self, Actor};
use crate::state::SharedState;

/// Blanket authorization for the protected router.
///
/// Resolves the session into an [`Actor`], checks the method/path pair
/// against the actor's role and hands the actor to the handler.
pub async fn enforce(
    State(state): State<SharedState>,
    auth: AuthUser,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut actor = Actor::load(&state.pool, &auth).await?;

    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let method = req.method().clone();

    let decision = authorize::authorize_request(&state.pool, &mut actor, &method, &path).await?;
    if !decision.allowed {
        tracing::info!(
            user_id = %actor.user_id,
            %method,
            path = %path,
            reason = %decision.reason,
            "Access denied"
        );
        return Err(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ));
    }

    tracing::debug!(user_id = %actor.user_id, %method, path = %path, reason = %decision.reason, "Access granted");

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}
