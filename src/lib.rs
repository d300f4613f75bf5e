pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod rbac;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::SessionKeys;
use crate::config::Config;
use crate::email::{Mailer, SystemMailer};
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_state(pool: PgPool, config: Config) -> SharedState {
    let mailer = config.smtp.as_ref().and_then(|smtp| match SystemMailer::new(smtp) {
        Ok(mailer) => {
            tracing::info!("System SMTP configured");
            Some(Arc::new(mailer) as Arc<dyn Mailer>)
        }
        Err(e) => {
            tracing::warn!("System SMTP not available: {e}");
            None
        }
    });

    let keys = SessionKeys::from_secret(&config.jwt_secret);

    Arc::new(AppState {
        pool,
        config,
        keys,
        mailer,
        login_limiter: LoginRateLimiter::new(),
    })
}

pub fn router(state: SharedState) -> Router {
    let protected = routes::protected_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::rbac::enforce,
    ));

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    Router::new()
        .merge(routes::public_routes())
        .merge(protected)
        .route("/health", axum::routing::get(health))
        .layer(layers)
        .with_state(state)
}

pub fn build_app(pool: PgPool, config: Config) -> Router {
    router(build_state(pool, config))
}

async fn health() -> &'static str {
    "ok"
}
