pub mod auth;
pub mod invites;
pub mod roles;
pub mod tenants;
pub mod users;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::SharedState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/password/forgot", post(auth::forgot_password))
        .route("/api/auth/password/reset", post(auth::reset_password))
        .route("/api/invites/accept", put(invites::accept))
}

/// Routes behind the bearer session and blanket authorization.
pub fn protected_routes() -> Router<SharedState> {
    let invite_collection = get(invites::list)
        .post(invites::create)
        .delete(invites::remove);
    let user_collection = get(users::list);
    let role_collection = get(roles::list).post(roles::create);
    let tenant_collection = get(tenants::list).post(tenants::create);

    Router::new()
        // Invites
        .route("/api/invites", invite_collection.clone())
        .route("/api/invites/", invite_collection)
        .route("/api/invites/{id}", delete(invites::remove_by_id))
        .route("/api/invites/{id}/resend", post(invites::resend))
        // Users
        .route("/api/users", user_collection.clone())
        .route("/api/users/", user_collection)
        .route("/api/users/{id}", get(users::get).delete(users::delete))
        .route("/api/users/{id}/role", put(users::update_role))
        // Roles
        .route("/api/roles", role_collection.clone())
        .route("/api/roles/", role_collection)
        .route("/api/roles/{id}", delete(roles::delete))
        .route(
            "/api/roles/{id}/permissions",
            post(roles::grant).delete(roles::revoke),
        )
        // Superadmin
        .route("/api/sa/tenants", tenant_collection.clone())
        .route("/api/sa/tenants/", tenant_collection)
        .route(
            "/api/sa/tenants/{id}",
            get(tenants::get).delete(tenants::delete),
        )
}
