//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_project, get_my_profile, get_project, get_user_profile, list_projects, login,
    update_my_profile, update_password, AppState,
};
use super::middleware::{
    api_rate_limit, auth_rate_limit, create_cors_layer, jwt_auth, security_headers, JwtState,
    RateLimitState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: &[String],
) -> Router {
    // Login is limited per address; password changes are limited per
    // identity by the handler once the session is known
    let auth_limit = rate_limit.clone();
    let auth_routes = Router::new()
        .route(
            "/login",
            post(login).route_layer(middleware::from_fn(move |req, next| {
                let state = auth_limit.clone();
                auth_rate_limit(state, req, next)
            })),
        )
        .route("/protected/updatePassword", post(update_password))
        .layer(Extension(rate_limit.clone()));

    let api_limit = rate_limit;
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/profile/me", get(get_my_profile).put(update_my_profile))
        .route("/users/:id/profile", get(get_user_profile))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_project))
        .layer(middleware::from_fn(move |req, next| {
            let state = api_limit.clone();
            api_rate_limit(state, req, next)
        }));

    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
