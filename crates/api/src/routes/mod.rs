//! API routes

pub mod admin;
pub mod contacts;
pub mod developers;
pub mod events;
pub mod health;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{auth::require_admin, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // `route_layer` so unknown paths stay 404 instead of 401
    let admin_only = || middleware::from_fn_with_state(state.clone(), require_admin);

    let admin_routes = Router::new()
        .route("/register", post(admin::register))
        .route("/login", post(admin::login))
        .route("/refresh-token", post(admin::refresh_token))
        .merge(
            Router::new()
                .route("/logout", post(admin::logout))
                .route("/profile", get(admin::profile))
                .route("/change-password", post(admin::change_password))
                .route_layer(admin_only()),
        );

    let event_routes = Router::new()
        .route("/", get(events::list_published))
        .route("/view/:id", get(events::view))
        .merge(
            Router::new()
                .route("/admin", get(events::list_mine))
                .route("/create", post(events::create))
                .route("/update/:id", put(events::update))
                .route("/delete/:id", delete(events::delete))
                .route_layer(admin_only()),
        );

    let developer_routes = Router::new()
        .route("/", get(developers::list))
        .route("/view/:id", get(developers::view))
        .merge(
            Router::new()
                .route("/create", post(developers::create))
                .route("/update/:id", put(developers::update))
                .route("/delete/:id", delete(developers::delete))
                .route_layer(admin_only()),
        );

    let contact_routes = Router::new()
        .route("/create", post(contacts::create))
        .merge(
            Router::new()
                .route("/", get(contacts::list))
                .route("/view/:id", get(contacts::view))
                .route("/delete/:id", delete(contacts::delete))
                .route_layer(admin_only()),
        );

    let health_routes = Router::new()
        .route("/", get(health::health))
        .route("/live", get(health::liveness));

    let body_limit = state.config.max_request_body_bytes;

    Router::new()
        .nest("/api/admin", admin_routes)
        .nest("/api/events", event_routes)
        .nest("/api/developers", developer_routes)
        .nest("/api/contact", contact_routes)
        .nest("/api/health", health_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
