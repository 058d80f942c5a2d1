//! API layer - HTTP handlers and routing
//!
//! Route groups:
//! - public: posts, archive, tags, memos, links, site info, setup/login
//! - admin: post/tag/memo/link management and the account endpoints,
//!   guarded by the session-token middleware

pub mod auth;
pub mod links;
pub mod memos;
pub mod middleware;
pub mod posts;
pub mod responses;
pub mod site;
pub mod tags;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .nest("/admin/posts", posts::admin_router())
        .nest("/admin/tags", tags::admin_router())
        .nest("/admin/memos", memos::admin_router())
        .nest("/admin/links", links::admin_router())
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    Router::new()
        .nest("/posts", posts::public_router())
        .route("/archive", get(posts::get_archive))
        .nest("/tags", tags::public_router())
        .nest("/memos", memos::public_router())
        .nest("/links", links::public_router())
        .nest("/site", site::router())
        .nest("/auth", auth::public_router())
        .merge(admin_routes)
}

/// Build the complete router with middleware layers
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
