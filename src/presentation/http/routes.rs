//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{
    auth_middleware, create_security_headers_layer, optional_auth_middleware, rate_limit_api,
    rate_limit_auth, rate_limit_shoutbox, require_admin, require_moderator, track_http_metrics,
};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        // Request count/latency metrics for every route
        .layer(middleware::from_fn(track_http_metrics))
        // Security headers on every response
        .layer(create_security_headers_layer())
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes (auth has its own stricter rate limiting)
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/forum", forum_routes())
        .nest("/forums", forums_routes(state.clone()))
        .nest("/threads", thread_routes(state.clone()))
        .nest("/posts", post_routes(state.clone()))
        .nest("/shoutbox", shoutbox_routes(state.clone()))
        .nest("/wallet", wallet_routes(state.clone()))
        .nest("/shop", shop_routes(state.clone()))
        .nest("/leaderboard", leaderboard_routes())
        .nest("/mod", mod_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        // Apply API rate limiting to all API routes
        .route_layer(middleware::from_fn_with_state(state, rate_limit_api))
}

/// Authentication routes (public, with stricter rate limiting)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_auth))
}

/// User routes: public profiles plus the protected `@me` surface
fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/@me",
            get(handlers::user::get_current_user).patch(handlers::user::update_current_user),
        )
        .route("/@me/titles", get(handlers::shop::owned_titles))
        .route("/@me/badges", get(handlers::shop::owned_badges))
        .route("/@me/title", put(handlers::shop::equip_title))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    protected.route("/{user_id}", get(handlers::user::get_user))
}

/// Forum structure routes (public)
fn forum_routes() -> Router<AppState> {
    Router::new().route("/structure", get(handlers::forum::get_structure))
}

/// Individual forum routes: public reads, authenticated thread creation
fn forums_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/{forum_id}/threads", post(handlers::thread::create_thread))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    protected
        .route("/{forum_id}", get(handlers::forum::get_node))
        .route("/slug/{slug}", get(handlers::forum::get_node_by_slug))
        .route("/{forum_id}/threads", get(handlers::thread::list_threads))
}

/// Thread routes: public reads, authenticated replies
fn thread_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/{thread_id}/posts", post(handlers::thread::create_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    protected
        .route("/{thread_id}", get(handlers::thread::get_thread))
        .route("/{thread_id}/posts", get(handlers::thread::list_posts))
}

/// Post routes (protected)
fn post_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{post_id}", patch(handlers::thread::edit_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Shoutbox routes: optional auth on reads so polling refreshes presence
fn shoutbox_routes(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/messages", get(handlers::shoutbox::get_messages))
        .route("/online", get(handlers::shoutbox::online))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let writes = Router::new()
        .route("/messages", post(handlers::shoutbox::post_message))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    reads
        .merge(writes)
        .route_layer(middleware::from_fn_with_state(state, rate_limit_shoutbox))
}

/// Wallet routes (protected)
fn wallet_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/balance", get(handlers::wallet::balance))
        .route("/history", get(handlers::wallet::history))
        .route("/tip", post(handlers::wallet::tip))
        .route("/rain", post(handlers::wallet::rain))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Shop routes: public catalog, authenticated purchases
fn shop_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/purchase", post(handlers::shop::purchase))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    protected.route("/items", get(handlers::shop::catalog))
}

/// Leaderboard routes (public)
fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/xp", get(handlers::user::leaderboard))
}

/// Moderator routes (moderator or admin token required)
fn mod_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts/{post_id}", delete(handlers::moderation::delete_post))
        .route(
            "/threads/{thread_id}/lock",
            post(handlers::moderation::lock_thread).delete(handlers::moderation::unlock_thread),
        )
        .route(
            "/threads/{thread_id}/pin",
            post(handlers::moderation::pin_thread).delete(handlers::moderation::unpin_thread),
        )
        .route(
            "/shouts/{shout_id}",
            delete(handlers::moderation::delete_shout),
        )
        .route("/activity", get(handlers::moderation::audit_log))
        .route_layer(middleware::from_fn(require_moderator))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Admin routes (admin token required)
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/forum/nodes", post(handlers::forum::create_node))
        .route(
            "/forum/nodes/{node_id}",
            patch(handlers::forum::update_node).delete(handlers::forum::delete_node),
        )
        .route("/users", get(handlers::moderation::list_users))
        .route(
            "/users/{user_id}/balance",
            post(handlers::moderation::adjust_balance),
        )
        .route("/users/{user_id}/role", put(handlers::moderation::set_role))
        .route("/titles/grant", post(handlers::moderation::grant_title))
        .route("/shop/items", post(handlers::shop::create_item))
        .route(
            "/shop/items/{item_id}",
            patch(handlers::shop::set_item_active),
        )
        .route("/audit-log", get(handlers::moderation::audit_log))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
