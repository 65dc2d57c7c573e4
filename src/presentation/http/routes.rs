//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

use super::handlers;
use crate::presentation::middleware::{
    auth_middleware, create_security_headers_layer, rate_limit_api, rate_limit_auth,
    rate_limit_websocket, track_metrics,
};
use crate::presentation::websocket::ws_handler;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.settings.uploads.dir);

    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        .merge(gateway_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .nest_service("/uploads", uploads)
        .fallback(route_not_found)
        .layer(middleware::from_fn(track_metrics))
        // Outermost, so every response carries the headers
        .layer(create_security_headers_layer(state.settings.is_production()))
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// WebSocket gateway, rate limited on its own
fn gateway_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/gateway", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_websocket))
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes(state.clone()))
        .nest("/posts", post_routes(state.clone()))
        .nest("/room", room_routes(state.clone()))
        .nest("/notifications", notification_routes(state.clone()))
        .nest("/savedposts", saved_post_routes(state))
}

/// Wrap routes that need a bearer token.
///
/// Auth is the outer layer so the rate limiter keys on the user id.
fn protected(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

fn public(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api))
}

/// User routes; signup and login carry the stricter auth limit
fn user_routes(state: AppState) -> Router<AppState> {
    let auth = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_auth));

    let users = Router::new()
        .route("/me", get(handlers::user::get_current_user))
        .route("/follow/{id}", post(handlers::user::follow))
        .route("/unfollow/{id}", post(handlers::user::unfollow))
        .route("/{id}", get(handlers::user::get_user))
        .route("/{id}/followers", get(handlers::user::followers))
        .route("/{id}/following", get(handlers::user::following));

    auth.merge(protected(users, &state))
}

/// Post and comment routes; reads are public
fn post_routes(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/", get(handlers::post::get_all_posts))
        .route("/user/{id}", get(handlers::post::get_user_posts))
        .route("/{id}", get(handlers::post::get_post))
        .route("/{id}/comments", get(handlers::comment::get_post_comments));

    let writes = Router::new()
        .route("/", post(handlers::post::create_post))
        .route("/{id}", delete(handlers::post::delete_post))
        .route("/like-post/{id}", post(handlers::post::like_post))
        .route("/dislike-post/{id}", post(handlers::post::dislike_post))
        .route("/comment/{id}", post(handlers::comment::create_comment))
        .route("/{id}/comments/{comment_id}", delete(handlers::comment::delete_comment));

    public(reads, &state).merge(protected(writes, &state))
}

/// Direct-message routes (protected)
fn room_routes(state: AppState) -> Router<AppState> {
    let rooms = Router::new()
        .route("/", get(handlers::room::list_rooms))
        .route("/create", post(handlers::room::create_room))
        .route("/last-message/{id}/{other_id}", get(handlers::room::get_last_message))
        .route("/unread-messages/{id}", get(handlers::room::get_unread_messages_count))
        .route("/{id}/createMessage", post(handlers::room::create_message))
        .route("/{id}/messages", get(handlers::room::get_room_messages))
        .route("/{id}/{other_id}", get(handlers::room::get_messages_between));

    protected(rooms, &state)
}

/// Notification routes (protected)
fn notification_routes(state: AppState) -> Router<AppState> {
    let notifications = Router::new()
        .route("/", get(handlers::notification::get_notifications))
        .route(
            "/mark-notification-as-seen",
            post(handlers::notification::mark_notifications_as_seen),
        );

    protected(notifications, &state)
}

/// Saved post routes (protected)
fn saved_post_routes(state: AppState) -> Router<AppState> {
    let saved = Router::new()
        .route("/", get(handlers::saved_post::get_saved_posts))
        .route("/save/{id}", post(handlers::saved_post::save_post))
        .route("/unsave/{id}", delete(handlers::saved_post::unsave_post));

    protected(saved, &state)
}
