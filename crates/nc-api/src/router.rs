//! Route definitions for the administrative HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(pool_routes())
        .merge(team_routes())
        .merge(number_routes())
        .merge(schedule_routes())
        .merge(admin_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.current().server);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Pool builder, inspection, deletion, activation cycle
fn pool_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pools",
            get(handlers::pools::list_pools).post(handlers::pools::create_pool),
        )
        .route(
            "/pools/{id}",
            get(handlers::pools::get_pool).delete(handlers::pools::delete_pool),
        )
        .route("/pools/{id}/subpools", get(handlers::pools::list_subpools))
        .route(
            "/pools/{id}/subpools/activate",
            post(handlers::pools::activate_pool),
        )
        .route("/subpools/activate", post(handlers::pools::activate_all))
}

fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(handlers::teams::list_teams))
        .route("/teams/sync-actuality", post(handlers::teams::sync_actuality))
        .route("/teams/{id}/rotate", post(handlers::teams::rotate_team))
}

/// Include/exclude and redistribution
fn number_routes() -> Router<AppState> {
    Router::new()
        .route("/numbers/exclude", post(handlers::numbers::exclude_numbers))
        .route("/numbers/include", post(handlers::numbers::include_numbers))
        .route("/numbers/move", post(handlers::numbers::move_numbers))
}

fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/schedules",
            get(handlers::schedules::list_schedules).post(handlers::schedules::create_schedule),
        )
        .route(
            "/schedules/{id}",
            axum::routing::delete(handlers::schedules::delete_schedule),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/config/reload", post(handlers::admin::reload_config))
}
