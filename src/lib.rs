pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod roles;
pub mod state;
pub mod supabase;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full `/api` router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    Router::new()
        .merge(system_routes())
        .merge(auth_routes())
        .merge(plan_routes())
        .merge(user_routes())
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn system_routes() -> Router<AppState> {
    use handlers::system;

    Router::new()
        .route("/api/health", get(system::health))
        .route("/api/roles", get(system::roles))
        .route("/api/sync/time", get(system::sync_time))
        .route("/api/actions/echo", post(system::echo))
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/me", get(auth::me))
}

fn plan_routes() -> Router<AppState> {
    use handlers::plans;

    Router::new()
        .route("/api/plans", get(plans::list_plans))
        .route("/api/admin/plans", post(plans::create_plan))
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        .route("/api/user/investments", post(user::create_investment))
        .route("/api/user/my-investments", get(user::my_investments))
        .route("/api/user/transactions", post(user::create_transaction))
        .route("/api/user/my-transactions", get(user::my_transactions))
}

// An explicit frontend origin gets credentials support; without one we fall
// back to the permissive dev setup (which cannot carry credentials).
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
        None => CorsLayer::permissive(),
    }
}
