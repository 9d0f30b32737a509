//! Route definitions for the Cold Storage Inventory backend

use axum::{middleware, routing::post, Router};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Protected routes - report index
        .route("/getAllReports", post(handlers::list_reports))
        // Protected routes - snapshot trigger
        .route("/report/run", post(handlers::run_snapshot))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
