//! Route table.

pub mod api;
pub mod auth;
pub mod pages;
pub mod theme;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::session_gate;
use crate::state::AppState;

/// Every route, behind the session gate and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api::routes())
        .merge(auth::routes())
        .merge(theme::routes())
        .merge(pages::routes())
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), session_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
