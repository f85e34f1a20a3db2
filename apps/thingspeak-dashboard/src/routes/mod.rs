pub mod dashboard;
pub mod data;
pub mod health;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;
use crate::static_assets::apply_cache_headers;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(dashboard::router())
        .merge(data::router())
        .layer(from_fn(apply_cache_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
