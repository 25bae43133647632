use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{method_not_allowed, not_found, redirect_handler, shorten_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route(
                "/shorten",
                post(shorten_handler).fallback(method_not_allowed),
            )
            // `get` would also answer HEAD, which must not record a visit.
            .route(
                "/{code}",
                get(redirect_handler).head(not_found).fallback(not_found),
            )
            .fallback(not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
