use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::post;

pub mod events;
pub mod handler;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/process", post(handler::process_task))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::task_key::task_key_guard,
        ))
}
