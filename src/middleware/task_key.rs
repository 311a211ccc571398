use crate::common::response::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::warn;

pub const TASK_KEY_HEADER: &str = "x-task-key";

/// Rejects task calls whose `X-Task-Key` does not match the configured secret.
/// An empty secret rejects everything.
pub async fn task_key_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(TASK_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let expected = state.config.task_secret.as_bytes();
    if !state.config.task_secret_configured() || !constant_time_eq(provided.as_bytes(), expected) {
        warn!(has_key = !provided.is_empty(), "Rejected task call");
        return Err(ApiError(
            "unauthorized task caller".to_string(),
            StatusCode::FORBIDDEN,
        ));
    }

    Ok(next.run(req).await)
}

/// Compares every byte so the mismatch position does not affect timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
