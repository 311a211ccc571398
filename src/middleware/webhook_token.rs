use crate::common::response::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// The webhook path carries the bot token; anything else is refused before
/// the body is read.
pub async fn webhook_token_guard(
    State(state): State<AppState>,
    Path(token): Path<String>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if token != state.config.bot_token {
        warn!("Rejected webhook call with bad token");
        return Err(ApiError("bad token".to_string(), StatusCode::FORBIDDEN));
    }

    Ok(next.run(req).await)
}
