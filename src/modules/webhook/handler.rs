use super::dto::TelegramUpdate;
use super::service::{Dispatched, WebhookService};
use crate::common::response::{ApiError, ErrorResponse, OkResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error};

/// Receive a Telegram update
#[utoipa::path(
    post,
    path = "/webhook/{token}",
    params(
        ("token" = String, Path, description = "Bot token")
    ),
    request_body = TelegramUpdate,
    responses(
        (status = 200, description = "Update accepted", body = OkResponse),
        (status = 403, description = "Token mismatch", body = ErrorResponse),
        (status = 502, description = "Chat API unreachable", body = ErrorResponse)
    ),
    tag = "Relay"
)]
pub async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<TelegramUpdate>,
) -> impl IntoResponse {
    match WebhookService::handle(&state, update).await {
        Ok(Some(Dispatched { job, handle })) => {
            debug!(chat_id = job.chat_id, "Relay job handed off");
            // the job keeps running after its handle is dropped
            drop(handle);
            OkResponse::new(true).into_response()
        }
        Ok(None) => OkResponse::new(true).into_response(),
        Err(e) => {
            error!(error = ?e, "Could not acknowledge relay request");
            ApiError(e.to_string(), StatusCode::BAD_GATEWAY).into_response()
        }
    }
}
