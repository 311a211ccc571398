use super::events::RelayJob;
use crate::common::response::{ErrorResponse, OkResponse};
use crate::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};

/// Run a relay job to completion
///
/// Answers only after the job has finished; `ok` mirrors the job outcome.
#[utoipa::path(
    post,
    path = "/task/process",
    request_body = RelayJob,
    responses(
        (status = 200, description = "Job finished", body = OkResponse),
        (status = 403, description = "Missing or wrong task key", body = ErrorResponse)
    ),
    tag = "Relay",
    security(("task_key" = []))
)]
pub async fn process_task(
    State(state): State<AppState>,
    Json(job): Json<RelayJob>,
) -> impl IntoResponse {
    let outcome = state.processor.process(&job).await;
    OkResponse::new(outcome.ok())
}
