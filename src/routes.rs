use crate::common::response::OkResponse;
use crate::docs::ApiDoc;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn configure_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(health))
        .nest("/webhook", crate::modules::webhook::router(state.clone()))
        .nest("/task", crate::modules::task::router(state))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = OkResponse)
    ),
    tag = "Relay"
)]
pub async fn health() -> OkResponse {
    OkResponse::new(true)
}
