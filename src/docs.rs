use crate::common::response::{ErrorResponse, OkResponse};
use crate::modules::task::events::RelayJob;
use crate::modules::webhook::dto::{Chat, IncomingMessage, TelegramUpdate};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::modules::webhook::handler::receive_update,
        crate::modules::task::handler::process_task,
    ),
    components(
        schemas(OkResponse, ErrorResponse, TelegramUpdate, IncomingMessage, Chat, RelayJob)
    ),
    tags(
        (name = "Relay", description = "MEGA link relay")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "task_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Task-Key"))),
            );
        }
    }
}
