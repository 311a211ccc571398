use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One fetch-and-republish unit. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelayJob {
    pub chat_id: i64,
    pub mega_url: String,
}
