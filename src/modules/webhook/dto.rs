use serde::Deserialize;
use utoipa::ToSchema;

/// The subset of a Telegram `Update` the relay looks at.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TelegramUpdate {
    pub message: Option<IncomingMessage>,
    pub edited_message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: i64,
    pub text: String,
}

impl TelegramUpdate {
    /// `message` wins over `edited_message`; missing text becomes empty.
    pub fn into_event(self) -> Option<InboundEvent> {
        let message = self.message.or(self.edited_message)?;

        Some(InboundEvent {
            chat_id: message.chat.id,
            text: message.text.unwrap_or_default().trim().to_string(),
        })
    }
}
