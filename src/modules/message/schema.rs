use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Audio,
    Pdf,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub conversation_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MessageEntity {
    /// One-line summary shown in the conversation list.
    pub fn preview(&self) -> String {
        match self.message_type {
            MessageType::Text => self.content.join(" "),
            MessageType::Image => "📷 Image".to_string(),
            MessageType::Audio => "🔊 Audio".to_string(),
            MessageType::Pdf => "📎 Attachment".to_string(),
        }
    }
}
