use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::{MessageEntity, MessageType};

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub message_type: MessageType,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageBody {
    pub conversation_id: Uuid,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[validate(length(min = 1, message = "Message content must not be empty"))]
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedMessage {
    pub id: Uuid,
}

/// One entry of the message feed.
#[derive(Debug, Clone, Serialize)]
pub struct MessageFeedItem {
    #[serde(flatten)]
    pub message: MessageEntity,
    pub sender_name: String,
    pub sender_image: String,
    pub is_current_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen: Option<String>,
}

/// "A seen", "A and B seen", "A, B and N others seen".
pub fn format_seen_by(names: &[&str]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some(format!("{only} seen")),
        [first, second] => Some(format!("{first} and {second} seen")),
        [first, second, rest @ ..] => {
            Some(format!("{first}, {second} and {} others seen", rest.len()))
        }
    }
}
