use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Direct (two members, `name` absent) or group (`name` present) conversation.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ConversationEntity {
    pub id: Uuid,
    pub name: Option<String>,
    pub is_group: bool,
    pub last_message_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub conversation_id: Uuid,
    pub last_seen_message_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
