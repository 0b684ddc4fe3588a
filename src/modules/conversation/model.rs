use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{conversation::schema::ConversationEntity, user::model::UserResponse};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastMessageSummary {
    pub sender: String,
    pub content: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// One row of the caller's conversation list.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationListItem {
    pub conversation: ConversationEntity,
    pub unseen_count: i64,
    pub last_message: Option<LastMessageSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_member: Option<UserResponse>,
}

impl ConversationListItem {
    pub fn last_activity(&self) -> chrono::DateTime<chrono::Utc> {
        self.last_message.as_ref().map_or(self.conversation.created_at, |m| m.timestamp)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OtherMember {
    #[serde(flatten)]
    pub profile: UserResponse,
    pub last_seen_message_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupMember {
    pub id: Uuid,
    pub username: String,
    pub last_seen_message_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: ConversationEntity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_member: Option<OtherMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_members: Option<Vec<GroupMember>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub id: Uuid,
    pub username: String,
    pub image_url: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationMembers {
    pub conversation: ConversationEntity,
    pub members: Vec<MemberProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCreated {
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupBody {
    #[validate(length(min = 1, max = 64, message = "Group name must be 1-64 characters long"))]
    pub name: String,
    #[validate(length(min = 1, message = "At least one member is required"))]
    pub members: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkAsReadBody {
    pub message_id: Uuid,
}
