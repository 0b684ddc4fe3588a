use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Accepted friendship. `user1_id` is the user who accepted the request.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ContactEntity {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub conversation_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ContactEntity {
    pub fn other_party(&self, user_id: &Uuid) -> Uuid {
        if self.user1_id == *user_id { self.user2_id } else { self.user1_id }
    }
}
