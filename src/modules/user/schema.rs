use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserEntity {
    /// First word of the display name, used in read receipts.
    pub fn first_name(&self) -> &str {
        self.username.split_whitespace().next().unwrap_or(&self.username)
    }
}
