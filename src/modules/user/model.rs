use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::user::schema::UserEntity;

pub const DEFAULT_STATUS: &str = "Just came onboard! 🚀";

/// Profile fields synced from the identity provider.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub external_id: String,
    pub username: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateStatusModel {
    #[validate(length(min = 1, max = 120, message = "Status must be 1-120 characters long"))]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub status: String,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            image_url: entity.image_url,
            status: entity.status,
        }
    }
}
