use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::model::UserResponse;

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub conversation_id: Uuid,
    #[serde(flatten)]
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub sender: UserResponse,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestCreated {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedResponse {
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}
