use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::Env;

pub const TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Default)]
pub struct LiveKitConfig {
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl LiveKitConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            url: env.livekit_url.clone(),
            api_key: env.livekit_api_key.clone(),
            api_secret: env.livekit_api_secret.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoomTokenQuery {
    #[validate(length(min = 1, message = "room is required"))]
    pub room: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

/// Access token claims understood by the LiveKit server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveKitClaims {
    pub iss: String,
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}
