use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use crate::{
    api::error,
    modules::call::model::{LiveKitClaims, LiveKitConfig, TOKEN_TTL_SECONDS, VideoGrant},
};

#[derive(Clone)]
pub struct CallService {
    config: LiveKitConfig,
}

impl CallService {
    pub fn new(config: LiveKitConfig) -> Self {
        if !config.is_configured() {
            log::warn!("LiveKit credentials missing; room tokens will be refused");
        }
        Self { config }
    }

    /// Mint a join token for `room`, valid for one hour from `now`.
    pub fn room_token(
        &self,
        room: &str,
        username: &str,
        now: i64,
    ) -> Result<String, error::SystemError> {
        if !self.config.is_configured() {
            return Err(error::SystemError::InternalError(
                "LiveKit credentials are not configured".into(),
            ));
        }

        let claims = LiveKitClaims {
            iss: self.config.api_key.clone(),
            sub: username.to_string(),
            name: username.to_string(),
            iat: now,
            nbf: now,
            exp: now + TOKEN_TTL_SECONDS,
            video: VideoGrant {
                room: room.to_string(),
                room_join: true,
                can_publish: true,
                can_subscribe: true,
            },
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.api_secret.as_bytes()),
        )?;

        log::info!("Issued room token for {} in {}", username, room);
        Ok(token)
    }
}
