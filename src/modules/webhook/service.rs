use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use log::{debug, info, warn};
use sha2::Sha256;

use crate::{
    api::error::{self, ChatError},
    modules::{
        user::{schema::UserEntity, service::UserService},
        webhook::model::{ProviderUser, WebhookEvent},
    },
};

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const TIMESTAMP_TOLERANCE_SECONDS: i64 = 5 * 60;

/// The three `svix-*` delivery headers.
#[derive(Debug, Clone)]
pub struct SvixHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

/// Verifies Svix-signed deliveries against the shared signing secret.
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn from_secret(secret: &str) -> Result<Self, error::SystemError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = BASE64
            .decode(encoded)
            .map_err(|e| error::SystemError::bad_request(format!("Invalid webhook secret: {e}")))?;
        Ok(Self { key })
    }

    fn mac(&self, headers: &SvixHeaders, body: &[u8]) -> Result<HmacSha256, ChatError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| ChatError::WebhookSignature)?;
        mac.update(headers.id.as_bytes());
        mac.update(b".");
        mac.update(headers.timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    pub fn verify(&self, headers: &SvixHeaders, body: &[u8], now: i64) -> Result<(), ChatError> {
        let timestamp: i64 =
            headers.timestamp.trim().parse().map_err(|_| ChatError::WebhookSignature)?;
        if (now - timestamp).abs() > TIMESTAMP_TOLERANCE_SECONDS {
            debug!("Webhook timestamp {timestamp} outside tolerance");
            return Err(ChatError::WebhookSignature);
        }

        let mac = self.mac(headers, body)?;
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|candidate| candidate.strip_prefix("v1,"))
            .filter_map(|encoded| BASE64.decode(encoded).ok())
            .any(|signature| mac.clone().verify_slice(&signature).is_ok());

        if matched { Ok(()) } else { Err(ChatError::WebhookSignature) }
    }

    #[cfg(test)]
    pub fn sign(&self, headers: &SvixHeaders, body: &[u8]) -> String {
        let mac = self.mac(headers, body).unwrap();
        format!("v1,{}", BASE64.encode(mac.finalize().into_bytes()))
    }
}

#[derive(Clone)]
pub struct WebhookService {
    verifier: std::sync::Arc<WebhookVerifier>,
    user_service: UserService,
}

impl WebhookService {
    pub fn with_dependencies(
        verifier: std::sync::Arc<WebhookVerifier>,
        user_service: UserService,
    ) -> Self {
        WebhookService { verifier, user_service }
    }

    /// Verify, then apply one delivery. Returns the synced row for user events.
    pub async fn process(
        &self,
        headers: &SvixHeaders,
        body: &[u8],
        now: i64,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        self.verifier.verify(headers, body, now).inspect_err(|_| {
            warn!("Rejected webhook delivery {}", headers.id);
        })?;

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|e| error::SystemError::bad_request(format!("Malformed webhook: {e}")))?;

        match event.kind.as_str() {
            "user.created" | "user.updated" => {
                let user: ProviderUser = serde_json::from_value(event.data)
                    .map_err(|e| error::SystemError::bad_request(format!("Malformed user: {e}")))?;
                let upsert = user
                    .into_upsert()
                    .ok_or_else(|| error::SystemError::bad_request("User has no email address"))?;

                let entity = self.user_service.sync_profile(upsert).await?;
                info!("Processed {} for {}", event.kind, entity.external_id);
                Ok(Some(entity))
            }
            other => {
                debug!("Ignoring webhook event {other}");
                Ok(None)
            }
        }
    }
}
