use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// The only event clients may publish through the relay.
pub const TYPING_EVENT: &str = "typing";

fn typing_event_only(event: &str) -> Result<(), ValidationError> {
    if event == TYPING_EVENT {
        return Ok(());
    }
    Err(ValidationError::new("event").with_message("Only typing events can be relayed".into()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingData {
    pub is_typing: bool,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TypeIndicatorBody {
    #[validate(length(min = 1, message = "Channel is required"))]
    pub channel: String,
    #[validate(custom(function = "typing_event_only"))]
    pub event: String,
    pub data: TypingData,
}

#[derive(Debug, Serialize)]
pub struct TypeIndicatorAck {
    pub success: bool,
}
