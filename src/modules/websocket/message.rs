/// Wire protocol of the `/ws` endpoint. Every frame is a JSON object tagged by `type`.
use serde::{Deserialize, Serialize};

/// Frames sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Authenticate the connection with a bearer token.
    Auth { token: String },

    Subscribe { channel: String },

    Unsubscribe { channel: String },

    /// Keep-alive.
    Ping,
}

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    AuthSuccess { subject: String },

    AuthFailed { reason: String },

    /// An event published on a subscribed channel.
    Event { channel: String, event: String, data: serde_json::Value },

    Pong,

    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn test_client_subscribe_deserialize() {
        let json = r#"{"type":"subscribe","channel":"conv-1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Subscribe { channel } if channel == "conv-1"));

        let json = r#"{"type":"unsubscribe","channel":"conv-1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Unsubscribe { channel } if channel == "conv-1"));
    }

    #[test]
    fn test_client_ping_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_frames_return_error() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"unknownType"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_server_event_serialize() {
        let msg = ServerMessage::Event {
            channel: "conv-1".into(),
            event: "typing".into(),
            data: serde_json::json!({"isTyping": true, "userId": "u1"}),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["channel"], "conv-1");
        assert_eq!(value["data"]["isTyping"], true);
    }

    #[test]
    fn test_server_simple_frames_serialize() {
        assert_eq!(serde_json::to_string(&ServerMessage::Pong).unwrap(), r#"{"type":"pong"}"#);

        let json = serde_json::to_string(&ServerMessage::AuthFailed { reason: "expired".into() })
            .unwrap();
        assert!(json.contains("\"type\":\"authFailed\""));
        assert!(json.contains("expired"));
    }
}
