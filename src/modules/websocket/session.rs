/// WebSocket session actor
///
/// One actor per connection. Holds the authentication state and writes outbound
/// frames to the mpsc channel bridged to the socket in `handler.rs`.
use actix::prelude::*;
use actix_web::web;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::utils::{Claims, TokenVerifier};

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

pub struct WebSocketSession {
    pub id: Uuid,

    /// Identity-provider subject once authenticated.
    pub subject: Option<String>,

    pub server: Addr<WebSocketServer>,

    /// JSON frames for the client (bridge → handler.rs → socket).
    pub tx: mpsc::UnboundedSender<String>,

    verifier: web::Data<TokenVerifier>,
}

impl WebSocketSession {
    pub fn new(
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        verifier: web::Data<TokenVerifier>,
    ) -> Self {
        Self { id: Uuid::now_v7(), subject: None, server, tx, verifier }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to queue frame for session {}: {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> bool {
        if self.subject.is_none() {
            self.send_error("Not authenticated");
            tracing::warn!("Session {} is not authenticated, request rejected", self.id);
            return false;
        }
        true
    }

    fn handle_client_message(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::Auth { token } => self.handle_auth(&token),

            ClientMessage::Subscribe { channel } => {
                if self.require_auth() {
                    self.server.do_send(Subscribe { session_id: self.id, channel });
                }
            }

            ClientMessage::Unsubscribe { channel } => {
                if self.require_auth() {
                    self.server.do_send(Unsubscribe { session_id: self.id, channel });
                }
            }

            ClientMessage::Ping => self.send_to_client(&ServerMessage::Pong),
        }
    }

    fn handle_auth(&mut self, token: &str) {
        if self.subject.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims = match Claims::decode(token, &self.verifier) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Token verification failed (session {}): {}", self.id, e);
                self.send_to_client(&ServerMessage::AuthFailed {
                    reason: "Invalid or expired token".to_string(),
                });
                return;
            }
        };

        tracing::info!("Subject {} authenticated on session {}", claims.sub, self.id);
        self.send_to_client(&ServerMessage::AuthSuccess { subject: claims.sub.clone() });
        self.subject = Some(claims.sub);
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, _ctx: &mut Context<Self>) {
        self.handle_client_message(msg);
    }
}

/// Frames routed from the server actor to this client.
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn session() -> (Addr<WebSocketSession>, mpsc::UnboundedReceiver<String>) {
        let server = WebSocketServer::new().start();
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let verifier = web::Data::new(TokenVerifier::hmac(b"secret"));
        (WebSocketSession::new(server, tx, verifier).start(), rx)
    }

    async fn next_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
        serde_json::from_str(&rx.recv().await.unwrap()).unwrap()
    }

    #[actix_web::test]
    async fn subscribe_before_auth_is_rejected() {
        let (addr, mut rx) = session();
        addr.send(ClientMessage::Subscribe { channel: "conv-1".into() }).await.unwrap();
        assert_eq!(next_frame(&mut rx).await["type"], "error");
    }

    #[actix_web::test]
    async fn auth_with_valid_and_invalid_tokens() {
        let (addr, mut rx) = session();

        addr.send(ClientMessage::Auth { token: "garbage".into() }).await.unwrap();
        assert_eq!(next_frame(&mut rx).await["type"], "authFailed");

        let claims = Claims {
            sub: "user_1".into(),
            exp: chrono::Utc::now().timestamp() as u64 + 600,
            iat: None,
            email: None,
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        addr.send(ClientMessage::Auth { token }).await.unwrap();

        let frame = next_frame(&mut rx).await;
        assert_eq!(frame["type"], "authSuccess");
        assert_eq!(frame["subject"], "user_1");

        addr.send(ClientMessage::Ping).await.unwrap();
        assert_eq!(next_frame(&mut rx).await["type"], "pong");
    }
}
