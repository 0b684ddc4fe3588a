/// WebSocket server actor
///
/// Owns every live session and the channel → subscribers index. All fan-out goes
/// through this actor, so publishers never touch session state directly.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::WebSocketSession;

/// Channel carrying change notifications for one conversation.
pub fn conversation_channel(conversation_id: &Uuid) -> String {
    conversation_id.to_string()
}

pub struct WebSocketServer {
    /// session_id -> session actor address
    sessions: HashMap<Uuid, Addr<WebSocketSession>>,

    /// channel -> subscribed session ids
    channels: HashMap<String, HashSet<Uuid>>,
}

impl WebSocketServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), channels: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) -> bool {
        match self.sessions.get(session_id) {
            Some(session_addr) => {
                session_addr.do_send(message);
                true
            }
            None => false,
        }
    }
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket session disconnected: {}", msg.id);

        self.sessions.remove(&msg.id);
        for subscribers in self.channels.values_mut() {
            subscribers.remove(&msg.id);
        }
        self.channels.retain(|_, subscribers| !subscribers.is_empty());
    }
}

impl Handler<Subscribe> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _: &mut Context<Self>) {
        let subscribers = self.channels.entry(msg.channel.clone()).or_default();
        subscribers.insert(msg.session_id);

        tracing::debug!(
            "Session {} subscribed to {} ({} subscribers)",
            msg.session_id,
            msg.channel,
            subscribers.len()
        );
    }
}

impl Handler<Unsubscribe> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _: &mut Context<Self>) {
        if let Some(subscribers) = self.channels.get_mut(&msg.channel) {
            subscribers.remove(&msg.session_id);

            if subscribers.is_empty() {
                self.channels.remove(&msg.channel);
                tracing::debug!("Channel {} empty, removed", msg.channel);
            }
        }
    }
}

impl Handler<Publish> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Publish, _: &mut Context<Self>) {
        let Some(subscribers) = self.channels.get(&msg.channel) else {
            tracing::debug!("No subscribers on {}, dropping {}", msg.channel, msg.event);
            return;
        };

        let frame = ServerMessage::Event {
            channel: msg.channel.clone(),
            event: msg.event.clone(),
            data: msg.data,
        };

        let sent_count =
            subscribers.iter().filter(|id| self.send_to_session(id, frame.clone())).count();

        tracing::debug!("Published {} on {}: sent to {} sessions", msg.event, msg.channel, sent_count);
    }
}

impl Handler<SubscriberCount> for WebSocketServer {
    type Result = usize;

    fn handle(&mut self, msg: SubscriberCount, _: &mut Context<Self>) -> Self::Result {
        self.channels.get(&msg.channel).map_or(0, HashSet::len)
    }
}

impl Message for ServerMessage {
    type Result = ();
}

/// Publishing side of the relay handed to services. A relay without a server drops
/// every event, which is what tests and relay-less deployments want.
#[derive(Clone, Default)]
pub struct Relay {
    server: Option<Addr<WebSocketServer>>,
}

impl Relay {
    pub fn new(server: Addr<WebSocketServer>) -> Self {
        Self { server: Some(server) }
    }

    pub fn disabled() -> Self {
        Self { server: None }
    }

    pub fn publish(&self, channel: impl Into<String>, event: &str, data: serde_json::Value) {
        if let Some(server) = &self.server {
            server.do_send(Publish { channel: channel.into(), event: event.to_string(), data });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TokenVerifier;
    use actix_web::web;
    use tokio::sync::mpsc;

    #[actix_web::test]
    async fn publish_reaches_subscribers_only() {
        let server = WebSocketServer::new().start();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let session = WebSocketSession::new(
            server.clone(),
            tx,
            web::Data::new(TokenVerifier::hmac(b"secret")),
        );
        let session_id = session.id;
        let addr = session.start();

        server.send(Connect { id: session_id, addr }).await.unwrap();
        server
            .send(Subscribe { session_id, channel: "conv-1".into() })
            .await
            .unwrap();
        assert_eq!(server.send(SubscriberCount { channel: "conv-1".into() }).await.unwrap(), 1);

        server
            .send(Publish {
                channel: "conv-2".into(),
                event: "typing".into(),
                data: serde_json::json!({}),
            })
            .await
            .unwrap();
        server
            .send(Publish {
                channel: "conv-1".into(),
                event: "typing".into(),
                data: serde_json::json!({"isTyping": true}),
            })
            .await
            .unwrap();

        let frame: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "event");
        assert_eq!(frame["channel"], "conv-1");
        assert_eq!(frame["data"]["isTyping"], true);
    }

    #[actix_web::test]
    async fn disconnect_drops_subscriptions() {
        let server = WebSocketServer::new().start();
        let session_id = Uuid::now_v7();

        server
            .send(Subscribe { session_id, channel: "conv-1".into() })
            .await
            .unwrap();
        server.send(Disconnect { id: session_id }).await.unwrap();

        assert_eq!(server.send(SubscriberCount { channel: "conv-1".into() }).await.unwrap(), 0);
    }
}
