/// Messages exchanged between session actors and the server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::session::WebSocketSession;

/// A session connected.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

/// A session went away; drop it from every channel.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub session_id: Uuid,
    pub channel: String,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Unsubscribe {
    pub session_id: Uuid,
    pub channel: String,
}

/// Fan an event out to every session subscribed to `channel`.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct Publish {
    pub channel: String,
    pub event: String,
    pub data: serde_json::Value,
}

/// Number of sessions subscribed to a channel.
#[derive(Message)]
#[rtype(result = "usize")]
pub struct SubscriberCount {
    pub channel: String,
}
