/// WebSocket relay
///
/// Real-time fan-out for the chat API. Clients open `/ws`, authenticate with the same
/// bearer token as the HTTP API, then subscribe to named channels. Events reach a
/// channel from two places:
///
/// - the typing-indicator endpoint (`POST /api/type-indicator`)
/// - services announcing `message` and `read` changes on a conversation channel
///
/// Delivery is best-effort: no ordering, persistence or acknowledgement.
pub mod events;
pub mod handle;
pub mod handler;
pub mod message;
pub mod model;
pub mod route;
pub mod server;
pub mod session;
