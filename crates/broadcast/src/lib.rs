//! Topic-addressed fan-out for live dispatch connections
//!
//! The [`BroadcastRouter`] delivers dispatch events to every connection
//! subscribed to a topic, best-effort and at-most-once. The [`WsGateway`]
//! is the WebSocket adapter that bridges live client connections onto the
//! router's topic membership.

pub mod router;
pub mod ws;

pub use router::{BroadcastRouter, ConnectionId, Envelope};
pub use ws::WsGateway;
