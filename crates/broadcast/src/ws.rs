//! WebSocket gateway for live dispatch connections
//!
//! Bridges client connections onto [`BroadcastRouter`] topic membership.
//! Clients send subscribe/unsubscribe frames; the gateway forwards every
//! envelope published to their topics as JSON text frames.

use crate::router::BroadcastRouter;
use futures_util::{SinkExt, StreamExt};
use lifeline_domain::Topic;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

/// Frames a client may send
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientFrame {
    Subscribe { topic: String },
    Unsubscribe { topic: String },
}

/// Acknowledgment sent on connect and after membership changes
#[derive(Debug, Serialize)]
struct AckFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    message: &'a str,
}

/// WebSocket adapter in front of the broadcast router
pub struct WsGateway {
    router: Arc<BroadcastRouter>,
    addr: SocketAddr,
}

impl WsGateway {
    pub fn new(addr: SocketAddr, router: Arc<BroadcastRouter>) -> Self {
        Self { router, addr }
    }

    /// Accept connections until the task is dropped
    pub async fn run(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.addr).await?;
        info!("dispatch WebSocket gateway listening on {}", self.addr);

        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let gateway = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = gateway.handle_connection(stream, peer_addr).await {
                            error!("WebSocket connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Serve a single client connection
    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let ws_stream = accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let (conn, mut envelopes) = self.router.register().await;
        info!(conn, "WebSocket connection from {}", peer_addr);

        let ack = AckFrame { kind: "ack", message: "connected to lifeline dispatch feed" };
        ws_sender.send(Message::Text(serde_json::to_string(&ack)?)).await?;

        loop {
            tokio::select! {
                // Membership frames from the client
                Some(msg) = ws_receiver.next() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            self.handle_client_frame(conn, &text).await;
                        }
                        Ok(Message::Close(_)) => {
                            info!(conn, "client {} disconnected", peer_addr);
                            break;
                        }
                        Err(e) => {
                            warn!(conn, "error receiving from {}: {}", peer_addr, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // Envelopes published to this connection's topics
                Some(envelope) = envelopes.recv() => {
                    let json = serde_json::to_string(&envelope)?;
                    if let Err(e) = ws_sender.send(Message::Text(json)).await {
                        warn!(conn, "error sending to {}: {}", peer_addr, e);
                        break;
                    }
                }

                else => break,
            }
        }

        self.router.disconnect(conn).await;
        Ok(())
    }

    async fn handle_client_frame(&self, conn: u64, text: &str) {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(conn, "ignoring malformed client frame: {}", e);
                return;
            }
        };

        match frame {
            ClientFrame::Subscribe { topic } => match topic.parse::<Topic>() {
                Ok(topic) => self.router.subscribe(conn, &topic).await,
                Err(e) => warn!(conn, "subscribe rejected: {}", e),
            },
            ClientFrame::Unsubscribe { topic } => match topic.parse::<Topic>() {
                Ok(topic) => self.router.unsubscribe(conn, &topic).await,
                Err(e) => warn!(conn, "unsubscribe rejected: {}", e),
            },
        }
    }
}
