//! Topic → subscriber-set fan-out
//!
//! Publishing is fire-and-forget from the caller's perspective: a publish
//! never blocks on subscriber consumption and never fails the triggering
//! operation. Per-subscriber delivery order follows publish order because
//! each connection owns a FIFO channel.

use lifeline_core::now_ms;
use lifeline_domain::{DispatchEvent, Topic};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Identifier the connection layer uses to address a live connection
pub type ConnectionId = u64;

/// A published event as delivered to a subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic this delivery was addressed to
    pub topic: String,
    /// The event payload
    #[serde(flatten)]
    pub event: DispatchEvent,
    /// Publish timestamp (epoch ms)
    pub published_at: u64,
}

#[derive(Default)]
struct Membership {
    /// Outbound channel per live connection
    senders: HashMap<ConnectionId, mpsc::UnboundedSender<Envelope>>,
    /// Topic membership
    topics: HashMap<String, HashSet<ConnectionId>>,
}

/// Topic-addressed publish/subscribe fan-out
pub struct BroadcastRouter {
    next_id: AtomicU64,
    membership: RwLock<Membership>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            membership: RwLock::new(Membership::default()),
        }
    }

    /// Register a live connection, returning its id and delivery channel.
    ///
    /// The connection receives nothing until it subscribes to a topic.
    pub async fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<Envelope>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.membership.write().await.senders.insert(id, tx);
        (id, rx)
    }

    /// Add a connection to a topic
    pub async fn subscribe(&self, conn: ConnectionId, topic: &Topic) {
        let mut membership = self.membership.write().await;
        if !membership.senders.contains_key(&conn) {
            debug!(conn, topic = %topic, "subscribe ignored for unregistered connection");
            return;
        }
        membership
            .topics
            .entry(topic.to_string())
            .or_default()
            .insert(conn);
    }

    /// Remove a connection from a topic
    pub async fn unsubscribe(&self, conn: ConnectionId, topic: &Topic) {
        let mut membership = self.membership.write().await;
        if let Some(members) = membership.topics.get_mut(&topic.to_string()) {
            members.remove(&conn);
            if members.is_empty() {
                membership.topics.remove(&topic.to_string());
            }
        }
    }

    /// Drop a connection and all of its memberships
    pub async fn disconnect(&self, conn: ConnectionId) {
        let mut membership = self.membership.write().await;
        membership.senders.remove(&conn);
        membership.topics.retain(|_, members| {
            members.remove(&conn);
            !members.is_empty()
        });
    }

    /// Deliver `event` to every connection subscribed to `topic`.
    ///
    /// Returns the number of connections the event was handed to. Dead
    /// connections found along the way are pruned; publish itself cannot
    /// fail.
    pub async fn publish(&self, topic: &Topic, event: DispatchEvent) -> usize {
        let envelope = Envelope {
            topic: topic.to_string(),
            event,
            published_at: now_ms(),
        };

        let mut membership = self.membership.write().await;
        let Some(members) = membership.topics.get(&topic.to_string()) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead: Vec<ConnectionId> = Vec::new();
        for conn in members.iter() {
            match membership.senders.get(conn) {
                Some(tx) if tx.send(envelope.clone()).is_ok() => delivered += 1,
                _ => dead.push(*conn),
            }
        }

        for conn in dead {
            membership.senders.remove(&conn);
            membership.topics.retain(|_, members| {
                members.remove(&conn);
                !members.is_empty()
            });
        }

        delivered
    }

    /// Number of live connections on a topic
    pub async fn subscriber_count(&self, topic: &Topic) -> usize {
        self.membership
            .read()
            .await
            .topics
            .get(&topic.to_string())
            .map(|members| members.len())
            .unwrap_or(0)
    }
}

impl Default for BroadcastRouter {
    fn default() -> Self {
        Self::new()
    }
}
