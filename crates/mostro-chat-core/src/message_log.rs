//! Append-only Message Log
//!
//! Owns the global protocol message sequence (newest first) and one
//! append-only sequence per peer. Both collections sit behind `Arc`s and are
//! copied on write, so a [`LogSnapshot`] taken earlier keeps seeing exactly
//! what it saw, while untouched peer threads stay shared between versions.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::config::MessageLogConfig;
use crate::errors::Result;
use crate::order::TradeIdentity;
use crate::peer::PeerMessage;
use crate::protocol::{Action, MessageContent, ProtocolMessage};
use crate::registry::{OrderRegistry, PendingOrderUpdate, SourceEvent};
use crate::views::{self, PeerThreadSummary, ThreadSummary};

/// Peer npub to that peer's messages in arrival order
pub type PeerThreads = HashMap<String, Arc<Vec<PeerMessage>>>;

// ----------------------------------------------------------------------------
// Change Notification
// ----------------------------------------------------------------------------

/// Published to subscribers after each successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    ProtocolMessageAdded { order_id: String, action: Action },
    PeerMessageAdded { peer_npub: String },
    OrderIdentityMerged { order_id: String },
    OrderUpdateDeferred { order_id: String },
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogStats {
    pub protocol_messages: usize,
    pub peer_messages: usize,
    pub peers: usize,
    /// Identities merged into an order already in the registry
    pub identity_merges: usize,
    /// Identities handed to the registry for a later merge
    pub deferred_updates: usize,
    /// Full order snapshots forwarded as user orders
    pub orders_forwarded: usize,
    /// `SmallOrder` payloads lacking one of the two keys
    pub skipped_identity_merges: usize,
}

// ----------------------------------------------------------------------------
// Snapshot
// ----------------------------------------------------------------------------

/// Point-in-time view of the log
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    protocol: Arc<VecDeque<ProtocolMessage>>,
    peers: Arc<PeerThreads>,
}

impl LogSnapshot {
    /// Protocol messages in storage order, most recent arrival first
    pub fn protocol_messages(&self) -> impl Iterator<Item = &ProtocolMessage> + '_ {
        self.protocol.iter()
    }

    /// Protocol messages in arrival order
    pub fn arrivals(&self) -> impl Iterator<Item = &ProtocolMessage> + '_ {
        self.protocol.iter().rev()
    }

    pub fn protocol_len(&self) -> usize {
        self.protocol.len()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Stored thread for a peer, in arrival order
    pub fn peer_thread(&self, peer_npub: &str) -> &[PeerMessage] {
        self.peers
            .get(peer_npub)
            .map(|thread| thread.as_slice())
            .unwrap_or(&[])
    }

    /// Number of messages logged per order id
    pub fn order_message_counts(&self) -> HashMap<String, usize> {
        views::count_by_order(self.protocol.iter())
    }

    /// Latest message per action for one order, oldest first
    pub fn messages_for_order(&self, order_id: &str) -> Vec<ProtocolMessage> {
        views::messages_for_order(self.arrivals(), order_id)
    }

    /// Copy of a peer thread sorted oldest first, empty for unknown peers
    pub fn messages_for_peer(&self, peer_npub: &str) -> Vec<PeerMessage> {
        views::messages_for_peer(self.peer_thread(peer_npub))
    }

    pub fn peer_thread_summaries(&self) -> Vec<PeerThreadSummary> {
        views::peer_thread_summaries(
            self.peers
                .iter()
                .map(|(peer, thread)| (peer.as_str(), thread.as_slice())),
        )
    }

    /// Whether two snapshots share the same stored thread for a peer
    pub fn shares_peer_thread(&self, other: &LogSnapshot, peer_npub: &str) -> bool {
        match (self.peers.get(peer_npub), other.peers.get(peer_npub)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ----------------------------------------------------------------------------
// Message Log
// ----------------------------------------------------------------------------

/// Owner of the message log and its link to the order registry
pub struct MessageLog {
    registry: Arc<dyn OrderRegistry>,
    config: MessageLogConfig,
    state: LogSnapshot,
    stats: LogStats,
    notifier: broadcast::Sender<LogEvent>,
}

impl fmt::Debug for MessageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLog")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl MessageLog {
    /// Create an empty log around an order registry
    pub fn new(registry: Arc<dyn OrderRegistry>, config: MessageLogConfig) -> Result<Self> {
        config.validate()?;
        let (notifier, _) = broadcast::channel(config.notification_buffer_size);

        Ok(Self {
            registry,
            config,
            state: LogSnapshot::default(),
            stats: LogStats::default(),
            notifier,
        })
    }

    /// Create an empty log with default configuration
    pub fn with_registry(registry: Arc<dyn OrderRegistry>) -> Self {
        let config = MessageLogConfig::default();
        let (notifier, _) = broadcast::channel(config.notification_buffer_size);

        Self {
            registry,
            config,
            state: LogSnapshot::default(),
            stats: LogStats::default(),
            notifier,
        }
    }

    pub fn config(&self) -> &MessageLogConfig {
        &self.config
    }

    pub fn stats(&self) -> &LogStats {
        &self.stats
    }

    /// Receive a [`LogEvent`] for every later mutation
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.notifier.subscribe()
    }

    /// Current contents; unaffected by later ingestion
    pub fn snapshot(&self) -> LogSnapshot {
        self.state.clone()
    }

    // ------------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------------

    /// Log a protocol message, reconciling order data with the registry first
    ///
    /// A `SmallOrder` payload carrying both keys is merged into the order, or
    /// handed to the registry as a pending update when the order is not known
    /// yet. An `Order` action forwards its embedded order as a user order.
    /// Registry failures are returned and the message is not logged.
    pub async fn ingest_protocol_message(
        &mut self,
        message: ProtocolMessage,
        event: SourceEvent,
    ) -> Result<()> {
        if let Some(identity) = message.trade_identity() {
            self.reconcile_identity(&message.order_id, identity, &event)
                .await?;
        } else if matches!(message.content, Some(MessageContent::SmallOrder(_))) {
            self.stats.skipped_identity_merges += 1;
            debug!(
                "SmallOrder for order {} lacks buyer or seller key, skipping merge",
                message.order_id
            );
        }

        if message.action == Action::Order {
            match message.embedded_order() {
                Some(order) => {
                    self.registry.add_user_order(order.clone(), &event).await?;
                    self.stats.orders_forwarded += 1;
                    info!("Forwarded order {} to registry", order.id);
                }
                None => warn!(
                    "Order action for {} carries no order payload, nothing forwarded",
                    message.order_id
                ),
            }
        }

        self.append_protocol_message(message);
        Ok(())
    }

    /// Append a peer message to the end of its peer's thread
    pub fn ingest_peer_message(&mut self, message: PeerMessage) {
        let peer_npub = message.peer_npub.clone();
        if self.config.trace_payloads {
            trace!("Peer message payload: {:?}", message);
        }

        let threads = Arc::make_mut(&mut self.state.peers);
        let thread = threads.entry(peer_npub.clone()).or_default();
        Arc::make_mut(thread).push(message);

        self.stats.peer_messages += 1;
        self.stats.peers = threads.len();
        debug!("Logged peer message for {}", peer_npub);
        self.notify(LogEvent::PeerMessageAdded { peer_npub });
    }

    async fn reconcile_identity(
        &mut self,
        order_id: &str,
        identity: TradeIdentity,
        event: &SourceEvent,
    ) -> Result<()> {
        match self.registry.get_order_by_id(order_id).await? {
            Some(mut order) => {
                order.apply_identity(&identity);
                self.registry.update_order(order, event).await?;
                self.stats.identity_merges += 1;
                info!("Merged buyer and seller keys into order {}", order_id);
                self.notify(LogEvent::OrderIdentityMerged {
                    order_id: order_id.to_string(),
                });
            }
            None => {
                self.registry
                    .schedule_order_update(PendingOrderUpdate {
                        order_id: order_id.to_string(),
                        identity,
                        event: event.clone(),
                    })
                    .await?;
                self.stats.deferred_updates += 1;
                info!("Order {} not in registry yet, deferring key merge", order_id);
                self.notify(LogEvent::OrderUpdateDeferred {
                    order_id: order_id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn append_protocol_message(&mut self, message: ProtocolMessage) {
        if self.config.trace_payloads {
            trace!("Protocol message payload: {:?}", message);
        }
        let added = LogEvent::ProtocolMessageAdded {
            order_id: message.order_id.clone(),
            action: message.action,
        };
        debug!("Logged {} for order {}", message.action, message.order_id);

        Arc::make_mut(&mut self.state.protocol).push_front(message);
        self.stats.protocol_messages += 1;
        self.notify(added);
    }

    fn notify(&self, event: LogEvent) {
        // No subscribers is fine
        let _ = self.notifier.send(event);
    }

    // ------------------------------------------------------------------------
    // Derived Views
    // ------------------------------------------------------------------------

    /// One summary per order that still resolves, most recently created first
    ///
    /// Orders missing from the registry are left out. A failed lookup is
    /// logged and treated the same way.
    pub async fn thread_summaries_by_order(&self) -> Vec<ThreadSummary> {
        let counts = self.state.order_message_counts();
        let mut summaries = Vec::with_capacity(counts.len());

        for (order_id, message_count) in counts {
            match self.registry.get_order_by_id(&order_id).await {
                Ok(Some(order)) => summaries.push(ThreadSummary {
                    order_id,
                    message_count,
                    order,
                }),
                Ok(None) => debug!("Order {} not in registry, thread hidden", order_id),
                Err(e) => warn!("Failed to resolve order {}: {}", order_id, e),
            }
        }

        views::sort_thread_summaries(&mut summaries);
        summaries
    }

    /// Latest message per action for one order, oldest first
    pub fn messages_for_order(&self, order_id: &str) -> Vec<ProtocolMessage> {
        self.state.messages_for_order(order_id)
    }

    pub fn peer_thread_summaries(&self) -> Vec<PeerThreadSummary> {
        self.state.peer_thread_summaries()
    }

    /// Peer thread sorted oldest first, empty for unknown peers
    pub fn messages_for_peer(&self, peer_npub: &str) -> Vec<PeerMessage> {
        self.state.messages_for_peer(peer_npub)
    }

    /// Raw protocol sequence, most recent arrival first
    pub fn protocol_messages(&self) -> impl Iterator<Item = &ProtocolMessage> + '_ {
        self.state.protocol_messages()
    }

    /// Raw stored thread for a peer, in arrival order
    pub fn peer_thread(&self, peer_npub: &str) -> &[PeerMessage] {
        self.state.peer_thread(peer_npub)
    }
}
