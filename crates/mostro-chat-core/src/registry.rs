//! Order registry abstraction
//!
//! The message log never owns orders. It reaches the registry only through
//! the four calls of [`OrderRegistry`], and the registry is handed to the log
//! at construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;
use crate::order::{Order, TradeIdentity};
use crate::types::Timestamp;

// ----------------------------------------------------------------------------
// Source Event
// ----------------------------------------------------------------------------

/// Nostr event kind for encrypted direct messages
pub const KIND_ENCRYPTED_DM: u16 = 4;

/// Nostr event kind used for Mostro order events
pub const KIND_ORDER_EVENT: u16 = 30000;

/// Provenance of a protocol message: the Nostr event it arrived in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Hex event id
    pub id: String,
    pub kind: u16,
    /// Hex public key of the event author
    pub pubkey: String,
    pub created_at: Timestamp,
}

impl SourceEvent {
    pub fn new(
        id: impl Into<String>,
        kind: u16,
        pubkey: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            pubkey: pubkey.into(),
            created_at,
        }
    }

    pub fn is_direct_message(&self) -> bool {
        self.kind == KIND_ENCRYPTED_DM
    }
}

// ----------------------------------------------------------------------------
// Deferred Update
// ----------------------------------------------------------------------------

/// Identity merge to apply once the referenced order exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrderUpdate {
    pub order_id: String,
    pub identity: TradeIdentity,
    pub event: SourceEvent,
}

// ----------------------------------------------------------------------------
// Order Registry Trait
// ----------------------------------------------------------------------------

/// External owner of order records
#[async_trait]
pub trait OrderRegistry: Send + Sync {
    /// Look up an order, `None` when it is unknown
    async fn get_order_by_id(&self, order_id: &str) -> Result<Option<Order>, RegistryError>;

    /// Replace a known order with an updated copy
    async fn update_order(&self, order: Order, event: &SourceEvent) -> Result<(), RegistryError>;

    /// Add an order created by the local user
    async fn add_user_order(&self, order: Order, event: &SourceEvent)
        -> Result<(), RegistryError>;

    /// Queue an identity merge for an order the registry has not seen yet
    ///
    /// The registry applies it when the order is created. Pending updates do
    /// not expire.
    async fn schedule_order_update(&self, update: PendingOrderUpdate)
        -> Result<(), RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_event_kinds() {
        let dm = SourceEvent::new("ev1", KIND_ENCRYPTED_DM, "mostro", Timestamp::new(1));
        let order = SourceEvent::new("ev2", KIND_ORDER_EVENT, "mostro", Timestamp::new(2));
        assert!(dm.is_direct_message());
        assert!(!order.is_direct_message());
    }
}
