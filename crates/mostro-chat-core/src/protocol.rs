//! Mostro protocol messages
//!
//! A protocol message is one step of a trade as reported by the Mostro
//! intermediary. Mostro may replay earlier steps while a trade is stalled, so
//! several messages can share both an order id and an action.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::order::{Order, SmallOrder, TradeIdentity};
use crate::types::Timestamp;

// ----------------------------------------------------------------------------
// Action
// ----------------------------------------------------------------------------

/// Trade step announced by Mostro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Full order snapshot for an order we created
    Order,
    TakeSell,
    TakeBuy,
    PayInvoice,
    FiatSent,
    FiatSentOk,
    Release,
    Released,
    Cancel,
    Canceled,
    CooperativeCancelInitiatedByYou,
    CooperativeCancelInitiatedByPeer,
    CooperativeCancelAccepted,
    DisputeInitiatedByYou,
    DisputeInitiatedByPeer,
    Dispute,
    BuyerInvoiceAccepted,
    PurchaseCompleted,
    HoldInvoicePaymentAccepted,
    HoldInvoicePaymentSettled,
    HoldInvoicePaymentCanceled,
    WaitingSellerToPay,
    WaitingBuyerInvoice,
    AddInvoice,
    BuyerTookOrder,
    RateUser,
    CantDo,
    AdminCancel,
    AdminSettle,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ----------------------------------------------------------------------------
// Message Content
// ----------------------------------------------------------------------------

/// Payload variants, externally tagged as on the wire (`{"SmallOrder": {..}}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    Order(Order),
    SmallOrder(SmallOrder),
    PaymentRequest(Option<SmallOrder>, String),
    TextMessage(String),
}

// ----------------------------------------------------------------------------
// Protocol Message
// ----------------------------------------------------------------------------

/// One received protocol event, immutable once logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub order_id: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    pub created_at: Timestamp,
}

impl ProtocolMessage {
    pub fn new(
        order_id: impl Into<String>,
        action: Action,
        content: Option<MessageContent>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            action,
            content,
            created_at,
        }
    }

    /// Parse a message from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Buyer and seller keys carried by a `SmallOrder` payload
    ///
    /// `None` unless the payload is a `SmallOrder` with both keys non-empty.
    pub fn trade_identity(&self) -> Option<TradeIdentity> {
        match &self.content {
            Some(MessageContent::SmallOrder(small)) => small.trade_identity(),
            _ => None,
        }
    }

    /// The embedded order of an `Order` payload
    pub fn embedded_order(&self) -> Option<&Order> {
        match &self.content {
            Some(MessageContent::Order(order)) => Some(order),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_small_order_payload() {
        let json = r#"{
            "order_id": "o1",
            "action": "BuyerTookOrder",
            "content": {"SmallOrder": {"seller_pubkey": "npub_s", "buyer_pubkey": "npub_b", "amount": 7851}},
            "created_at": 1700000000
        }"#;
        let message = ProtocolMessage::from_json(json).unwrap();
        assert_eq!(message.action, Action::BuyerTookOrder);
        assert_eq!(message.created_at, Timestamp::new(1_700_000_000));

        let identity = message.trade_identity().unwrap();
        assert_eq!(identity.seller_pubkey, "npub_s");
        assert_eq!(identity.buyer_pubkey, "npub_b");
    }

    #[test]
    fn test_parse_without_content() {
        let json = r#"{"order_id": "o1", "action": "FiatSentOk", "created_at": 5}"#;
        let message = ProtocolMessage::from_json(json).unwrap();
        assert!(message.content.is_none());
        assert!(message.trade_identity().is_none());
        assert!(message.embedded_order().is_none());
    }

    #[test]
    fn test_parse_payment_request() {
        let json = r#"{
            "order_id": "o2",
            "action": "PayInvoice",
            "content": {"PaymentRequest": [null, "lnbc1..."]},
            "created_at": 9
        }"#;
        let message = ProtocolMessage::from_json(json).unwrap();
        assert_eq!(
            message.content,
            Some(MessageContent::PaymentRequest(None, "lnbc1...".to_string()))
        );
        assert!(message.trade_identity().is_none());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let json = r#"{"order_id": "o1", "action": "Teleport", "created_at": 5}"#;
        assert!(ProtocolMessage::from_json(json).is_err());
    }
}
