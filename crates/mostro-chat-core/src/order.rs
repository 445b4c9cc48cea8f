//! Order records and the partial order shape carried by protocol messages

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ----------------------------------------------------------------------------
// Order Kind and Status
// ----------------------------------------------------------------------------

/// Side of the order from the maker's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderKind {
    Buy,
    Sell,
}

/// Lifecycle status as published by Mostro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Active,
    Canceled,
    CanceledByAdmin,
    CooperativelyCanceled,
    Success,
    CompletedByAdmin,
    Dispute,
    Expired,
    FiatSent,
    SettledHoldInvoice,
    Pending,
    WaitingBuyerInvoice,
    WaitingPayment,
}

// ----------------------------------------------------------------------------
// Trade Identity
// ----------------------------------------------------------------------------

/// Buyer and seller public keys revealed once an order is taken
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeIdentity {
    pub seller_pubkey: String,
    pub buyer_pubkey: String,
}

// ----------------------------------------------------------------------------
// Order
// ----------------------------------------------------------------------------

/// Order record owned by the order registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub kind: OrderKind,
    pub status: OrderStatus,
    /// Amount in satoshis, 0 when priced at market
    pub amount: u64,
    pub fiat_code: String,
    pub fiat_amount: u64,
    pub payment_method: String,
    pub premium: i64,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_pubkey: Option<String>,
}

impl Order {
    /// Merge buyer and seller keys into the order
    pub fn apply_identity(&mut self, identity: &TradeIdentity) {
        self.seller_pubkey = Some(identity.seller_pubkey.clone());
        self.buyer_pubkey = Some(identity.buyer_pubkey.clone());
    }

    /// Keys currently known for both sides, if any
    pub fn trade_identity(&self) -> Option<TradeIdentity> {
        match (&self.seller_pubkey, &self.buyer_pubkey) {
            (Some(seller), Some(buyer)) => Some(TradeIdentity {
                seller_pubkey: seller.clone(),
                buyer_pubkey: buyer.clone(),
            }),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Small Order
// ----------------------------------------------------------------------------

/// Partial order data sent by Mostro while a trade progresses
///
/// Every field is optional on the wire. The keys are the only part the log
/// acts on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiat_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiat_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_pubkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_pubkey: Option<String>,
}

impl SmallOrder {
    /// Both keys, only when both are present and non-empty
    pub fn trade_identity(&self) -> Option<TradeIdentity> {
        let seller = self.seller_pubkey.as_deref().filter(|k| !k.is_empty())?;
        let buyer = self.buyer_pubkey.as_deref().filter(|k| !k.is_empty())?;
        Some(TradeIdentity {
            seller_pubkey: seller.to_string(),
            buyer_pubkey: buyer.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_order(seller: Option<&str>, buyer: Option<&str>) -> SmallOrder {
        SmallOrder {
            seller_pubkey: seller.map(str::to_string),
            buyer_pubkey: buyer.map(str::to_string),
            ..SmallOrder::default()
        }
    }

    #[test]
    fn test_identity_requires_both_keys() {
        assert!(small_order(Some("npub_s"), None).trade_identity().is_none());
        assert!(small_order(None, Some("npub_b")).trade_identity().is_none());
        assert!(small_order(Some(""), Some("npub_b")).trade_identity().is_none());

        let identity = small_order(Some("npub_s"), Some("npub_b"))
            .trade_identity()
            .unwrap();
        assert_eq!(identity.seller_pubkey, "npub_s");
        assert_eq!(identity.buyer_pubkey, "npub_b");
    }

    #[test]
    fn test_apply_identity() {
        let mut order = Order {
            id: "o1".to_string(),
            kind: OrderKind::Sell,
            status: OrderStatus::Active,
            amount: 0,
            fiat_code: "VES".to_string(),
            fiat_amount: 100,
            payment_method: "face to face".to_string(),
            premium: 1,
            created_at: Timestamp::new(1),
            seller_pubkey: None,
            buyer_pubkey: None,
        };
        assert!(order.trade_identity().is_none());

        let identity = TradeIdentity {
            seller_pubkey: "npub_s".to_string(),
            buyer_pubkey: "npub_b".to_string(),
        };
        order.apply_identity(&identity);
        assert_eq!(order.trade_identity(), Some(identity));
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&OrderStatus::WaitingBuyerInvoice).unwrap();
        assert_eq!(json, "\"waiting-buyer-invoice\"");
        let kind: OrderKind = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(kind, OrderKind::Sell);
    }
}
