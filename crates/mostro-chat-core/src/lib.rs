//! Mostro Chat Core
//!
//! Message ingestion and thread derivation for a peer-to-peer trade client. The
//! crate keeps an append-only log of two message streams:
//!
//! - protocol messages from the Mostro intermediary, tagged with an order id
//!   and an [`Action`]
//! - direct peer messages exchanged between trade counterparties
//!
//! From that log it derives per-order and per-peer threads, collapses replayed
//! protocol steps to their latest state, and forwards buyer/seller identities
//! to an injected [`OrderRegistry`], deferring the merge when the order has not
//! reached the registry yet.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod errors;
pub mod message_log;
pub mod order;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod types;
pub mod views;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::MessageLogConfig;
pub use errors::{MessageLogError, RegistryError, Result};
pub use message_log::{LogEvent, LogSnapshot, LogStats, MessageLog};
pub use order::{Order, OrderKind, OrderStatus, SmallOrder, TradeIdentity};
pub use peer::{MessageSender, PeerMessage};
pub use protocol::{Action, MessageContent, ProtocolMessage};
pub use registry::{OrderRegistry, PendingOrderUpdate, SourceEvent};
pub use types::Timestamp;
pub use views::{PeerThreadSummary, ThreadSummary};
