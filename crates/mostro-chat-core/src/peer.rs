//! Direct messages between trade counterparties

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::Timestamp;

/// Which side of the conversation wrote a peer message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Me,
    Other,
}

/// Message exchanged with a single peer, keyed by the peer's npub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMessage {
    pub id: String,
    pub peer_npub: String,
    pub sender: MessageSender,
    pub text: String,
    pub created_at: Timestamp,
}

impl PeerMessage {
    pub fn new(
        id: impl Into<String>,
        peer_npub: impl Into<String>,
        sender: MessageSender,
        text: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            peer_npub: peer_npub.into(),
            sender,
            text: text.into(),
            created_at,
        }
    }

    /// Parse a message from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_peer_message() {
        let json = r#"{
            "id": "m1",
            "peer_npub": "npub1abc",
            "sender": "other",
            "text": "sent the fiat",
            "created_at": 42
        }"#;
        let message = PeerMessage::from_json(json).unwrap();
        assert_eq!(message.sender, MessageSender::Other);
        assert_eq!(message.peer_npub, "npub1abc");
        assert_eq!(message.created_at, Timestamp::new(42));
    }
}
