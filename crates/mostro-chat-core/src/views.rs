//! Derived thread views
//!
//! Pure functions over log contents. Nothing here mutates or caches; every
//! view is recomputed from the messages it is given.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::peer::PeerMessage;
use crate::protocol::{Action, ProtocolMessage};

// ----------------------------------------------------------------------------
// Summary Types
// ----------------------------------------------------------------------------

/// One order thread, present only while the order resolves in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub order_id: String,
    pub message_count: usize,
    pub order: Order,
}

/// One peer conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerThreadSummary {
    pub peer: String,
    pub message_count: usize,
    pub last_message: PeerMessage,
}

// ----------------------------------------------------------------------------
// Protocol Views
// ----------------------------------------------------------------------------

/// Number of logged messages per order id
pub fn count_by_order<'a, I>(messages: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a ProtocolMessage>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for message in messages {
        *counts.entry_ref(message.order_id.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Keep the newest message for each action
///
/// `messages` must be in arrival order. A later message replaces the kept one
/// only when it is strictly newer, so on equal timestamps the first arrival
/// stays. Survivors are returned in order of each action's first appearance.
pub fn latest_per_action<'a, I>(messages: I) -> Vec<&'a ProtocolMessage>
where
    I: IntoIterator<Item = &'a ProtocolMessage>,
{
    let mut slots: HashMap<Action, usize> = HashMap::new();
    let mut latest: Vec<&'a ProtocolMessage> = Vec::new();

    for message in messages {
        match slots.get(&message.action) {
            Some(&slot) => {
                if latest[slot].created_at < message.created_at {
                    latest[slot] = message;
                }
            }
            None => {
                slots.insert(message.action, latest.len());
                latest.push(message);
            }
        }
    }

    latest
}

/// Timeline of one order: latest message per action, oldest first
///
/// `messages` must be in arrival order.
pub fn messages_for_order<'a, I>(messages: I, order_id: &str) -> Vec<ProtocolMessage>
where
    I: IntoIterator<Item = &'a ProtocolMessage>,
{
    let matching = messages
        .into_iter()
        .filter(|message| message.order_id == order_id);

    let mut timeline: Vec<ProtocolMessage> = latest_per_action(matching)
        .into_iter()
        .cloned()
        .collect();
    timeline.sort_by_key(|message| message.created_at);
    timeline
}

/// Most recently created order first
pub fn sort_thread_summaries(summaries: &mut [ThreadSummary]) {
    summaries.sort_by(|a, b| {
        b.order
            .created_at
            .cmp(&a.order.created_at)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });
}

// ----------------------------------------------------------------------------
// Peer Views
// ----------------------------------------------------------------------------

/// Copy of a peer thread sorted oldest first; the input is left as stored
pub fn messages_for_peer(thread: &[PeerMessage]) -> Vec<PeerMessage> {
    let mut messages = thread.to_vec();
    messages.sort_by_key(|message| message.created_at);
    messages
}

/// One summary per non-empty thread, most recent conversation first
pub fn peer_thread_summaries<'a, I>(threads: I) -> Vec<PeerThreadSummary>
where
    I: IntoIterator<Item = (&'a str, &'a [PeerMessage])>,
{
    let mut summaries: Vec<PeerThreadSummary> = threads
        .into_iter()
        .filter_map(|(peer, thread)| {
            let sorted = messages_for_peer(thread);
            let message_count = sorted.len();
            sorted.into_iter().last().map(|last_message| PeerThreadSummary {
                peer: peer.to_string(),
                message_count,
                last_message,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.last_message
            .created_at
            .cmp(&a.last_message.created_at)
            .then_with(|| a.peer.cmp(&b.peer))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer::MessageSender;
    use crate::types::Timestamp;

    fn protocol(order_id: &str, action: Action, created_at: u64) -> ProtocolMessage {
        ProtocolMessage::new(order_id, action, None, Timestamp::new(created_at))
    }

    fn peer(id: &str, npub: &str, created_at: u64) -> PeerMessage {
        PeerMessage::new(id, npub, MessageSender::Other, "hi", Timestamp::new(created_at))
    }

    #[test]
    fn test_replayed_dispute_collapses() {
        let arrivals = vec![
            protocol("o1", Action::Dispute, 10),
            protocol("o1", Action::Dispute, 30),
            protocol("o1", Action::FiatSent, 20),
        ];

        let timeline = messages_for_order(&arrivals, "o1");
        let steps: Vec<(Action, u64)> = timeline
            .iter()
            .map(|m| (m.action, m.created_at.as_secs()))
            .collect();
        assert_eq!(steps, vec![(Action::FiatSent, 20), (Action::Dispute, 30)]);
    }

    #[test]
    fn test_older_replay_does_not_replace() {
        let arrivals = vec![
            protocol("o1", Action::PayInvoice, 50),
            protocol("o1", Action::PayInvoice, 40),
        ];
        let latest = latest_per_action(&arrivals);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].created_at, Timestamp::new(50));
    }

    #[test]
    fn test_tie_keeps_first_arrival() {
        let first = ProtocolMessage::new(
            "o1",
            Action::CantDo,
            Some(crate::protocol::MessageContent::TextMessage("a".to_string())),
            Timestamp::new(7),
        );
        let second = ProtocolMessage::new(
            "o1",
            Action::CantDo,
            Some(crate::protocol::MessageContent::TextMessage("b".to_string())),
            Timestamp::new(7),
        );
        let arrivals = vec![first.clone(), second];

        assert_eq!(messages_for_order(&arrivals, "o1"), vec![first]);
    }

    #[test]
    fn test_other_orders_are_filtered() {
        let arrivals = vec![
            protocol("o1", Action::TakeSell, 1),
            protocol("o2", Action::TakeSell, 2),
        ];
        assert_eq!(messages_for_order(&arrivals, "o2").len(), 1);
        assert!(messages_for_order(&arrivals, "missing").is_empty());
    }

    #[test]
    fn test_count_by_order() {
        let arrivals = vec![
            protocol("o1", Action::TakeSell, 1),
            protocol("o1", Action::TakeSell, 2),
            protocol("o2", Action::Order, 3),
        ];
        let counts = count_by_order(&arrivals);
        assert_eq!(counts.get("o1"), Some(&2));
        assert_eq!(counts.get("o2"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_messages_for_peer_sorts_copy() {
        let thread = vec![peer("m1", "npubA", 5), peer("m2", "npubA", 2)];
        let sorted = messages_for_peer(&thread);

        assert_eq!(sorted[0].id, "m2");
        assert_eq!(sorted[1].id, "m1");
        assert_eq!(thread[0].id, "m1");
    }

    #[test]
    fn test_peer_summaries() {
        let a = vec![peer("m1", "npubA", 5), peer("m2", "npubA", 2)];
        let b = vec![peer("m3", "npubB", 9)];
        let empty: Vec<PeerMessage> = Vec::new();

        let summaries = peer_thread_summaries(vec![
            ("npubA", a.as_slice()),
            ("npubB", b.as_slice()),
            ("npubC", empty.as_slice()),
        ]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].peer, "npubB");
        assert_eq!(summaries[1].peer, "npubA");
        assert_eq!(summaries[1].message_count, 2);
        assert_eq!(summaries[1].last_message.id, "m1");
    }
}
