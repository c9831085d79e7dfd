//! Event structures for the negotiation engine
//!
//! Every committed state transition is appended to a bounded in-memory
//! log. Clients that poll for notifications read it by sequence number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use types::ids::{SlotId, SwapRequestId, UserId};
use types::slot::SlotStatus;

/// Default number of events retained
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapEventKind {
    SlotCreated {
        slot_id: SlotId,
        owner_id: UserId,
    },
    SlotStatusChanged {
        slot_id: SlotId,
        owner_id: UserId,
        from: SlotStatus,
        to: SlotStatus,
    },
    SlotDeleted {
        slot_id: SlotId,
        owner_id: UserId,
    },
    SwapProposed {
        request_id: SwapRequestId,
        requester_id: UserId,
        receiver_id: UserId,
        requester_slot_id: SlotId,
        receiver_slot_id: SlotId,
    },
    SwapAccepted {
        request_id: SwapRequestId,
        requester_id: UserId,
        receiver_id: UserId,
    },
    SwapRejected {
        request_id: SwapRequestId,
        requester_id: UserId,
        receiver_id: UserId,
    },
}

impl SwapEventKind {
    /// True if `user` is a party to the event
    pub fn involves(&self, user: &UserId) -> bool {
        match self {
            SwapEventKind::SlotCreated { owner_id, .. }
            | SwapEventKind::SlotStatusChanged { owner_id, .. }
            | SwapEventKind::SlotDeleted { owner_id, .. } => owner_id == user,
            SwapEventKind::SwapProposed {
                requester_id,
                receiver_id,
                ..
            }
            | SwapEventKind::SwapAccepted {
                requester_id,
                receiver_id,
                ..
            }
            | SwapEventKind::SwapRejected {
                requester_id,
                receiver_id,
                ..
            } => requester_id == user || receiver_id == user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub sequence: u64,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: SwapEventKind,
}

/// Bounded append-only event log
#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<SwapEvent>,
    capacity: usize,
    next_sequence: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity: capacity.max(1),
            next_sequence: 1,
        }
    }

    /// Rebuild a log from retained events, continuing after `last_sequence`
    ///
    /// Sequence numbers keep increasing across restarts so polling cursors
    /// stay valid.
    pub fn resume(capacity: usize, events: Vec<SwapEvent>, last_sequence: u64) -> Self {
        let mut log = Self::new(capacity);
        let mut events = events;
        events.sort_by_key(|e| e.sequence);
        let newest = events.last().map_or(0, |e| e.sequence);
        let skip = events.len().saturating_sub(log.capacity);
        log.events.extend(events.into_iter().skip(skip));
        log.next_sequence = last_sequence.max(newest) + 1;
        log
    }

    /// Append an event, evicting the oldest when full
    pub fn record(&mut self, kind: SwapEventKind, now: DateTime<Utc>) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(SwapEvent {
            sequence,
            occurred_at: now,
            kind,
        });
        sequence
    }

    /// Events with a sequence greater than `after`, oldest first
    pub fn since(&self, after: u64) -> Vec<SwapEvent> {
        self.events
            .iter()
            .filter(|e| e.sequence > after)
            .cloned()
            .collect()
    }

    /// Up to `limit` most recent events, newest first
    pub fn recent(&self, limit: usize) -> Vec<SwapEvent> {
        self.events.iter().rev().take(limit).cloned().collect()
    }

    pub fn last_sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
