//! Swap request types
//!
//! A swap request proposes exchanging ownership of two slots between two
//! users. `PENDING` is the only non-terminal state.

use crate::errors::{SwapError, SwapResult};
use crate::ids::{SlotId, SwapRequestId, UserId};
use crate::slot::Slot;
use crate::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Swap request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapStatus {
    /// Awaiting the receiver's answer
    #[serde(rename = "PENDING")]
    Pending,

    /// Receiver agreed, ownership exchanged (terminal)
    #[serde(rename = "ACCEPTED")]
    Accepted,

    /// Receiver declined (terminal)
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl SwapStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Accepted | SwapStatus::Rejected)
    }

    pub fn can_transition_to(&self, to: SwapStatus) -> bool {
        matches!(
            (self, to),
            (SwapStatus::Pending, SwapStatus::Accepted) | (SwapStatus::Pending, SwapStatus::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "PENDING",
            SwapStatus::Accepted => "ACCEPTED",
            SwapStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver's answer to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwapAction {
    ACCEPT,
    REJECT,
}

impl SwapAction {
    /// Request status this action settles into
    pub fn outcome(&self) -> SwapStatus {
        match self {
            SwapAction::ACCEPT => SwapStatus::Accepted,
            SwapAction::REJECT => SwapStatus::Rejected,
        }
    }
}

impl FromStr for SwapAction {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ACCEPT" => Ok(SwapAction::ACCEPT),
            "REJECT" => Ok(SwapAction::REJECT),
            _ => Err(SwapError::validation("action", "action must be ACCEPT or REJECT")),
        }
    }
}

/// Persisted swap request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: SwapRequestId,
    /// Ledger-assigned insertion order, used as the listing tie-break
    pub sequence: u64,
    pub requester_id: UserId,
    pub requester_slot_id: SlotId,
    pub receiver_id: UserId,
    pub receiver_slot_id: SlotId,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl SwapRequest {
    /// Build a new PENDING request
    pub fn new(
        requester_id: UserId,
        requester_slot_id: SlotId,
        receiver_id: UserId,
        receiver_slot_id: SlotId,
        now: DateTime<Utc>,
    ) -> SwapResult<Self> {
        if requester_id == receiver_id {
            return Err(SwapError::InvalidOperation(
                "Cannot request swap with your own event".into(),
            ));
        }
        if requester_slot_id == receiver_slot_id {
            return Err(SwapError::InvalidOperation(
                "A slot cannot be swapped with itself".into(),
            ));
        }

        Ok(Self {
            id: SwapRequestId::new(),
            sequence: 0,
            requester_id,
            requester_slot_id,
            receiver_id,
            receiver_slot_id,
            status: SwapStatus::Pending,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// True if `slot` is staked in this request in either role
    pub fn references(&self, slot: &SlotId) -> bool {
        self.requester_slot_id == *slot || self.receiver_slot_id == *slot
    }

    pub fn is_pending(&self) -> bool {
        self.status == SwapStatus::Pending
    }

    /// Settle the request
    pub fn settle(&mut self, to: SwapStatus) -> SwapResult<()> {
        if self.status.is_terminal() {
            return Err(SwapError::State(format!(
                "Swap request is already {}",
                self.status
            )));
        }
        if !self.status.can_transition_to(to) {
            return Err(SwapError::State(format!(
                "Swap request cannot move from {} to {}",
                self.status, to
            )));
        }
        self.status = to;
        Ok(())
    }
}

/// Slot fields shown alongside a swap request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub id: SlotId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub owner_id: UserId,
}

impl From<&Slot> for SlotSummary {
    fn from(slot: &Slot) -> Self {
        Self {
            id: slot.id,
            title: slot.title.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            owner_id: slot.owner_id,
        }
    }
}

/// Swap request with resolved slot and user summaries
///
/// Slot summaries are `None` when the slot was deleted after the request
/// reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestView {
    pub id: SwapRequestId,
    pub status: SwapStatus,
    pub requester: UserSummary,
    pub receiver: UserSummary,
    pub requester_slot: Option<SlotSummary>,
    pub receiver_slot: Option<SlotSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming and outgoing requests of one user, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MyRequests {
    pub incoming: Vec<SwapRequestView>,
    pub outgoing: Vec<SwapRequestView>,
}
