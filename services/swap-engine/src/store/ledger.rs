//! Swap ledger
//!
//! Owns every `SwapRequest` record. The ledger refuses to hold two PENDING
//! requests that stake the same slot, and refuses any write to a request
//! that already reached a terminal status.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use types::errors::{SwapError, SwapResult};
use types::ids::{SlotId, SwapRequestId, UserId};
use types::swap::{SwapRequest, SwapStatus};

#[derive(Debug, Default)]
pub struct SwapLedger {
    requests: HashMap<SwapRequestId, SwapRequest>,
    next_sequence: u64,
}

impl SwapLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwapRequest> {
        self.requests.values()
    }

    /// Persist a new PENDING request
    pub fn create(
        &mut self,
        requester_id: UserId,
        requester_slot_id: SlotId,
        receiver_id: UserId,
        receiver_slot_id: SlotId,
        now: DateTime<Utc>,
    ) -> SwapResult<SwapRequest> {
        let staged = self.stage_create(
            requester_id,
            requester_slot_id,
            receiver_id,
            receiver_slot_id,
            now,
        )?;
        self.check_write(&staged)?;
        Ok(self.apply_write(staged, now))
    }

    /// Insert an existing record (snapshot restore)
    pub fn insert(&mut self, request: SwapRequest) -> SwapResult<()> {
        if self.requests.contains_key(&request.id) {
            return Err(SwapError::Conflict(format!(
                "Swap request {} already exists",
                request.id
            )));
        }
        if request.is_pending() {
            if let Some(existing) =
                self.find_active_conflict(&request.requester_slot_id, &request.receiver_slot_id)
            {
                return Err(SwapError::Conflict(format!(
                    "Swap requests {} and {} are both pending on the same slot",
                    existing.id, request.id
                )));
            }
        }
        self.next_sequence = self.next_sequence.max(request.sequence + 1);
        self.requests.insert(request.id, request);
        Ok(())
    }

    /// Any PENDING request staking either slot, in either role
    pub fn find_active_conflict(&self, slot_a: &SlotId, slot_b: &SlotId) -> Option<&SwapRequest> {
        self.requests
            .values()
            .filter(|r| r.is_pending())
            .find(|r| r.references(slot_a) || r.references(slot_b))
    }

    pub fn get(&self, id: &SwapRequestId) -> SwapResult<&SwapRequest> {
        self.requests
            .get(id)
            .ok_or_else(|| SwapError::request_not_found(id))
    }

    /// Requests where `user` is the receiver, newest first
    pub fn list_incoming(&self, user: &UserId) -> Vec<SwapRequest> {
        self.collect_newest_first(|r| r.receiver_id == *user)
    }

    /// Requests where `user` is the requester, newest first
    pub fn list_outgoing(&self, user: &UserId) -> Vec<SwapRequest> {
        self.collect_newest_first(|r| r.requester_id == *user)
    }

    /// Notification badge count
    pub fn count_pending_incoming(&self, user: &UserId) -> usize {
        self.requests
            .values()
            .filter(|r| r.receiver_id == *user && r.is_pending())
            .count()
    }

    /// Settle a PENDING request
    pub fn set_status(
        &mut self,
        id: &SwapRequestId,
        to: SwapStatus,
        now: DateTime<Utc>,
    ) -> SwapResult<SwapRequest> {
        let staged = self.stage_status(id, to)?;
        self.check_write(&staged)?;
        Ok(self.apply_write(staged, now))
    }

    pub(crate) fn stage_create(
        &self,
        requester_id: UserId,
        requester_slot_id: SlotId,
        receiver_id: UserId,
        receiver_slot_id: SlotId,
        now: DateTime<Utc>,
    ) -> SwapResult<SwapRequest> {
        SwapRequest::new(
            requester_id,
            requester_slot_id,
            receiver_id,
            receiver_slot_id,
            now,
        )
    }

    pub(crate) fn stage_status(&self, id: &SwapRequestId, to: SwapStatus) -> SwapResult<SwapRequest> {
        let mut staged = self.get(id)?.clone();
        staged.settle(to)?;
        Ok(staged)
    }

    /// Conditional-write precheck
    ///
    /// New requests must not collide with an active one; existing requests
    /// must still be PENDING at the version they were read at.
    pub fn check_write(&self, staged: &SwapRequest) -> SwapResult<()> {
        match self.requests.get(&staged.id) {
            None => {
                if let Some(existing) =
                    self.find_active_conflict(&staged.requester_slot_id, &staged.receiver_slot_id)
                {
                    return Err(SwapError::Conflict(format!(
                        "A swap request already exists for these slots ({})",
                        existing.id
                    )));
                }
                Ok(())
            }
            Some(stored) => {
                if stored.status.is_terminal() {
                    return Err(SwapError::State(format!(
                        "Swap request is already {}",
                        stored.status
                    )));
                }
                if stored.version != staged.version {
                    return Err(SwapError::Conflict(format!(
                        "Swap request {} was modified concurrently (expected version {}, found {})",
                        staged.id, staged.version, stored.version
                    )));
                }
                Ok(())
            }
        }
    }

    /// Write a checked request; new records get the next sequence number
    pub(crate) fn apply_write(&mut self, mut staged: SwapRequest, now: DateTime<Utc>) -> SwapRequest {
        if self.requests.contains_key(&staged.id) {
            staged.version += 1;
            staged.updated_at = now;
        } else {
            staged.sequence = self.next_sequence;
            self.next_sequence += 1;
        }
        self.requests.insert(staged.id, staged.clone());
        staged
    }

    fn collect_newest_first(&self, keep: impl Fn(&SwapRequest) -> bool) -> Vec<SwapRequest> {
        let mut out: Vec<SwapRequest> = self.requests.values().filter(|r| keep(r)).cloned().collect();
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        out
    }
}
