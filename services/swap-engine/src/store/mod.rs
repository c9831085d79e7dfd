//! Record stores
//!
//! `Books` pairs the slot store with the swap ledger so that one
//! negotiation step can be committed to both as a single unit.

pub mod ledger;
pub mod slots;

pub use ledger::SwapLedger;
pub use slots::SlotStore;

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use types::errors::{SwapError, SwapResult};
use types::ids::{SlotId, SwapRequestId};
use types::slot::{Slot, SlotStatus};
use types::swap::SwapRequest;

#[derive(Debug, Default)]
pub struct Books {
    pub slots: SlotStore,
    pub ledger: SwapLedger,
}

impl Books {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a staged negotiation step atomically
    ///
    /// Every write is version-checked before any is applied, so a failed
    /// check leaves both stores untouched.
    pub fn commit(
        &mut self,
        slots: Vec<Slot>,
        request: SwapRequest,
        now: DateTime<Utc>,
    ) -> SwapResult<(Vec<Slot>, SwapRequest)> {
        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.id) {
                return Err(SwapError::Internal(format!(
                    "slot {} staged twice in one commit",
                    slot.id
                )));
            }
            self.slots.check_write(slot)?;
        }
        self.ledger.check_write(&request)?;

        let slots = slots
            .into_iter()
            .map(|slot| self.slots.apply_write(slot, now))
            .collect();
        let request = self.ledger.apply_write(request, now);
        Ok((slots, request))
    }

    /// Check the cross-store invariants
    ///
    /// - every slot ends after it starts
    /// - no slot is staked by two PENDING requests
    /// - a slot is SWAP_PENDING iff exactly one PENDING request stakes it
    /// - a PENDING request's slots are still held by its two parties
    pub fn verify(&self) -> SwapResult<()> {
        let mut stakes: HashMap<SlotId, SwapRequestId> = HashMap::new();

        for slot in self.slots.iter() {
            if !slot.check_invariant() {
                return Err(invariant(format!("slot {} ends before it starts", slot.id)));
            }
        }

        for request in self.ledger.iter().filter(|r| r.is_pending()) {
            if request.requester_id == request.receiver_id {
                return Err(invariant(format!("request {} is a self-swap", request.id)));
            }
            let legs = [
                (request.requester_slot_id, request.requester_id),
                (request.receiver_slot_id, request.receiver_id),
            ];
            for (slot_id, party) in legs {
                if let Some(other) = stakes.insert(slot_id, request.id) {
                    return Err(invariant(format!(
                        "slot {} staked by pending requests {} and {}",
                        slot_id, other, request.id
                    )));
                }
                let slot = self.slots.get(&slot_id).map_err(|_| {
                    invariant(format!(
                        "pending request {} references missing slot {}",
                        request.id, slot_id
                    ))
                })?;
                if slot.status != SlotStatus::SwapPending {
                    return Err(invariant(format!(
                        "slot {} is {} but staked by pending request {}",
                        slot_id, slot.status, request.id
                    )));
                }
                if slot.owner_id != party {
                    return Err(invariant(format!(
                        "slot {} changed hands while request {} is pending",
                        slot_id, request.id
                    )));
                }
            }
        }

        for slot in self.slots.iter() {
            if slot.status == SlotStatus::SwapPending && !stakes.contains_key(&slot.id) {
                return Err(invariant(format!(
                    "slot {} is SWAP_PENDING without a pending request",
                    slot.id
                )));
            }
        }

        Ok(())
    }
}

fn invariant(detail: String) -> SwapError {
    SwapError::Internal(format!("invariant violated: {}", detail))
}
