//! Slot store
//!
//! Owns every `Slot` record. Owner-facing writes (`set_status`, `delete`)
//! enforce the SWAP_PENDING freeze; transitions into and out of
//! SWAP_PENDING are staged by the negotiation engine and applied through
//! version-checked writes.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use types::errors::{SwapError, SwapResult};
use types::ids::{SlotId, UserId};
use types::slot::{NewSlot, Slot, SlotStatus};

#[derive(Debug, Default)]
pub struct SlotStore {
    slots: HashMap<SlotId, Slot>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Validate input and persist a new BUSY slot
    pub fn create(&mut self, owner: UserId, input: &NewSlot, now: DateTime<Utc>) -> SwapResult<Slot> {
        let slot = Slot::create(owner, input, now)?;
        self.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    /// Insert an existing record (snapshot restore)
    pub fn insert(&mut self, slot: Slot) -> SwapResult<()> {
        if !slot.check_invariant() {
            return Err(SwapError::validation(
                "endTime",
                format!("slot {} ends before it starts", slot.id),
            ));
        }
        if self.slots.contains_key(&slot.id) {
            return Err(SwapError::Conflict(format!("Slot {} already exists", slot.id)));
        }
        self.slots.insert(slot.id, slot);
        Ok(())
    }

    pub fn get(&self, id: &SlotId) -> SwapResult<&Slot> {
        self.slots.get(id).ok_or_else(|| SwapError::slot_not_found(id))
    }

    /// All slots of `owner`, earliest first
    pub fn list_by_owner(&self, owner: &UserId) -> Vec<Slot> {
        self.collect_sorted(|slot| slot.owner_id == *owner)
    }

    /// Marketplace listing: SWAPPABLE slots of everyone but `owner`
    pub fn list_swappable_excluding(&self, owner: &UserId) -> Vec<Slot> {
        self.collect_sorted(|slot| slot.status == SlotStatus::Swappable && slot.owner_id != *owner)
    }

    /// Owner toggle between BUSY and SWAPPABLE
    pub fn set_status(&mut self, id: &SlotId, to: SlotStatus, now: DateTime<Utc>) -> SwapResult<Slot> {
        if !to.is_user_settable() {
            return Err(SwapError::validation("status", "Status must be BUSY or SWAPPABLE"));
        }
        let current = self.get(id)?;
        if current.status == SlotStatus::SwapPending {
            return Err(SwapError::State(format!(
                "Cannot modify slot {} while swap is pending",
                id
            )));
        }
        let staged = self.stage_transition(id, to)?;
        self.put_if_version(staged, now)
    }

    /// Move a SWAP_PENDING slot to `new_owner`
    pub fn transfer_ownership(
        &mut self,
        id: &SlotId,
        new_owner: UserId,
        new_status: SlotStatus,
        now: DateTime<Utc>,
    ) -> SwapResult<Slot> {
        let staged = self.stage_transfer(id, new_owner, new_status)?;
        self.put_if_version(staged, now)
    }

    pub fn delete(&mut self, id: &SlotId) -> SwapResult<Slot> {
        let current = self.get(id)?;
        if current.status == SlotStatus::SwapPending {
            return Err(SwapError::State(format!(
                "Cannot delete slot {} while swap is pending",
                id
            )));
        }
        self.slots
            .remove(id)
            .ok_or_else(|| SwapError::slot_not_found(id))
    }

    /// Copy of the slot moved to `to`, not yet written
    pub(crate) fn stage_transition(&self, id: &SlotId, to: SlotStatus) -> SwapResult<Slot> {
        let mut staged = self.get(id)?.clone();
        staged.transition(to)?;
        Ok(staged)
    }

    /// Copy of the slot handed to `new_owner`, not yet written
    pub(crate) fn stage_transfer(
        &self,
        id: &SlotId,
        new_owner: UserId,
        new_status: SlotStatus,
    ) -> SwapResult<Slot> {
        let mut staged = self.get(id)?.clone();
        staged.transfer_to(new_owner, new_status)?;
        Ok(staged)
    }

    /// Conditional-write precheck: the stored version must equal the
    /// version the staged copy was read at
    pub fn check_write(&self, staged: &Slot) -> SwapResult<()> {
        let stored = self.slots.get(&staged.id).ok_or_else(|| {
            SwapError::Conflict(format!("Slot {} was deleted concurrently", staged.id))
        })?;
        if stored.version != staged.version {
            return Err(SwapError::Conflict(format!(
                "Slot {} was modified concurrently (expected version {}, found {})",
                staged.id, staged.version, stored.version
            )));
        }
        Ok(())
    }

    /// Write a checked copy, bumping its version
    pub(crate) fn apply_write(&mut self, mut staged: Slot, now: DateTime<Utc>) -> Slot {
        staged.version += 1;
        staged.updated_at = now;
        self.slots.insert(staged.id, staged.clone());
        staged
    }

    /// Version-guarded single write
    pub fn put_if_version(&mut self, staged: Slot, now: DateTime<Utc>) -> SwapResult<Slot> {
        self.check_write(&staged)?;
        Ok(self.apply_write(staged, now))
    }

    fn collect_sorted(&self, keep: impl Fn(&Slot) -> bool) -> Vec<Slot> {
        let mut out: Vec<Slot> = self.slots.values().filter(|s| keep(s)).cloned().collect();
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        out
    }
}
