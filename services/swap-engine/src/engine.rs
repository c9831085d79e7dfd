//! Negotiation engine
//!
//! Coordinates the slot store and the swap ledger. Each operation runs its
//! read-validate-write sequence inside one critical section, and the
//! writes themselves are version-checked and applied all-or-nothing.

use chrono::Utc;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use types::errors::{SwapError, SwapResult};
use types::ids::{SlotId, SwapRequestId, UserId};
use types::slot::{NewSlot, Slot, SlotStatus};
use types::swap::{MyRequests, SlotSummary, SwapAction, SwapRequest, SwapRequestView, SwapStatus};
use types::user::{UserProfile, UserSummary};

use crate::directory::UserDirectory;
use crate::events::{EventLog, SwapEvent, SwapEventKind, DEFAULT_EVENT_CAPACITY};
use crate::guard;
use crate::snapshot::Snapshot;
use crate::store::Books;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of transition events retained for polling clients
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Marketplace listing entry: a slot with its owner's summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSlot {
    #[serde(flatten)]
    pub slot: Slot,
    pub owner: UserSummary,
}

struct EngineState {
    books: Books,
    events: EventLog,
}

/// Slot swap negotiation engine
///
/// Shared across request handlers behind an `Arc`.
pub struct NegotiationEngine {
    state: Mutex<EngineState>,
    directory: UserDirectory,
}

impl NegotiationEngine {
    /// Create an empty engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_parts(
            Books::new(),
            EventLog::new(config.event_capacity),
            UserDirectory::new(),
        )
    }

    fn from_parts(books: Books, events: EventLog, directory: UserDirectory) -> Self {
        Self {
            state: Mutex::new(EngineState { books, events }),
            directory,
        }
    }

    /// Rebuild an engine from a snapshot, verifying cross-store invariants
    pub fn restore(snapshot: Snapshot, config: EngineConfig) -> SwapResult<Self> {
        let mut books = Books::new();
        for slot in snapshot.slots {
            books.slots.insert(slot)?;
        }
        let mut requests = snapshot.requests;
        requests.sort_by_key(|r| r.sequence);
        for request in requests {
            books.ledger.insert(request)?;
        }
        books.verify()?;

        let directory = UserDirectory::new();
        for profile in snapshot.users {
            directory.register(profile);
        }

        let events = EventLog::resume(
            config.event_capacity,
            snapshot.events,
            snapshot.last_event_sequence,
        );

        info!(
            slots = books.slots.len(),
            requests = books.ledger.len(),
            users = directory.len(),
            last_event = events.last_sequence(),
            "Restored negotiation engine from snapshot"
        );
        Ok(Self::from_parts(books, events, directory))
    }

    /// Consistent image of both stores and the directory
    pub fn snapshot(&self) -> SwapResult<Snapshot> {
        let state = self.lock()?;
        let mut slots: Vec<Slot> = state.books.slots.iter().cloned().collect();
        slots.sort_by_key(|s| s.id);
        let mut requests: Vec<SwapRequest> = state.books.ledger.iter().cloned().collect();
        requests.sort_by_key(|r| r.sequence);
        Ok(Snapshot {
            slots,
            requests,
            users: self.directory.profiles(),
            events: state.events.since(0),
            last_event_sequence: state.events.last_sequence(),
        })
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Record or refresh the caller's display profile
    pub fn register_user(&self, profile: UserProfile) {
        self.directory.register(profile);
    }

    /// Verify cross-store invariants
    pub fn check_invariants(&self) -> SwapResult<()> {
        self.lock()?.books.verify()
    }

    // ───────────────────────── Slot operations ─────────────────────────

    pub fn create_slot(&self, owner: UserId, input: &NewSlot) -> SwapResult<Slot> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let slot = state.books.slots.create(owner, input, now)?;
        state.events.record(
            SwapEventKind::SlotCreated {
                slot_id: slot.id,
                owner_id: owner,
            },
            now,
        );
        info!(slot_id = %slot.id, user_id = %owner, "Slot created");
        Ok(slot)
    }

    /// Single slot, visible to its owner only
    pub fn get_slot(&self, caller: UserId, id: SlotId) -> SwapResult<Slot> {
        let state = self.lock()?;
        let slot = state.books.slots.get(&id)?;
        guard::require_owner(slot, &caller, "access")?;
        Ok(slot.clone())
    }

    pub fn list_my_slots(&self, caller: UserId) -> SwapResult<Vec<Slot>> {
        Ok(self.lock()?.books.slots.list_by_owner(&caller))
    }

    /// SWAPPABLE slots of every other user, earliest first
    pub fn list_marketplace(&self, caller: UserId) -> SwapResult<Vec<MarketplaceSlot>> {
        let slots = self.lock()?.books.slots.list_swappable_excluding(&caller);
        Ok(slots
            .into_iter()
            .map(|slot| MarketplaceSlot {
                owner: self.directory.summary(&slot.owner_id),
                slot,
            })
            .collect())
    }

    /// Owner toggle between BUSY and SWAPPABLE
    pub fn update_slot_status(&self, caller: UserId, id: SlotId, to: SlotStatus) -> SwapResult<Slot> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let current = state.books.slots.get(&id)?;
        guard::require_owner(current, &caller, "update")?;
        let from = current.status;

        let slot = state.books.slots.set_status(&id, to, now)?;
        state.events.record(
            SwapEventKind::SlotStatusChanged {
                slot_id: id,
                owner_id: caller,
                from,
                to,
            },
            now,
        );
        info!(slot_id = %id, user_id = %caller, %from, %to, "Slot status updated");
        Ok(slot)
    }

    pub fn delete_slot(&self, caller: UserId, id: SlotId) -> SwapResult<()> {
        let now = Utc::now();
        let mut state = self.lock()?;
        guard::require_owner(state.books.slots.get(&id)?, &caller, "delete")?;

        state.books.slots.delete(&id)?;
        state.events.record(
            SwapEventKind::SlotDeleted {
                slot_id: id,
                owner_id: caller,
            },
            now,
        );
        info!(slot_id = %id, user_id = %caller, "Slot deleted");
        Ok(())
    }

    // ───────────────────────── Negotiation ─────────────────────────

    /// Stake `my_slot` against `their_slot`
    ///
    /// On success both slots are SWAP_PENDING and a PENDING request names
    /// the caller as requester and the counterparty's owner as receiver.
    pub fn propose_swap(
        &self,
        requester: UserId,
        my_slot_id: SlotId,
        their_slot_id: SlotId,
    ) -> SwapResult<SwapRequestView> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let books = &mut state.books;

        let my_slot = books.slots.get(&my_slot_id)?;
        let their_slot = books.slots.get(&their_slot_id)?;

        guard::require_owner(my_slot, &requester, "swap")?;
        guard::require_not_owner(their_slot, &requester)?;

        for (label, slot) in [("Your", my_slot), ("Their", their_slot)] {
            if slot.status != SlotStatus::Swappable {
                warn!(slot_id = %slot.id, status = %slot.status, "Swap proposal on unavailable slot");
                return Err(SwapError::Conflict(format!(
                    "{} slot {} is {}, must be SWAPPABLE",
                    label, slot.id, slot.status
                )));
            }
        }

        if let Some(existing) = books.ledger.find_active_conflict(&my_slot_id, &their_slot_id) {
            warn!(request_id = %existing.id, "Duplicate swap proposal");
            return Err(SwapError::Conflict(format!(
                "A swap request already exists for these slots ({})",
                existing.id
            )));
        }

        let receiver = their_slot.owner_id;
        let staged_slots = vec![
            books.slots.stage_transition(&my_slot_id, SlotStatus::SwapPending)?,
            books.slots.stage_transition(&their_slot_id, SlotStatus::SwapPending)?,
        ];
        let staged_request =
            books
                .ledger
                .stage_create(requester, my_slot_id, receiver, their_slot_id, now)?;

        let (_, request) = books.commit(staged_slots, staged_request, now)?;

        state.events.record(
            SwapEventKind::SwapProposed {
                request_id: request.id,
                requester_id: requester,
                receiver_id: receiver,
                requester_slot_id: my_slot_id,
                receiver_slot_id: their_slot_id,
            },
            now,
        );
        info!(
            request_id = %request.id,
            user_id = %requester,
            receiver_id = %receiver,
            "Swap proposed"
        );

        Ok(self.view(&state.books, &request))
    }

    /// Accept or reject a PENDING request addressed to `responder`
    pub fn respond_to_swap(
        &self,
        responder: UserId,
        request_id: SwapRequestId,
        action: SwapAction,
    ) -> SwapResult<SwapRequestView> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let books = &mut state.books;

        let request = books.ledger.get(&request_id)?;
        guard::require_receiver(request, &responder)?;

        if !request.is_pending() {
            warn!(request_id = %request_id, status = %request.status, "Response to settled request");
            return Err(SwapError::Conflict(format!(
                "Swap request is already {}",
                request.status
            )));
        }

        let (requester_id, receiver_id) = (request.requester_id, request.receiver_id);
        let (requester_slot_id, receiver_slot_id) =
            (request.requester_slot_id, request.receiver_slot_id);

        let staged_slots = match action {
            SwapAction::ACCEPT => vec![
                books
                    .slots
                    .stage_transfer(&requester_slot_id, receiver_id, SlotStatus::Busy)?,
                books
                    .slots
                    .stage_transfer(&receiver_slot_id, requester_id, SlotStatus::Busy)?,
            ],
            SwapAction::REJECT => vec![
                books
                    .slots
                    .stage_transition(&requester_slot_id, SlotStatus::Swappable)?,
                books
                    .slots
                    .stage_transition(&receiver_slot_id, SlotStatus::Swappable)?,
            ],
        };
        let staged_request = books.ledger.stage_status(&request_id, action.outcome())?;

        let (_, request) = books.commit(staged_slots, staged_request, now)?;

        let kind = match request.status {
            SwapStatus::Accepted => SwapEventKind::SwapAccepted {
                request_id,
                requester_id,
                receiver_id,
            },
            _ => SwapEventKind::SwapRejected {
                request_id,
                requester_id,
                receiver_id,
            },
        };
        state.events.record(kind, now);
        info!(
            request_id = %request_id,
            user_id = %responder,
            status = %request.status,
            "Swap request settled"
        );

        Ok(self.view(&state.books, &request))
    }

    /// Incoming and outgoing requests of `user`, newest first
    pub fn my_requests(&self, user: UserId) -> SwapResult<MyRequests> {
        let state = self.lock()?;
        let books = &state.books;
        let resolve = |requests: Vec<SwapRequest>| -> Vec<SwapRequestView> {
            requests.iter().map(|r| self.view(books, r)).collect()
        };
        Ok(MyRequests {
            incoming: resolve(books.ledger.list_incoming(&user)),
            outgoing: resolve(books.ledger.list_outgoing(&user)),
        })
    }

    /// Notification badge count
    pub fn pending_incoming_count(&self, user: UserId) -> SwapResult<usize> {
        Ok(self.lock()?.books.ledger.count_pending_incoming(&user))
    }

    /// Events involving `user` with a sequence above `after`
    pub fn events_for(&self, user: UserId, after: u64) -> SwapResult<Vec<SwapEvent>> {
        let state = self.lock()?;
        Ok(state
            .events
            .since(after)
            .into_iter()
            .filter(|e| e.kind.involves(&user))
            .collect())
    }

    pub fn recent_events(&self, limit: usize) -> SwapResult<Vec<SwapEvent>> {
        Ok(self.lock()?.events.recent(limit))
    }

    fn view(&self, books: &Books, request: &SwapRequest) -> SwapRequestView {
        let summary = |id: &SlotId| books.slots.get(id).ok().map(SlotSummary::from);
        SwapRequestView {
            id: request.id,
            status: request.status,
            requester: self.directory.summary(&request.requester_id),
            receiver: self.directory.summary(&request.receiver_id),
            requester_slot: summary(&request.requester_slot_id),
            receiver_slot: summary(&request.receiver_slot_id),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }

    fn lock(&self) -> SwapResult<MutexGuard<'_, EngineState>> {
        self.state.lock().map_err(|_| {
            debug!("negotiation engine lock poisoned");
            SwapError::Internal("engine state lock poisoned".into())
        })
    }
}

impl Default for NegotiationEngine {
    fn default() -> Self {
        Self::new()
    }
}
