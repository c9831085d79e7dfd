//! Property tests: arbitrary operation sequences never break the
//! cross-store invariants, whatever mix of successes and failures they
//! produce.

use proptest::prelude::*;
use swap_engine::NegotiationEngine;
use types::ids::{SlotId, SwapRequestId, UserId};
use types::slot::{NewSlot, SlotStatus};
use types::swap::SwapAction;

const USERS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Create { user: usize, day: u32, hours: u32 },
    Toggle { user: usize, slot: usize, swappable: bool },
    Delete { user: usize, slot: usize },
    Propose { user: usize, mine: usize, theirs: usize },
    Respond { user: usize, request: usize, accept: bool },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..USERS, 1u32..28, 1u32..4).prop_map(|(user, day, hours)| Op::Create { user, day, hours }),
        (0..USERS, 0usize..16, any::<bool>())
            .prop_map(|(user, slot, swappable)| Op::Toggle { user, slot, swappable }),
        (0..USERS, 0usize..16).prop_map(|(user, slot)| Op::Delete { user, slot }),
        (0..USERS, 0usize..16, 0usize..16)
            .prop_map(|(user, mine, theirs)| Op::Propose { user, mine, theirs }),
        (0..USERS, 0usize..16, any::<bool>())
            .prop_map(|(user, request, accept)| Op::Respond { user, request, accept }),
    ]
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[index % items.len()])
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_after_every_step(ops in prop::collection::vec(op(), 1..60)) {
        let engine = NegotiationEngine::new();
        let users: Vec<UserId> = (0..USERS).map(|_| UserId::new()).collect();
        let mut slots: Vec<SlotId> = Vec::new();
        let mut requests: Vec<SwapRequestId> = Vec::new();

        for op in ops {
            // Outcomes are ignored; only the resulting state matters
            match op {
                Op::Create { user, day, hours } => {
                    let input = NewSlot::new(
                        "Generated",
                        format!("2025-05-{:02}T08:00:00Z", day),
                        format!("2025-05-{:02}T{:02}:00:00Z", day, 8 + hours),
                    );
                    if let Ok(slot) = engine.create_slot(users[user], &input) {
                        slots.push(slot.id);
                    }
                }
                Op::Toggle { user, slot, swappable } => {
                    if let Some(id) = pick(&slots, slot) {
                        let to = if swappable { SlotStatus::Swappable } else { SlotStatus::Busy };
                        let _ = engine.update_slot_status(users[user], id, to);
                    }
                }
                Op::Delete { user, slot } => {
                    if let Some(id) = pick(&slots, slot) {
                        let _ = engine.delete_slot(users[user], id);
                    }
                }
                Op::Propose { user, mine, theirs } => {
                    if let (Some(a), Some(b)) = (pick(&slots, mine), pick(&slots, theirs)) {
                        if let Ok(view) = engine.propose_swap(users[user], a, b) {
                            requests.push(view.id);
                        }
                    }
                }
                Op::Respond { user, request, accept } => {
                    if let Some(id) = pick(&requests, request) {
                        let action = if accept { SwapAction::ACCEPT } else { SwapAction::REJECT };
                        let _ = engine.respond_to_swap(users[user], id, action);
                    }
                }
            }
            prop_assert!(engine.check_invariants().is_ok());
        }

        // A restored engine sees the same world
        let snapshot = engine.snapshot().unwrap();
        let restored = NegotiationEngine::restore(snapshot.clone(), Default::default()).unwrap();
        prop_assert_eq!(restored.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn pending_count_matches_incoming_pending(ops in prop::collection::vec(op(), 1..40)) {
        let engine = NegotiationEngine::new();
        let users: Vec<UserId> = (0..USERS).map(|_| UserId::new()).collect();
        let mut slots: Vec<SlotId> = Vec::new();

        for op in ops {
            match op {
                Op::Create { user, day, .. } => {
                    let input = NewSlot::new(
                        "Generated",
                        format!("2025-06-{:02}T08:00:00Z", day),
                        format!("2025-06-{:02}T09:00:00Z", day),
                    );
                    if let Ok(slot) = engine.create_slot(users[user], &input) {
                        let _ = engine.update_slot_status(users[user], slot.id, SlotStatus::Swappable);
                        slots.push(slot.id);
                    }
                }
                Op::Propose { user, mine, theirs } => {
                    if let (Some(a), Some(b)) = (pick(&slots, mine), pick(&slots, theirs)) {
                        let _ = engine.propose_swap(users[user], a, b);
                    }
                }
                _ => {}
            }
        }

        for user in &users {
            let listed = engine
                .my_requests(*user)
                .unwrap()
                .incoming
                .iter()
                .filter(|r| r.status == types::swap::SwapStatus::Pending)
                .count();
            prop_assert_eq!(engine.pending_incoming_count(*user).unwrap(), listed);
        }
    }
}
