//! End-to-end negotiation scenarios
//!
//! Two users, one slot each, walked through propose / reject / accept.

use swap_engine::NegotiationEngine;
use types::errors::SwapError;
use types::ids::{SlotId, UserId};
use types::slot::{NewSlot, SlotStatus};
use types::swap::{SwapAction, SwapStatus};

struct World {
    engine: NegotiationEngine,
    alice: UserId,
    bob: UserId,
    /// Alice's "Team Meeting"
    a: SlotId,
    /// Bob's "Focus Block"
    b: SlotId,
}

fn world() -> World {
    let engine = NegotiationEngine::new();
    let (alice, bob) = (UserId::new(), UserId::new());

    let a = engine
        .create_slot(
            alice,
            &NewSlot::new("Team Meeting", "2025-03-03T10:00:00Z", "2025-03-03T11:00:00Z"),
        )
        .unwrap()
        .id;
    let b = engine
        .create_slot(
            bob,
            &NewSlot::new("Focus Block", "2025-03-05T14:00:00Z", "2025-03-05T15:00:00Z"),
        )
        .unwrap()
        .id;
    engine.update_slot_status(alice, a, SlotStatus::Swappable).unwrap();
    engine.update_slot_status(bob, b, SlotStatus::Swappable).unwrap();

    World {
        engine,
        alice,
        bob,
        a,
        b,
    }
}

#[test]
fn test_scenario_reject_restores_both_slots() {
    let w = world();
    let proposal = w.engine.propose_swap(w.bob, w.b, w.a).unwrap();
    assert_eq!(proposal.status, SwapStatus::Pending);

    let settled = w
        .engine
        .respond_to_swap(w.alice, proposal.id, SwapAction::REJECT)
        .unwrap();
    assert_eq!(settled.status, SwapStatus::Rejected);

    let a = w.engine.get_slot(w.alice, w.a).unwrap();
    let b = w.engine.get_slot(w.bob, w.b).unwrap();
    assert_eq!(a.status, SlotStatus::Swappable);
    assert_eq!(b.status, SlotStatus::Swappable);
    assert_eq!(a.owner_id, w.alice);
    assert_eq!(b.owner_id, w.bob);

    // Both slots are back on the market
    assert_eq!(w.engine.list_marketplace(w.alice).unwrap()[0].slot.id, w.b);
    assert_eq!(w.engine.list_marketplace(w.bob).unwrap()[0].slot.id, w.a);
    w.engine.check_invariants().unwrap();
}

#[test]
fn test_scenario_accept_exchanges_owners() {
    let w = world();
    let proposal = w.engine.propose_swap(w.bob, w.b, w.a).unwrap();

    let settled = w
        .engine
        .respond_to_swap(w.alice, proposal.id, SwapAction::ACCEPT)
        .unwrap();
    assert_eq!(settled.status, SwapStatus::Accepted);

    let alices: Vec<SlotId> = w
        .engine
        .list_my_slots(w.alice)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    let bobs: Vec<SlotId> = w
        .engine
        .list_my_slots(w.bob)
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(alices, vec![w.b]);
    assert_eq!(bobs, vec![w.a]);

    let a = w.engine.get_slot(w.bob, w.a).unwrap();
    let b = w.engine.get_slot(w.alice, w.b).unwrap();
    assert_eq!(a.status, SlotStatus::Busy);
    assert_eq!(b.status, SlotStatus::Busy);

    // Former owners lose access
    assert!(matches!(
        w.engine.get_slot(w.alice, w.a),
        Err(SwapError::Forbidden(_))
    ));
    w.engine.check_invariants().unwrap();
}

#[test]
fn test_scenario_settled_request_cannot_be_answered_again() {
    let w = world();
    let proposal = w.engine.propose_swap(w.bob, w.b, w.a).unwrap();
    w.engine
        .respond_to_swap(w.alice, proposal.id, SwapAction::ACCEPT)
        .unwrap();
    let before = w.engine.snapshot().unwrap();

    for action in [SwapAction::ACCEPT, SwapAction::REJECT] {
        let err = w
            .engine
            .respond_to_swap(w.alice, proposal.id, action)
            .unwrap_err();
        match err {
            SwapError::Conflict(msg) => assert!(msg.contains("ACCEPTED")),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    let after = w.engine.snapshot().unwrap();
    assert_eq!(before.slots, after.slots);
    assert_eq!(before.requests, after.requests);
}

#[test]
fn test_scenario_duplicate_proposal_conflicts() {
    let w = world();
    w.engine.propose_swap(w.bob, w.b, w.a).unwrap();

    let err = w.engine.propose_swap(w.bob, w.b, w.a).unwrap_err();
    assert!(matches!(err, SwapError::Conflict(_)));

    // The counterparty cannot open the mirror request either
    let err = w.engine.propose_swap(w.alice, w.a, w.b).unwrap_err();
    assert!(matches!(err, SwapError::Conflict(_)));

    let mine = w.engine.my_requests(w.bob).unwrap();
    assert_eq!(mine.outgoing.len(), 1);
    assert!(mine.incoming.is_empty());
    assert_eq!(w.engine.pending_incoming_count(w.alice).unwrap(), 1);
}

#[test]
fn test_scenario_accept_is_symmetric_in_roles() {
    // Same pair of slots, this time Alice proposes and Bob accepts
    let w = world();
    let proposal = w.engine.propose_swap(w.alice, w.a, w.b).unwrap();
    w.engine
        .respond_to_swap(w.bob, proposal.id, SwapAction::ACCEPT)
        .unwrap();

    assert_eq!(w.engine.get_slot(w.bob, w.a).unwrap().owner_id, w.bob);
    assert_eq!(w.engine.get_slot(w.alice, w.b).unwrap().owner_id, w.alice);
    w.engine.check_invariants().unwrap();
}

#[test]
fn test_scenario_pending_slot_is_frozen() {
    let w = world();
    w.engine.propose_swap(w.bob, w.b, w.a).unwrap();

    for to in [SlotStatus::Busy, SlotStatus::Swappable] {
        let err = w.engine.update_slot_status(w.alice, w.a, to).unwrap_err();
        assert!(matches!(err, SwapError::State(_)));
    }
    let err = w.engine.delete_slot(w.bob, w.b).unwrap_err();
    assert!(matches!(err, SwapError::State(_)));

    // Pending slots are not on the market
    assert!(w.engine.list_marketplace(w.alice).unwrap().is_empty());
}

#[test]
fn test_scenario_my_requests_newest_first() {
    let w = world();
    let carol = UserId::new();
    let c = w
        .engine
        .create_slot(
            carol,
            &NewSlot::new("1:1", "2025-03-07T09:00:00Z", "2025-03-07T09:30:00Z"),
        )
        .unwrap()
        .id;
    w.engine.update_slot_status(carol, c, SlotStatus::Swappable).unwrap();

    let first = w.engine.propose_swap(w.bob, w.b, w.a).unwrap();
    w.engine
        .respond_to_swap(w.alice, first.id, SwapAction::REJECT)
        .unwrap();
    let second = w.engine.propose_swap(w.bob, w.b, c).unwrap();

    let outgoing: Vec<_> = w
        .engine
        .my_requests(w.bob)
        .unwrap()
        .outgoing
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(outgoing, vec![second.id, first.id]);
    assert_eq!(w.engine.pending_incoming_count(carol).unwrap(), 1);
    assert_eq!(w.engine.pending_incoming_count(w.alice).unwrap(), 0);
}
