//! Slot Swap Negotiation Engine
//!
//! Users publish calendar slots, mark them SWAPPABLE, and trade ownership
//! pairwise through swap requests.
//!
//! **Key Invariants:**
//! - Every slot ends after it starts
//! - A SWAP_PENDING slot is staked by exactly one PENDING request
//! - No slot is staked by two PENDING requests at once
//! - ACCEPTED and REJECTED requests never change again
//! - A failed operation leaves no partial writes

pub mod directory;
pub mod engine;
pub mod events;
pub mod guard;
pub mod snapshot;
pub mod store;

pub use engine::{EngineConfig, MarketplaceSlot, NegotiationEngine};
pub use snapshot::{Snapshot, SnapshotError};
