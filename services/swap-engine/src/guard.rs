//! Access guard
//!
//! Side-effect free ownership checks run by the engine before every
//! mutation.

use types::errors::{SwapError, SwapResult};
use types::ids::UserId;
use types::slot::Slot;
use types::swap::SwapRequest;

pub fn is_owner(slot: &Slot, user: &UserId) -> bool {
    slot.owner_id == *user
}

pub fn is_receiver(request: &SwapRequest, user: &UserId) -> bool {
    request.receiver_id == *user
}

/// Caller must own `slot`; `action` names the attempted operation
pub fn require_owner(slot: &Slot, user: &UserId, action: &str) -> SwapResult<()> {
    if !is_owner(slot, user) {
        return Err(SwapError::Forbidden(format!(
            "Not authorized to {} slot {}",
            action, slot.id
        )));
    }
    Ok(())
}

/// Caller must not own the counterparty slot
pub fn require_not_owner(slot: &Slot, user: &UserId) -> SwapResult<()> {
    if is_owner(slot, user) {
        return Err(SwapError::InvalidOperation(format!(
            "Cannot request swap with your own slot {}",
            slot.id
        )));
    }
    Ok(())
}

pub fn require_receiver(request: &SwapRequest, user: &UserId) -> SwapResult<()> {
    if !is_receiver(request, user) {
        return Err(SwapError::Forbidden(format!(
            "Only the receiver can respond to swap request {}",
            request.id
        )));
    }
    Ok(())
}
