//! Request and response bodies
//!
//! Fields arrive as optional strings so that missing or malformed values
//! surface as validation errors naming the field, not as extractor
//! rejections.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use types::errors::{SwapError, SwapResult};
use types::ids::SlotId;
use types::slot::SlotStatus;
use types::swap::{SwapAction, SwapRequestView};

fn required<'a>(field: &str, value: &'a Option<String>) -> SwapResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SwapError::validation(field, "is required")),
    }
}

fn slot_id(field: &str, value: &Option<String>) -> SwapResult<SlotId> {
    SlotId::from_str(required(field, value)?)
        .map_err(|_| SwapError::validation(field, "is not a valid slot id"))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    pub fn status(&self) -> SwapResult<SlotStatus> {
        required("status", &self.status)?.parse()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequest {
    #[serde(default)]
    pub my_slot_id: Option<String>,
    #[serde(default)]
    pub their_slot_id: Option<String>,
}

impl CreateSwapRequest {
    pub fn slots(&self) -> SwapResult<(SlotId, SlotId)> {
        Ok((
            slot_id("mySlotId", &self.my_slot_id)?,
            slot_id("theirSlotId", &self.their_slot_id)?,
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RespondSwapRequest {
    #[serde(default)]
    pub action: Option<String>,
}

impl RespondSwapRequest {
    pub fn action(&self) -> SwapResult<SwapAction> {
        match &self.action {
            Some(raw) => raw.parse(),
            None => Err(SwapError::validation("action", "action must be ACCEPT or REJECT")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    /// Only events with a greater sequence are returned
    #[serde(default)]
    pub after: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub pending_incoming: usize,
}

/// Envelope returned by the negotiation endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestResponse {
    pub success: bool,
    pub message: String,
    pub swap_request: SwapRequestView,
}

impl SwapRequestResponse {
    pub fn new(message: impl Into<String>, swap_request: SwapRequestView) -> Self {
        Self {
            success: true,
            message: message.into(),
            swap_request,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
