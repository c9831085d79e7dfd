//! Calendar slot types
//!
//! A slot is a user-owned time interval that may be offered for trade.
//! Its status is a small finite-state machine:
//!
//! ```text
//! BUSY <-> SWAPPABLE -> SWAP_PENDING -> { BUSY, SWAPPABLE }
//! ```
//!
//! `BUSY <-> SWAPPABLE` is driven by the owner. Entering and leaving
//! `SWAP_PENDING` is reserved for the negotiation engine.

use crate::errors::{SwapError, SwapResult};
use crate::ids::{SlotId, UserId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum title length after trimming
pub const MAX_TITLE_LEN: usize = 100;

/// Naive formats accepted in addition to RFC 3339 (interpreted as UTC)
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Slot status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    /// Not offered for trade
    #[serde(rename = "BUSY")]
    Busy,

    /// Listed on the marketplace
    #[serde(rename = "SWAPPABLE")]
    Swappable,

    /// Staked in exactly one active negotiation
    #[serde(rename = "SWAP_PENDING")]
    SwapPending,
}

impl SlotStatus {
    /// Legal-transition table
    ///
    /// Re-setting BUSY or SWAPPABLE to itself is a permitted no-op.
    pub fn can_transition_to(&self, to: SlotStatus) -> bool {
        use SlotStatus::*;
        matches!(
            (self, to),
            (Busy, Busy)
                | (Busy, Swappable)
                | (Swappable, Swappable)
                | (Swappable, Busy)
                | (Swappable, SwapPending)
                | (SwapPending, Busy)
                | (SwapPending, Swappable)
        )
    }

    /// Targets an owner may request directly
    pub fn is_user_settable(&self) -> bool {
        matches!(self, SlotStatus::Busy | SlotStatus::Swappable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Busy => "BUSY",
            SlotStatus::Swappable => "SWAPPABLE",
            SlotStatus::SwapPending => "SWAP_PENDING",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BUSY" => Ok(SlotStatus::Busy),
            "SWAPPABLE" => Ok(SlotStatus::Swappable),
            "SWAP_PENDING" => Ok(SlotStatus::SwapPending),
            other => Err(SwapError::validation(
                "status",
                format!("unknown slot status '{}'", other),
            )),
        }
    }
}

/// Raw slot creation input, exactly as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl NewSlot {
    pub fn new(
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}

/// A calendar slot
///
/// Invariant: end_time > start_time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: SlotId,
    pub owner_id: UserId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Write counter for conditional updates
    pub version: u64,
}

impl Slot {
    /// Validate raw input and build a BUSY slot owned by `owner`
    pub fn create(owner_id: UserId, input: &NewSlot, now: DateTime<Utc>) -> SwapResult<Self> {
        let title = validate_title(&input.title)?;
        let start_time = parse_instant("startTime", &input.start_time)?;
        let end_time = parse_instant("endTime", &input.end_time)?;

        if end_time <= start_time {
            return Err(SwapError::validation(
                "endTime",
                "end time must be after start time",
            ));
        }

        Ok(Self {
            id: SlotId::new(),
            owner_id,
            title,
            start_time,
            end_time,
            status: SlotStatus::Busy,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Check interval invariant
    pub fn check_invariant(&self) -> bool {
        self.end_time > self.start_time
    }

    /// Move to `to` if the transition table allows it
    pub fn transition(&mut self, to: SlotStatus) -> SwapResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(SwapError::State(format!(
                "Slot {} cannot move from {} to {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        Ok(())
    }

    /// Hand the slot to `new_owner` while settling a negotiation
    pub fn transfer_to(&mut self, new_owner: UserId, status: SlotStatus) -> SwapResult<()> {
        if self.status != SlotStatus::SwapPending {
            return Err(SwapError::State(format!(
                "Slot {} is {}, ownership moves only out of SWAP_PENDING",
                self.id, self.status
            )));
        }
        self.transition(status)?;
        self.owner_id = new_owner;
        Ok(())
    }
}

fn validate_title(raw: &str) -> SwapResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(SwapError::validation("title", "title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(SwapError::validation(
            "title",
            format!("title must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(title.to_string())
}

/// Parse a client-supplied instant
///
/// Accepts RFC 3339, or a zone-less `YYYY-MM-DDTHH:MM[:SS]` taken as UTC.
pub fn parse_instant(field: &str, raw: &str) -> SwapResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SwapError::validation(field, "value is required"));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SwapError::validation(field, format!("unparsable date '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(start: &str, end: &str) -> NewSlot {
        NewSlot::new("Team standup", start, end)
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("SWAPPABLE".parse::<SlotStatus>().unwrap(), SlotStatus::Swappable);
        assert_eq!(" BUSY ".parse::<SlotStatus>().unwrap(), SlotStatus::Busy);
        assert!(matches!(
            "busy".parse::<SlotStatus>(),
            Err(SwapError::Validation { .. })
        ));
    }

    #[test]
    fn test_slot_creation() {
        let owner = UserId::new();
        let slot = Slot::create(
            owner,
            &input("2025-03-01T09:00:00Z", "2025-03-01T10:00:00Z"),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(slot.owner_id, owner);
        assert_eq!(slot.status, SlotStatus::Busy);
        assert_eq!(slot.version, 0);
        assert!(slot.check_invariant());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = Slot::create(
            UserId::new(),
            &input("2025-03-01T10:00:00Z", "2025-03-01T09:00:00Z"),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SwapError::Validation { ref field, .. } if field == "endTime"));

        let err = Slot::create(
            UserId::new(),
            &input("2025-03-01T10:00:00Z", "2025-03-01T10:00:00Z"),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SwapError::Validation { .. }));
    }

    #[test]
    fn test_title_trimmed_and_bounded() {
        let slot = Slot::create(
            UserId::new(),
            &NewSlot::new("  Lunch  ", "2025-03-01T12:00", "2025-03-01T13:00"),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(slot.title, "Lunch");

        let err = Slot::create(
            UserId::new(),
            &NewSlot::new("   ", "2025-03-01T12:00", "2025-03-01T13:00"),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, SwapError::Validation { ref field, .. } if field == "title"));

        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(Slot::create(
            UserId::new(),
            &NewSlot::new(long, "2025-03-01T12:00", "2025-03-01T13:00"),
            Utc::now(),
        )
        .is_err());
    }

    #[test]
    fn test_parse_instant_formats() {
        let rfc = parse_instant("startTime", "2025-03-01T09:00:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-03-01T07:00:00+00:00");

        let local = parse_instant("startTime", "2025-03-01T09:30").unwrap();
        assert_eq!(local.to_rfc3339(), "2025-03-01T09:30:00+00:00");

        assert!(parse_instant("startTime", "yesterday").is_err());
        assert!(parse_instant("startTime", "").is_err());
    }

    #[test]
    fn test_transition_table() {
        use SlotStatus::*;
        assert!(Busy.can_transition_to(Swappable));
        assert!(Swappable.can_transition_to(Busy));
        assert!(Swappable.can_transition_to(SwapPending));
        assert!(SwapPending.can_transition_to(Busy));
        assert!(SwapPending.can_transition_to(Swappable));

        assert!(!Busy.can_transition_to(SwapPending));
        assert!(!SwapPending.can_transition_to(SwapPending));
    }

    #[test]
    fn test_transfer_requires_pending() {
        let mut slot = Slot::create(
            UserId::new(),
            &input("2025-03-01T09:00:00Z", "2025-03-01T10:00:00Z"),
            Utc::now(),
        )
        .unwrap();
        let new_owner = UserId::new();

        assert!(matches!(
            slot.transfer_to(new_owner, SlotStatus::Busy),
            Err(SwapError::State(_))
        ));

        slot.transition(SlotStatus::Swappable).unwrap();
        slot.transition(SlotStatus::SwapPending).unwrap();
        slot.transfer_to(new_owner, SlotStatus::Busy).unwrap();
        assert_eq!(slot.owner_id, new_owner);
        assert_eq!(slot.status, SlotStatus::Busy);
    }

    mod prop {
        use super::*;
        use chrono::{Duration, TimeZone};
        use proptest::prelude::*;

        proptest! {
            /// Creation succeeds exactly when the interval is non-empty.
            #[test]
            fn interval_invariant_holds(start_min in 0i64..100_000, delta_min in -500i64..500) {
                let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
                let start = base + Duration::minutes(start_min);
                let end = start + Duration::minutes(delta_min);

                let result = Slot::create(
                    UserId::new(),
                    &NewSlot::new("Slot", start.to_rfc3339(), end.to_rfc3339()),
                    base,
                );

                if delta_min > 0 {
                    let slot = result.unwrap();
                    prop_assert!(slot.check_invariant());
                    prop_assert_eq!(slot.start_time, start);
                } else {
                    let is_validation = matches!(result, Err(SwapError::Validation { .. }));
                    prop_assert!(is_validation);
                }
            }
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&SlotStatus::SwapPending).unwrap(),
            "\"SWAP_PENDING\""
        );
        let status: SlotStatus = serde_json::from_str("\"SWAPPABLE\"").unwrap();
        assert_eq!(status, SlotStatus::Swappable);
    }
}
