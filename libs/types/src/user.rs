//! User profile types
//!
//! Identity is owned by an external provider. The marketplace only keeps
//! the display fields needed to resolve request and listing summaries.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Display profile registered from a verified identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Public summary of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl UserSummary {
    /// Summary for a user with no registered profile
    pub fn anonymous(id: UserId) -> Self {
        Self {
            id,
            username: String::new(),
            email: String::new(),
        }
    }
}

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            email: profile.email.clone(),
        }
    }
}
