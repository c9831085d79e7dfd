//! User directory
//!
//! Display profiles keyed by user id. Registration happens on every
//! authenticated call, so the map is concurrent rather than living under
//! the engine lock.

use dashmap::DashMap;
use types::ids::UserId;
use types::user::{UserProfile, UserSummary};

#[derive(Debug, Default)]
pub struct UserDirectory {
    profiles: DashMap<UserId, UserProfile>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a profile
    pub fn register(&self, profile: UserProfile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn get(&self, id: &UserId) -> Option<UserProfile> {
        self.profiles.get(id).map(|entry| entry.value().clone())
    }

    /// Summary for display; unknown users resolve to an anonymous summary
    pub fn summary(&self, id: &UserId) -> UserSummary {
        self.profiles
            .get(id)
            .map(|entry| UserSummary::from(entry.value()))
            .unwrap_or_else(|| UserSummary::anonymous(*id))
    }

    pub fn profiles(&self) -> Vec<UserProfile> {
        let mut out: Vec<UserProfile> = self.profiles.iter().map(|e| e.value().clone()).collect();
        out.sort_by_key(|p| p.id);
        out
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
