//! User profile model.

use serde::{Deserialize, Serialize};

/// Remote user profile, mirrored locally by the state store.
///
/// `points` is the authoritative display value immediately after a local
/// mutation (optimistic), and converges to the remote value on the next
/// successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub points: u32,
}

impl Profile {
    pub fn new(id: impl Into<String>, username: impl Into<String>, points: u32) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            points,
        }
    }
}
