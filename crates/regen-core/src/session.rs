//! Authenticated session model.

use serde::{Deserialize, Serialize};

/// A cached copy of the backend's authenticated session.
///
/// Owned by the remote gateway; the state store holds at most one current
/// `Session` at a time. Replaced wholesale on every auth transition and
/// cleared on sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token for remote calls.
    pub access_token: String,
    /// Identity of the authenticated principal.
    pub user_id: String,
    /// Email the principal signed in with, when the backend reports one.
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
            email: None,
        }
    }

    /// Returns the id of the authenticated principal.
    pub fn principal_id(&self) -> &str {
        &self.user_id
    }
}
