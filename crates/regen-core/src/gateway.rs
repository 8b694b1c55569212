//! Remote backend gateway trait.
//!
//! The backend (auth, profile rows, scan history rows, session-change
//! notifications) is an external collaborator. This trait is the capability
//! surface the state store consumes; `regen-infrastructure` provides the
//! hosted implementation and tests substitute in-memory fakes.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::profile::Profile;
use crate::scan::ScanRecord;
use crate::session::Session;

/// Capability surface of the remote backend.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Returns the currently authenticated session, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribes to auth transitions.
    ///
    /// Fires with the new session (or `None`) on every transition. Dropping
    /// the receiver unsubscribes.
    fn subscribe_session_changes(&self) -> broadcast::Receiver<Option<Session>>;

    /// Fetches the profile row for a principal.
    ///
    /// Returns `Ok(None)` when no row exists yet (e.g. a sign-up whose
    /// profile provisioning has not landed); callers decide how to handle
    /// the gap.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Sets the profile's point total to `points`.
    async fn update_points(&self, user_id: &str, points: u32) -> Result<()>;

    /// Lists the top `limit` profiles by points, descending.
    async fn list_top_profiles(&self, limit: u32) -> Result<Vec<Profile>>;

    /// Persists a scan record for a principal.
    async fn insert_scan(&self, user_id: &str, record: &ScanRecord) -> Result<()>;

    /// Lists all scan records for a principal, newest first.
    async fn list_scans(&self, user_id: &str) -> Result<Vec<ScanRecord>>;
}
