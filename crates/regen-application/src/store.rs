//! Session state store.
//!
//! `AppStore` is the single source of truth for session, theme, points,
//! username, and scan history, reconciled against the remote backend. All
//! mutation goes through its methods (single-writer invariant); consumers
//! read snapshots or subscribe to the watch channel for live updates.
//!
//! Two update disciplines coexist on purpose:
//! - points are optimistic: incremented locally first, remote write best
//!   effort, never rolled back (skew self-heals on the next profile load);
//! - history is confirmed-only: a record is prepended only after the remote
//!   insert succeeded. History is the durable ledger, points are a
//!   frequently-updated counter.

use regen_core::{
    BackendGateway, KeyValueStore, RegenError, Result, ScanRecord, Session, ThemePreference,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, watch};

/// Key under which the theme preference is persisted locally.
const THEME_KEY: &str = "theme";

/// Read-only view of the store's current state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub theme: ThemePreference,
    pub points: u32,
    pub username: String,
    /// Scan history, newest first.
    pub history: Vec<ScanRecord>,
    pub session: Option<Session>,
}

impl StoreSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Process-wide session and state store.
pub struct AppStore {
    state: RwLock<StoreSnapshot>,
    snapshots: watch::Sender<StoreSnapshot>,
    gateway: Arc<dyn BackendGateway>,
    local: Arc<dyn KeyValueStore>,
}

impl AppStore {
    /// Creates a store, reading the persisted theme preference.
    pub fn new(gateway: Arc<dyn BackendGateway>, local: Arc<dyn KeyValueStore>) -> Result<Arc<Self>> {
        let theme = match local.get(THEME_KEY)? {
            Some(raw) => raw.parse().unwrap_or_else(|err: RegenError| {
                tracing::warn!(error = %err, "Ignoring invalid persisted theme");
                ThemePreference::default()
            }),
            None => ThemePreference::default(),
        };

        let initial = StoreSnapshot {
            theme,
            ..StoreSnapshot::default()
        };
        let (snapshots, _) = watch::channel(initial.clone());

        Ok(Arc::new(Self {
            state: RwLock::new(initial),
            snapshots,
            gateway,
            local,
        }))
    }

    /// Adopts any existing session and starts listening for auth transitions.
    ///
    /// The listener task holds only a weak reference; dropping the last
    /// strong handle to the store ends it, and results of in-flight calls
    /// are silently discarded.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let mut changes = self.gateway.subscribe_session_changes();

        if let Some(session) = self.gateway.current_session().await? {
            self.handle_session_change(Some(session)).await;
        }

        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        let Some(store) = weak.upgrade() else { break };
                        store.handle_session_change(change).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session change listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(())
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    /// Subscribes to state changes. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.subscribe()
    }

    /// Flips the theme, persisting it before the in-memory state changes.
    ///
    /// Calling twice returns the store to the original theme.
    pub async fn toggle_theme(&self) -> Result<ThemePreference> {
        let mut state = self.state.write().await;
        let next = state.theme.toggled();
        // Persist first so the stored value never trails the visible one.
        self.local.set(THEME_KEY, next.as_str())?;
        state.theme = next;
        self.publish(&state);
        Ok(next)
    }

    /// Adds `amount` to the local point total (optimistic), then issues a
    /// best-effort remote update when a session is current.
    ///
    /// A remote failure is logged and tolerated: the local value stands and
    /// converges on the next full profile reload. With no session, only
    /// local state changes and no error is raised.
    pub async fn award_points(&self, amount: u32) {
        let (new_total, session) = {
            let mut state = self.state.write().await;
            state.points = state.points.saturating_add(amount);
            self.publish(&state);
            (state.points, state.session.clone())
        };

        let Some(session) = session else { return };
        if let Err(err) = self
            .gateway
            .update_points(session.principal_id(), new_total)
            .await
        {
            tracing::warn!(error = %err, "Points update failed; local total stands until next reload");
        }
    }

    /// Persists a scan remotely, then prepends it to the in-memory history.
    ///
    /// # Errors
    ///
    /// [`RegenError::NoActiveSession`] without a session; a failed remote
    /// write propagates unchanged and no local mutation occurs.
    pub async fn record_scan(&self, record: ScanRecord) -> Result<()> {
        let session = {
            let state = self.state.read().await;
            state.session.clone().ok_or(RegenError::NoActiveSession)?
        };

        self.gateway
            .insert_scan(session.principal_id(), &record)
            .await?;

        let mut state = self.state.write().await;
        state.history.insert(0, record);
        self.publish(&state);
        Ok(())
    }

    /// Replaces the in-memory history with the remote sequence, newest
    /// first. Returns immediately when no session is current.
    pub async fn reload_history(&self) -> Result<()> {
        let session = {
            let state = self.state.read().await;
            match state.session.clone() {
                Some(session) => session,
                None => return Ok(()),
            }
        };

        let scans = self.gateway.list_scans(session.principal_id()).await?;

        let mut state = self.state.write().await;
        state.history = scans;
        self.publish(&state);
        Ok(())
    }

    async fn handle_session_change(&self, change: Option<Session>) {
        let session = {
            let mut state = self.state.write().await;
            state.session = change.clone();
            if change.is_none() {
                // Sign-out: remote-owned state goes back to defaults.
                state.points = 0;
                state.username.clear();
                state.history.clear();
            }
            self.publish(&state);
            change
        };

        let Some(session) = session else { return };
        tracing::info!(user = %session.principal_id(), "Session established; reconciling");

        // Profile and history target disjoint state; order between them is
        // unspecified and failures leave the corresponding state unchanged.
        let (profile, history) = tokio::join!(
            self.load_profile(&session),
            self.reload_history(),
        );
        if let Err(err) = profile {
            tracing::warn!(error = %err, "Profile reconciliation failed");
        }
        if let Err(err) = history {
            tracing::warn!(error = %err, "History reconciliation failed");
        }
    }

    async fn load_profile(&self, session: &Session) -> Result<()> {
        match self.gateway.fetch_profile(session.principal_id()).await? {
            Some(profile) => {
                let mut state = self.state.write().await;
                state.username = profile.username;
                state.points = profile.points;
                self.publish(&state);
            }
            None => {
                // Sign-up race: the profile row may not exist yet. Keep the
                // local defaults; the next fetch converges.
                tracing::warn!(
                    user = %session.principal_id(),
                    "Profile row not found; keeping local defaults"
                );
            }
        }
        Ok(())
    }

    fn publish(&self, state: &StoreSnapshot) {
        self.snapshots.send_replace(state.clone());
    }
}
