//! Supabase backend gateway.
//!
//! Implements [`BackendGateway`] against Supabase's hosted REST surface:
//! GoTrue for auth (`/auth/v1/...`) and PostgREST for the `profiles` and
//! `scan_history` tables (`/rest/v1/...`).
//!
//! Auth transitions are published on a broadcast channel and the session is
//! mirrored into the local key-value store so it can be restored on the
//! next start without re-authenticating.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regen_core::{
    BackendGateway, KeyValueStore, Profile, RegenError, Result, ScanRecord, Session,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Key under which the serialized session is cached locally.
const SESSION_KEY: &str = "session";

/// Gateway over a Supabase project.
pub struct SupabaseGateway {
    client: Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<Option<Session>>,
    local: Arc<dyn KeyValueStore>,
}

impl SupabaseGateway {
    /// Creates a gateway for the project at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        local: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
            changes,
            local,
        }
    }

    /// Restores a locally cached session, if one exists.
    ///
    /// The cached token is trusted as-is; an expired one surfaces later as
    /// ordinary remote-call failures. Publishes a session-change event when
    /// a session is restored.
    pub async fn restore_session(&self) -> Result<Option<Session>> {
        let Some(raw) = self.local.get(SESSION_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => {
                self.set_session(Some(session.clone())).await?;
                Ok(Some(session))
            }
            Err(err) => {
                // A torn cache entry is dropped, not fatal.
                tracing::warn!(error = %err, "Discarding unreadable cached session");
                self.local.remove(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    /// Signs in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(|err| RegenError::remote_write("auth", format!("sign-in failed: {err}")))?;

        let token: TokenResponse = auth_json(response).await?;
        let session = token.into_session();
        self.set_session(Some(session.clone())).await?;
        Ok(session)
    }

    /// Creates an account, attaching `username` as signup metadata.
    ///
    /// Projects with email confirmation enabled return no session until the
    /// address is verified, hence the `Option`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Option<Session>> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&SignupRequest {
                email,
                password,
                data: SignupMetadata { username },
            })
            .send()
            .await
            .map_err(|err| RegenError::remote_write("auth", format!("sign-up failed: {err}")))?;

        let reply: SignupResponse = auth_json(response).await?;
        let Some(access_token) = reply.access_token else {
            return Ok(None);
        };
        let Some(user) = reply.user else {
            return Ok(None);
        };

        let session = Session {
            access_token,
            user_id: user.id,
            email: user.email,
        };
        self.set_session(Some(session.clone())).await?;
        Ok(Some(session))
    }

    /// Signs out, clearing the cached session.
    ///
    /// The local session is cleared even when the remote revocation fails;
    /// the token simply ages out server-side.
    pub async fn sign_out(&self) -> Result<()> {
        let token = {
            let session = self.session.read().await;
            session.as_ref().map(|s| s.access_token.clone())
        };

        if let Some(token) = token {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .client
                .post(url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&token)
                .send()
                .await;
            if let Err(err) = result {
                tracing::warn!(error = %err, "Remote sign-out failed; clearing local session anyway");
            }
        }

        self.set_session(None).await
    }

    /// Replaces the current session, persists the change locally, and
    /// notifies subscribers.
    async fn set_session(&self, new_session: Option<Session>) -> Result<()> {
        {
            let mut session = self.session.write().await;
            *session = new_session.clone();
        }

        match &new_session {
            Some(session) => {
                let raw = serde_json::to_string(session)?;
                self.local.set(SESSION_KEY, &raw)?;
            }
            None => self.local.remove(SESSION_KEY)?,
        }

        // No receivers is fine; subscribers attach and detach freely.
        let _ = self.changes.send(new_session);
        Ok(())
    }

    /// Applies the standard PostgREST headers: project key plus the current
    /// bearer token (falling back to the anon key when signed out).
    async fn rest_request(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = {
            let session = self.session.read().await;
            session
                .as_ref()
                .map(|s| s.access_token.clone())
                .unwrap_or_else(|| self.anon_key.clone())
        };
        builder.header("apikey", &self.anon_key).bearer_auth(token)
    }
}

#[async_trait]
impl BackendGateway for SupabaseGateway {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    fn subscribe_session_changes(&self) -> broadcast::Receiver<Option<Session>> {
        self.changes.subscribe()
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let url = format!(
            "{}/rest/v1/profiles?id=eq.{}&select=username,points",
            self.base_url, user_id
        );
        let response = self
            .rest_request(self.client.get(url))
            .await
            .send()
            .await
            .map_err(|err| RegenError::internal(format!("profile fetch failed: {err}")))?;

        let rows: Vec<ProfileRow> = read_json(response, "profile fetch").await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| Profile::new(user_id, row.username, row.points)))
    }

    async fn update_points(&self, user_id: &str, points: u32) -> Result<()> {
        let url = format!("{}/rest/v1/profiles?id=eq.{}", self.base_url, user_id);
        let response = self
            .rest_request(self.client.patch(url))
            .await
            .header("Prefer", "return=minimal")
            .json(&PointsUpdate {
                points,
                updated_at: Utc::now(),
            })
            .send()
            .await
            .map_err(|err| RegenError::remote_write("profiles", err.to_string()))?;

        expect_success(response, "profiles").await
    }

    async fn list_top_profiles(&self, limit: u32) -> Result<Vec<Profile>> {
        let url = format!(
            "{}/rest/v1/profiles?select=id,username,points&order=points.desc&limit={}",
            self.base_url, limit
        );
        let response = self
            .rest_request(self.client.get(url))
            .await
            .send()
            .await
            .map_err(|err| RegenError::internal(format!("leaderboard fetch failed: {err}")))?;

        let rows: Vec<LeaderboardRow> = read_json(response, "leaderboard fetch").await?;
        Ok(rows.into_iter().map(leaderboard_to_profile).collect())
    }

    async fn insert_scan(&self, user_id: &str, record: &ScanRecord) -> Result<()> {
        let url = format!("{}/rest/v1/scan_history", self.base_url);
        let response = self
            .rest_request(self.client.post(url))
            .await
            .header("Prefer", "return=minimal")
            .json(&ScanInsertRow {
                user_id,
                item_name: &record.item_name,
                eco_points: record.eco_points,
                scan_data: record,
            })
            .send()
            .await
            .map_err(|err| RegenError::remote_write("scan_history", err.to_string()))?;

        expect_success(response, "scan_history").await
    }

    async fn list_scans(&self, user_id: &str) -> Result<Vec<ScanRecord>> {
        let url = format!(
            "{}/rest/v1/scan_history?user_id=eq.{}&select=id,created_at,item_name,eco_points,scan_data&order=created_at.desc",
            self.base_url, user_id
        );
        let response = self
            .rest_request(self.client.get(url))
            .await
            .send()
            .await
            .map_err(|err| RegenError::internal(format!("history fetch failed: {err}")))?;

        let rows: Vec<ScanRow> = read_json(response, "history fetch").await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

/// Flattens a history row back into a `ScanRecord`.
///
/// The `scan_data` payload is the record as the client wrote it, so its
/// fields win; the durable row columns only fill gaps in sparse rows. In
/// particular the client-generated `scan_<epoch-millis>` id survives a
/// reload instead of being replaced by the numeric row id.
fn row_to_record(row: ScanRow) -> ScanRecord {
    let data = row.scan_data;
    ScanRecord {
        id: data.id.unwrap_or_else(|| row.id.to_string()),
        timestamp: data.timestamp.unwrap_or(row.created_at),
        item_name: data.item_name.unwrap_or(row.item_name),
        disposal_method: data.disposal_method.unwrap_or_default(),
        alternative: data.alternative.unwrap_or_default(),
        upcycling_idea: data.upcycling_idea.unwrap_or_default(),
        eco_tip: data.eco_tip.unwrap_or_default(),
        eco_points: data.eco_points.unwrap_or(row.eco_points),
    }
}

fn leaderboard_to_profile(row: LeaderboardRow) -> Profile {
    Profile::new(row.id, row.username, row.points)
}

async fn expect_success(response: Response, resource: &'static str) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(RegenError::remote_write(
        resource,
        error_detail(response).await,
    ))
}

/// Decodes the reply of an auth call; non-2xx becomes a `RemoteWrite` on
/// the auth resource (sign-in and sign-up both create server-side state).
async fn auth_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(RegenError::remote_write("auth", error_detail(response).await));
    }
    response
        .json()
        .await
        .map_err(|err| RegenError::internal(format!("unreadable auth response: {err}")))
}

/// Decodes the reply of a read request.
async fn read_json<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    if !response.status().is_success() {
        let detail = error_detail(response).await;
        return Err(RegenError::internal(format!("{what} failed: {detail}")));
    }
    response
        .json()
        .await
        .map_err(|err| RegenError::internal(format!("unreadable {what} response: {err}")))
}

async fn error_detail(response: Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());

    // Both GoTrue and PostgREST wrap details in a JSON message field.
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|e| e.message.or(e.msg).or(e.error_description))
        .unwrap_or(body);
    format!("HTTP {}: {}", status.as_u16(), message)
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignupMetadata<'a>,
}

#[derive(Serialize)]
struct SignupMetadata<'a> {
    username: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserBody,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            access_token: self.access_token,
            user_id: self.user.id,
            email: self.user.email,
        }
    }
}

#[derive(Deserialize)]
struct SignupResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserBody>,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ProfileRow {
    username: String,
    points: u32,
}

#[derive(Deserialize)]
struct LeaderboardRow {
    id: String,
    username: String,
    points: u32,
}

#[derive(Serialize)]
struct PointsUpdate {
    points: u32,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ScanInsertRow<'a> {
    user_id: &'a str,
    item_name: &'a str,
    eco_points: u32,
    scan_data: &'a ScanRecord,
}

#[derive(Deserialize)]
struct ScanRow {
    id: i64,
    created_at: DateTime<Utc>,
    item_name: String,
    eco_points: u32,
    scan_data: ScanData,
}

/// The `scan_data` JSON column, decoded leniently so rows written by older
/// clients with fewer fields still load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    item_name: Option<String>,
    #[serde(default)]
    disposal_method: Option<String>,
    #[serde(default)]
    alternative: Option<String>,
    #[serde(default)]
    upcycling_idea: Option<String>,
    #[serde(default)]
    eco_tip: Option<String>,
    #[serde(default)]
    eco_points: Option<u32>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
