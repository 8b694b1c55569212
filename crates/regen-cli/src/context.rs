//! Wires configuration, gateway, store, and vision client together.

use anyhow::{Context, Result};
use regen_application::AppStore;
use regen_core::KeyValueStore;
use regen_inference::{GeminiTransport, VisionClient};
use regen_infrastructure::{FileKeyValueStore, RegenPaths, SupabaseGateway, load_secret_config};
use std::sync::Arc;

/// Everything a command needs, fully wired.
pub struct RuntimeContext {
    pub gateway: Arc<SupabaseGateway>,
    pub store: Arc<AppStore>,
    pub client: Arc<VisionClient>,
}

impl RuntimeContext {
    /// Loads secrets, restores any cached session, and starts the store.
    pub async fn init() -> Result<Self> {
        let paths = RegenPaths::new(None)?;
        paths.ensure_base_dir()?;

        let secrets = load_secret_config(&paths)
            .context("Run `regen` after creating ~/.config/regen/secret.json")?;
        let supabase = secrets
            .supabase
            .context("Missing `supabase` section in secret.json")?;
        let gemini = secrets
            .gemini
            .context("Missing `gemini` section in secret.json")?;

        let local: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::open(paths.settings_path())?);

        let gateway = Arc::new(SupabaseGateway::new(
            supabase.url,
            supabase.anon_key,
            local.clone(),
        ));

        // Restore before the store attaches so start() adopts the session
        // and finishes the initial reconciliation before any command runs.
        gateway.restore_session().await?;

        let store = AppStore::new(gateway.clone(), local)?;
        store.start().await?;

        let transport = Arc::new(GeminiTransport::new(gemini.api_key));
        let mut client = VisionClient::new(transport);
        if let Some(models) = gemini.model_priority {
            client = client.with_models(models);
        }

        Ok(Self {
            gateway,
            store,
            client: Arc::new(client),
        })
    }
}
