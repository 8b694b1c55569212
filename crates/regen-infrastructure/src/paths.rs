//! Centralized path management for configuration files.

use regen_core::{RegenError, Result};
use std::path::PathBuf;

/// Paths to ReGen's on-disk configuration.
///
/// Everything lives under `~/.config/regen/`:
/// - `secret.json` — API keys (Gemini, Supabase)
/// - `settings.toml` — local preferences (theme, cached session)
#[derive(Debug, Clone)]
pub struct RegenPaths {
    base: PathBuf,
}

impl RegenPaths {
    /// Resolves the configuration directory, honoring an override for tests.
    pub fn new(base_override: Option<PathBuf>) -> Result<Self> {
        let base = match base_override {
            Some(base) => base,
            None => dirs::home_dir()
                .ok_or_else(|| RegenError::config("Could not determine home directory"))?
                .join(".config")
                .join("regen"),
        };
        Ok(Self { base })
    }

    /// Creates the configuration directory if it does not exist yet.
    pub fn ensure_base_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base)?;
        Ok(())
    }

    pub fn secret_path(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.base.join("settings.toml")
    }
}
