//! Secret configuration file management.
//!
//! Supports reading API keys from `~/.config/regen/secret.json`.

use regen_core::{RegenError, Result};
use serde::Deserialize;
use std::fs;

use crate::paths::RegenPaths;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
    #[serde(default)]
    pub supabase: Option<SupabaseSecret>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    /// Optional override of the model priority list.
    #[serde(default)]
    pub model_priority: Option<Vec<String>>,
}

/// Supabase project configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSecret {
    pub url: String,
    pub anon_key: String,
}

/// Loads the secret configuration file.
///
/// Error messages never echo file contents, only paths.
pub fn load_secret_config(paths: &RegenPaths) -> Result<SecretConfig> {
    let config_path = paths.secret_path();

    if !config_path.exists() {
        return Err(RegenError::config(format!(
            "Configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        RegenError::config(format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        RegenError::config(format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RegenPaths::new(Some(dir.path().to_path_buf())).unwrap();
        fs::write(
            paths.secret_path(),
            r#"{
                "gemini": {"api_key": "g-key", "model_priority": ["gemini-2.5-pro"]},
                "supabase": {"url": "https://proj.supabase.co", "anon_key": "anon"}
            }"#,
        )
        .unwrap();

        let config = load_secret_config(&paths).unwrap();
        assert_eq!(config.gemini.as_ref().unwrap().api_key, "g-key");
        assert_eq!(
            config.gemini.unwrap().model_priority.unwrap(),
            vec!["gemini-2.5-pro"]
        );
        assert_eq!(config.supabase.unwrap().anon_key, "anon");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let paths = RegenPaths::new(Some(PathBuf::from("/nonexistent/regen"))).unwrap();
        let err = load_secret_config(&paths).unwrap_err();
        assert!(matches!(err, RegenError::Config(_)));
    }

    #[test]
    fn test_sections_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RegenPaths::new(Some(dir.path().to_path_buf())).unwrap();
        fs::write(paths.secret_path(), "{}").unwrap();

        let config = load_secret_config(&paths).unwrap();
        assert!(config.gemini.is_none());
        assert!(config.supabase.is_none());
    }
}
