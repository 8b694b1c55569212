//! Concrete adapters for ReGen: Supabase backend gateway, file-backed
//! settings store, and configuration loading.

pub mod paths;
pub mod secret;
pub mod settings;
pub mod supabase;

pub use paths::RegenPaths;
pub use secret::{GeminiSecret, SecretConfig, SupabaseSecret, load_secret_config};
pub use settings::FileKeyValueStore;
pub use supabase::SupabaseGateway;
